//! # 重建 DOM 节点数据模型
//!
//! `NodeDescriptor` 是节点表（`services::node_map::NodeMap`）中的单个槽位内容，
//! 子节点以 id 列表而非指针保存，避免所有权环。

use std::collections::HashMap;

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    DocumentType,
    Element,
    Text,
    CData,
    Comment,
}

impl NodeKind {
    /// 从录制格式的数字编码转换；未知编码返回 `None`
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Document),
            1 => Some(Self::DocumentType),
            2 => Some(Self::Element),
            3 => Some(Self::Text),
            4 => Some(Self::CData),
            5 => Some(Self::Comment),
            _ => None,
        }
    }
}

/// 重建的单个 DOM 节点
///
/// id 由节点表独占管理：变更事件只按 id 修补字段，不会改变节点身份。
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    /// 录制时分配的稳定 id
    pub id: u32,
    /// 节点类型
    pub kind: NodeKind,
    /// 小写标签名（仅元素节点）
    pub tag: Option<String>,
    /// 属性表（`type`、`name`、`placeholder`、`aria-label`、`class` 等）
    pub attributes: HashMap<String, String>,
    /// 文本内容（仅文本节点）
    pub text: Option<String>,
    /// 父节点 id
    pub parent: Option<u32>,
    /// 有序子节点 id 列表
    pub children: Vec<u32>,
}

impl NodeDescriptor {
    /// 读取属性值，空字符串视为不存在
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// 标签名是否等于给定值
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.as_deref() == Some(tag)
    }

    /// 小写化的 `type` 属性
    pub fn input_type(&self) -> Option<String> {
        self.attr("type").map(|t| t.to_ascii_lowercase())
    }
}
