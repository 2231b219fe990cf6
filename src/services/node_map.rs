//! # 节点表构建与 DOM 变更应用
//!
//! 从完整快照构建 id → 节点描述的映射，并用后续的增量变更原地更新。
//!
//! ## 存储结构
//! 节点表是一个以 id 为下标的 arena（`Vec<Option<NodeDescriptor>>`），
//! 子节点以 id 列表保存。删除节点只清空槽位，残留的悬空 id 引用
//! 在查找时按 "未知 id → 忽略" 处理。
//! 超出稠密区间的 id 存放在旁路 `HashMap` 中，单个异常大的 id 不会撑大 arena。
//!
//! ## 树形约束
//! 录制流可能复用 id，把节点挂到自身或自身后代之下。这类插入直接丢弃，
//! 祖先遍历和文本收集也都有步数上限，节点表永远不会形成环。
//!
//! ## 变更顺序
//! 单条变更事件内按 新增 → 删除 → 文本 → 属性 的顺序应用，
//! 保证同一事件中新增的节点可以被随后删除或编辑。
//! 录制流不保证自洽，删除 / 文本 / 属性中引用的未知 id 一律静默忽略。

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::models::event::{MutationData, SerializedNode};
use crate::models::node::{NodeDescriptor, NodeKind};

/// 允许的最大节点 id
///
/// 录制端用 32 位有符号整数按顺序分配 id；
/// 超出范围的 id 视为损坏数据，按未知 id 处理。
const MAX_NODE_ID: i64 = i32::MAX as i64;

/// 稠密 arena 覆盖的 id 上限（不含），更大的 id 进入旁路表
const DENSE_ID_LIMIT: u32 = 1 << 16;

/// 收集可见文本时跳过的标签
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// 重建的 DOM 节点表
#[derive(Debug, Default)]
pub struct NodeMap {
    /// id → 节点槽位（id < `DENSE_ID_LIMIT`）
    slots: Vec<Option<NodeDescriptor>>,
    /// id ≥ `DENSE_ID_LIMIT` 的节点
    sparse: HashMap<u32, NodeDescriptor>,
    /// 当前存活节点数
    len: usize,
}

impl NodeMap {
    /// 创建空节点表
    pub fn new() -> Self {
        Self::default()
    }

    /// 从完整快照的根节点构建节点表
    pub fn from_snapshot(root: &SerializedNode) -> Self {
        let mut map = Self::new();
        map.insert_subtree(root, None, None);
        map
    }

    /// 用新的完整快照整体替换节点表（全量重同步）
    pub fn rebuild(&mut self, root: &SerializedNode) {
        *self = Self::from_snapshot(root);
    }

    /// 存活节点数
    pub fn len(&self) -> usize {
        self.len
    }

    /// 节点表是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 按 id 查找节点
    pub fn get(&self, id: i64) -> Option<&NodeDescriptor> {
        let id = to_node_id(id)?;
        if id < DENSE_ID_LIMIT {
            self.slots.get(id as usize)?.as_ref()
        } else {
            self.sparse.get(&id)
        }
    }

    fn get_mut(&mut self, id: i64) -> Option<&mut NodeDescriptor> {
        let id = to_node_id(id)?;
        if id < DENSE_ID_LIMIT {
            self.slots.get_mut(id as usize)?.as_mut()
        } else {
            self.sparse.get_mut(&id)
        }
    }

    /// 从父节点开始向上遍历祖先链（不含节点自身）
    ///
    /// 最多走 `len` 步，即使链上出现环也会终止。
    pub fn ancestors(&self, id: i64) -> impl Iterator<Item = &NodeDescriptor> + '_ {
        let start = self.get(id).and_then(|n| n.parent);
        std::iter::successors(start.and_then(|p| self.get(p as i64)), move |node| {
            node.parent.and_then(|p| self.get(p as i64))
        })
        .take(self.len)
    }

    /// `candidate` 是否是 `id` 本身或其祖先
    fn is_self_or_ancestor(&self, candidate: u32, id: u32) -> bool {
        candidate == id || self.ancestors(id as i64).any(|a| a.id == candidate)
    }

    /// 应用一条 DOM 变更事件
    ///
    /// # 参数
    /// - `mutation` - 变更负载（adds / removes / texts / attributes）
    pub fn apply_mutation(&mut self, mutation: &MutationData) {
        // 第一步：新增节点
        // 父节点可能在同一批次中稍后才出现，未就绪的条目延后重试，
        // 直到一轮下来没有任何进展，剩余条目作为孤立节点插入
        let mut pending: Vec<_> = mutation.adds.iter().collect();
        loop {
            let before = pending.len();
            pending.retain(|add| {
                if self.get(add.parent_id).is_none() {
                    return true;
                }
                let next = add.next_id.and_then(to_node_id);
                self.insert_subtree(&add.node, to_node_id(add.parent_id), next);
                false
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }
        for add in pending {
            log::debug!("新增节点 {} 的父节点 {} 不存在，作为孤立节点插入", add.node.id, add.parent_id);
            self.insert_subtree(&add.node, None, None);
        }

        // 第二步：删除节点
        for removed in &mutation.removes {
            self.remove(removed.id);
        }

        // 第三步：文本变化
        for change in &mutation.texts {
            if let Some(node) = self.get_mut(change.id) {
                node.text = change.value.clone();
            }
        }

        // 第四步：属性变化
        for change in &mutation.attributes {
            if let Some(node) = self.get_mut(change.id) {
                for (name, value) in &change.attributes {
                    match attribute_string(value) {
                        Some(v) => {
                            node.attributes.insert(name.to_ascii_lowercase(), v);
                        }
                        None if value.is_null() => {
                            node.attributes.remove(&name.to_ascii_lowercase());
                        }
                        // 对象形式的 style 差量等非标量值不影响命名，忽略
                        None => {}
                    }
                }
            }
        }
    }

    /// 收集节点子树的可见文本
    ///
    /// 跳过 script/style 等不可见子树，合并连续空白。
    /// 收集到的字符数超过 `limit` 后提前停止，返回值可能略长于 `limit`，
    /// 由调用方决定是否视为 "过长"。
    pub fn visible_text(&self, id: i64, limit: usize) -> String {
        let mut buf = String::new();
        let mut stack = vec![id];
        let mut visited = HashSet::new();
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(node) = self.get(current) else {
                continue;
            };
            match node.kind {
                NodeKind::Text => {
                    if let Some(text) = &node.text {
                        for word in text.split_whitespace() {
                            if !buf.is_empty() {
                                buf.push(' ');
                            }
                            buf.push_str(word);
                        }
                    }
                }
                NodeKind::Element | NodeKind::Document => {
                    if node
                        .tag
                        .as_deref()
                        .is_some_and(|t| INVISIBLE_TAGS.contains(&t))
                    {
                        continue;
                    }
                    // 逆序压栈，保证按文档顺序弹出
                    stack.extend(node.children.iter().rev().map(|&c| c as i64));
                }
                _ => {}
            }
            if buf.chars().count() > limit {
                break;
            }
        }
        buf
    }

    /// 页面标题：第一个 `<title>` 元素的文本
    pub fn page_title(&self) -> Option<String> {
        let title = self
            .slots
            .iter()
            .flatten()
            .find(|node| node.is_tag("title"))
            .or_else(|| {
                self.sparse
                    .values()
                    .filter(|node| node.is_tag("title"))
                    .min_by_key(|node| node.id)
            })?;
        let text = self.visible_text(title.id as i64, 200);
        (!text.is_empty()).then_some(text)
    }

    /// 插入一棵子树
    ///
    /// 使用显式栈做深度优先遍历，避免深层 DOM 导致递归过深。
    /// 子树根节点插入到 `parent` 下（`next` 存在时插在该兄弟节点之前），
    /// 其后代按文档顺序追加。
    fn insert_subtree(&mut self, root: &SerializedNode, parent: Option<u32>, next: Option<u32>) {
        let mut stack: Vec<(&SerializedNode, Option<u32>, Option<u32>)> = vec![(root, parent, next)];
        while let Some((serialized, parent, next)) = stack.pop() {
            let (Some(id), Some(kind)) = (
                to_node_id(serialized.id),
                NodeKind::from_code(serialized.kind),
            ) else {
                // id 或类型不可用的节点无法被引用，整棵子树跳过
                continue;
            };

            // 挂到自身或自身后代之下会形成环，整棵子树丢弃
            if parent.is_some_and(|p| self.is_self_or_ancestor(id, p)) {
                log::debug!("节点 {} 会成为自身的祖先，丢弃该子树", id);
                continue;
            }

            // 同一 id 重复出现：先移除旧节点，保证身份唯一
            if self.get(id as i64).is_some() {
                self.remove(id as i64);
            }

            let attributes: HashMap<String, String> = serialized
                .attributes
                .iter()
                .filter_map(|(k, v)| attribute_string(v).map(|v| (k.to_ascii_lowercase(), v)))
                .collect();

            let descriptor = NodeDescriptor {
                id,
                kind,
                tag: serialized.tag_name.as_ref().map(|t| t.to_ascii_lowercase()),
                attributes,
                text: serialized.text_content.clone(),
                parent,
                children: Vec::with_capacity(serialized.child_nodes.len()),
            };
            self.put(descriptor);

            if let Some(parent_node) = parent.and_then(|p| self.get_mut(p as i64)) {
                let position = next.and_then(|n| parent_node.children.iter().position(|&c| c == n));
                match position {
                    Some(pos) => parent_node.children.insert(pos, id),
                    None => parent_node.children.push(id),
                }
            }

            for child in serialized.child_nodes.iter().rev() {
                stack.push((child, Some(id), None));
            }
        }
    }

    /// 写入槽位，必要时扩展 arena
    fn put(&mut self, node: NodeDescriptor) {
        let replaced = if node.id < DENSE_ID_LIMIT {
            let index = node.id as usize;
            if index >= self.slots.len() {
                self.slots.resize_with(index + 1, || None);
            }
            self.slots[index].replace(node)
        } else {
            self.sparse.insert(node.id, node)
        };
        if replaced.is_none() {
            self.len += 1;
        }
    }

    /// 取出槽位中的节点
    fn take(&mut self, id: u32) -> Option<NodeDescriptor> {
        if id < DENSE_ID_LIMIT {
            self.slots.get_mut(id as usize).and_then(Option::take)
        } else {
            self.sparse.remove(&id)
        }
    }

    /// 删除节点及其全部后代，并从父节点的子列表中摘除
    fn remove(&mut self, id: i64) {
        let Some(node_id) = to_node_id(id) else {
            return;
        };
        let Some(parent) = self.get(id).map(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = parent.and_then(|p| self.get_mut(p as i64)) {
            parent_node.children.retain(|&c| c != node_id);
        }

        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            if let Some(removed) = self.take(current) {
                self.len -= 1;
                stack.extend(removed.children.iter().copied());
            }
        }
    }
}

/// 校验并转换录制 id；负数（录制端的 "未序列化" 标记）和越界 id 返回 `None`
fn to_node_id(id: i64) -> Option<u32> {
    (0..=MAX_NODE_ID).contains(&id).then_some(id as u32)
}

/// 将属性值转为字符串：字符串原样保留，数字和布尔值格式化，其余返回 `None`
fn attribute_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> SerializedNode {
        serde_json::from_value(value).unwrap()
    }

    fn sample_document() -> SerializedNode {
        node(json!({
            "type": 0, "id": 1, "childNodes": [
                { "type": 2, "id": 2, "tagName": "HTML", "childNodes": [
                    { "type": 2, "id": 3, "tagName": "head", "childNodes": [
                        { "type": 2, "id": 4, "tagName": "title", "childNodes": [
                            { "type": 3, "id": 5, "textContent": "Billing settings" }
                        ]}
                    ]},
                    { "type": 2, "id": 6, "tagName": "body", "childNodes": [
                        { "type": 2, "id": 10, "tagName": "button",
                          "attributes": { "class": "btn primary", "disabled": false },
                          "childNodes": [ { "type": 3, "id": 11, "textContent": "  Cancel\n subscription " } ] },
                        { "type": 2, "id": 12, "tagName": "script", "childNodes": [
                            { "type": 3, "id": 13, "textContent": "var secret = 1;" }
                        ]}
                    ]}
                ]}
            ]
        }))
    }

    #[test]
    fn test_build_from_snapshot() {
        let map = NodeMap::from_snapshot(&sample_document());
        assert_eq!(map.len(), 10);

        let button = map.get(10).unwrap();
        assert_eq!(button.tag.as_deref(), Some("button"));
        assert_eq!(button.attr("class"), Some("btn primary"));
        assert_eq!(button.attributes.get("disabled").map(String::as_str), Some("false"));
        assert_eq!(button.parent, Some(6));
        assert_eq!(button.children, vec![11]);

        // 标签名统一小写
        assert!(map.get(2).unwrap().is_tag("html"));
        assert_eq!(map.get(6).unwrap().children, vec![10, 12]);
    }

    #[test]
    fn test_visible_text_and_title() {
        let map = NodeMap::from_snapshot(&sample_document());
        assert_eq!(map.visible_text(10, 40), "Cancel subscription");
        // script 内容不可见
        assert!(!map.visible_text(6, 100).contains("secret"));
        assert_eq!(map.page_title().as_deref(), Some("Billing settings"));
    }

    #[test]
    fn test_unknown_id_resolves_to_none() {
        let map = NodeMap::from_snapshot(&sample_document());
        assert!(map.get(999).is_none());
        assert!(map.get(-1).is_none());
        assert!(NodeMap::new().get(1).is_none());
    }

    #[test]
    fn test_add_then_remove_in_same_mutation() {
        let mut map = NodeMap::from_snapshot(&sample_document());
        let mutation: MutationData = serde_json::from_value(json!({
            "adds": [
                { "parentId": 6, "nextId": null, "node": { "type": 2, "id": 20, "tagName": "div" } }
            ],
            "removes": [ { "parentId": 6, "id": 20 } ]
        }))
        .unwrap();
        map.apply_mutation(&mutation);
        assert!(map.get(20).is_none());
        assert_eq!(map.get(6).unwrap().children, vec![10, 12]);
    }

    #[test]
    fn test_add_before_next_sibling() {
        let mut map = NodeMap::from_snapshot(&sample_document());
        let mutation: MutationData = serde_json::from_value(json!({
            "adds": [
                { "parentId": 6, "nextId": 12, "node": { "type": 2, "id": 21, "tagName": "p" } }
            ]
        }))
        .unwrap();
        map.apply_mutation(&mutation);
        assert_eq!(map.get(6).unwrap().children, vec![10, 21, 12]);
    }

    #[test]
    fn test_add_child_before_parent_in_batch() {
        // 子节点条目排在父节点条目之前，延后重试后仍能正确挂载
        let mut map = NodeMap::from_snapshot(&sample_document());
        let mutation: MutationData = serde_json::from_value(json!({
            "adds": [
                { "parentId": 30, "node": { "type": 3, "id": 31, "textContent": "Keep plan" } },
                { "parentId": 6, "node": { "type": 2, "id": 30, "tagName": "a" } }
            ]
        }))
        .unwrap();
        map.apply_mutation(&mutation);
        assert_eq!(map.get(31).unwrap().parent, Some(30));
        assert_eq!(map.visible_text(30, 40), "Keep plan");
    }

    #[test]
    fn test_remove_drops_descendants() {
        let mut map = NodeMap::from_snapshot(&sample_document());
        let mutation: MutationData =
            serde_json::from_value(json!({ "removes": [ { "parentId": 6, "id": 10 } ] })).unwrap();
        map.apply_mutation(&mutation);
        assert!(map.get(10).is_none());
        assert!(map.get(11).is_none());
        assert_eq!(map.len(), 8);
        assert_eq!(map.get(6).unwrap().children, vec![12]);
    }

    #[test]
    fn test_text_and_attribute_changes() {
        let mut map = NodeMap::from_snapshot(&sample_document());
        let mutation: MutationData = serde_json::from_value(json!({
            "texts": [ { "id": 11, "value": "Cancelling..." }, { "id": 404, "value": "ignored" } ],
            "attributes": [
                { "id": 10, "attributes": { "aria-label": "Cancel now", "class": null } },
                { "id": 405, "attributes": { "class": "x" } }
            ]
        }))
        .unwrap();
        map.apply_mutation(&mutation);
        assert_eq!(map.get(11).unwrap().text.as_deref(), Some("Cancelling..."));
        let button = map.get(10).unwrap();
        assert_eq!(button.attr("aria-label"), Some("Cancel now"));
        assert!(button.attr("class").is_none());
        assert!(map.get(404).is_none());
    }

    #[test]
    fn test_rebuild_replaces_map() {
        let mut map = NodeMap::from_snapshot(&sample_document());
        map.rebuild(&node(json!({ "type": 0, "id": 1, "childNodes": [
            { "type": 2, "id": 50, "tagName": "main" }
        ]})));
        assert_eq!(map.len(), 2);
        assert!(map.get(10).is_none());
        assert!(map.get(50).is_some());
    }

    #[test]
    fn test_add_under_itself_is_dropped() {
        let mut map = NodeMap::from_snapshot(&sample_document());
        let mutation: MutationData = serde_json::from_value(json!({
            "adds": [
                { "parentId": 10, "node": { "type": 2, "id": 10, "tagName": "div" } },
                // 把 body 挂到自己的孙节点下
                { "parentId": 11, "node": { "type": 2, "id": 6, "tagName": "body" } }
            ]
        }))
        .unwrap();
        map.apply_mutation(&mutation);
        let button = map.get(10).unwrap();
        assert!(button.is_tag("button"));
        assert_eq!(button.children, vec![11]);
        assert_eq!(map.get(6).unwrap().parent, Some(2));
        assert_eq!(map.ancestors(11).count(), 4);
        assert_eq!(map.visible_text(10, 40), "Cancel subscription");
    }

    #[test]
    fn test_snapshot_child_repeating_parent_id() {
        let map = NodeMap::from_snapshot(&node(json!({
            "type": 0, "id": 1, "childNodes": [
                { "type": 2, "id": 5, "tagName": "div", "childNodes": [
                    { "type": 2, "id": 5, "tagName": "span" },
                    { "type": 2, "id": 6, "tagName": "p", "childNodes": [
                        { "type": 2, "id": 1, "tagName": "em" }
                    ]}
                ]}
            ]
        })));
        let div = map.get(5).unwrap();
        assert!(div.is_tag("div"));
        assert_eq!(div.children, vec![6]);
        assert!(map.get(6).unwrap().children.is_empty());
        assert_eq!(map.visible_text(1, 40), "");
        assert_eq!(map.ancestors(6).count(), 2);
    }

    #[test]
    fn test_large_ids_stay_sparse() {
        let mut map = NodeMap::from_snapshot(&sample_document());
        let mutation: MutationData = serde_json::from_value(json!({
            "adds": [
                { "parentId": 6, "node": { "type": 2, "id": 2_000_000_000_i64, "tagName": "section", "childNodes": [
                    { "type": 3, "id": 2_000_000_001_i64, "textContent": "Far away" }
                ]}}
            ]
        }))
        .unwrap();
        map.apply_mutation(&mutation);
        assert!(map.slots.len() <= DENSE_ID_LIMIT as usize);
        assert_eq!(map.visible_text(2_000_000_000, 40), "Far away");
        assert_eq!(map.len(), 12);

        let removal: MutationData = serde_json::from_value(json!({
            "removes": [ { "parentId": 6, "id": 2_000_000_000_i64 } ]
        }))
        .unwrap();
        map.apply_mutation(&removal);
        assert!(map.get(2_000_000_001).is_none());
        assert_eq!(map.len(), 10);
        // 超出 id 上限的仍视为未知
        assert!(map.get(i64::MAX).is_none());
    }

    #[test]
    fn test_ancestors_walk() {
        let map = NodeMap::from_snapshot(&sample_document());
        let chain: Vec<u32> = map.ancestors(11).map(|n| n.id).collect();
        assert_eq!(chain, vec![10, 6, 2, 1]);
    }
}
