//! # 录制事件数据模型
//!
//! 定义了会话回放事件（RawEvent）及其各类负载的 Rust 结构体。
//! 原始录制数据是 rrweb 风格的 JSON：顶层 `type` 数字区分事件大类，
//! 增量快照再通过 `data.source` 数字区分来源。
//!
//! 与直接在 `serde_json::Value` 上逐字段探测不同，这里把每一种实际处理的
//! (type, source) 组合建模为一个显式的枚举分支，外加兜底的 `Other` 分支，
//! 由 `services::decoder` 负责从 Value 解码，分类器通过穷尽的模式匹配分发。
//!
//! 负载结构体均派生 `Deserialize` 并对所有字段使用默认值，
//! 单个字段缺失不会导致整条事件解码失败。

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// 单条录制事件
///
/// `timestamp` 为 epoch 毫秒；缺失或非数字时为 `None`，
/// 这类事件无法参与计时，但仍计入原始事件总数。
#[derive(Debug, Clone)]
pub struct RawEvent {
    /// epoch 毫秒时间戳
    pub timestamp: Option<i64>,
    /// 事件类型及负载
    pub kind: EventKind,
}

impl RawEvent {
    /// 构造一条带时间戳的事件（测试和调用方拼装事件时使用）
    pub fn at(timestamp: i64, kind: EventKind) -> Self {
        Self {
            timestamp: Some(timestamp),
            kind,
        }
    }
}

/// 事件大类
///
/// 前三个分支对应录制格式的 Meta / FullSnapshot / IncrementalSnapshot，
/// `Clipboard`、`Visibility`、`ConsoleError`、`NetworkError` 由自定义事件
/// 和插件事件解码而来，`Other` 收纳所有无法识别的事件（只计数，不分类）。
#[derive(Debug, Clone)]
pub enum EventKind {
    /// 页面元信息：URL 和视口尺寸
    Meta(MetaData),
    /// 完整 DOM 快照；负载无法解码时为 `None`
    FullSnapshot(Option<Box<SerializedNode>>),
    /// 增量快照
    Incremental(IncrementalData),
    /// 剪贴板操作
    Clipboard(ClipboardAction),
    /// 标签页可见性变化
    Visibility { hidden: bool },
    /// 控制台错误
    ConsoleError { message: String },
    /// 网络请求失败（单条事件可能携带多个失败请求）
    NetworkError(Vec<NetworkFailure>),
    /// 无法识别的事件类型（保留原始 type 以便调试日志）
    Other { event_type: Option<i64> },
}

/// Meta 事件负载
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetaData {
    /// 页面地址
    pub href: String,
    /// 视口宽度（像素）
    pub width: u32,
    /// 视口高度（像素）
    pub height: u32,
}

/// 增量快照负载，按 `source` 区分
#[derive(Debug, Clone)]
pub enum IncrementalData {
    Mutation(MutationData),
    MouseMove(Vec<PointerPosition>),
    MouseInteraction(MouseInteractionData),
    Scroll(ScrollData),
    ViewportResize(ViewportData),
    Input(InputData),
    TouchMove(Vec<PointerPosition>),
    MediaInteraction(MediaData),
    Selection(SelectionData),
    /// 未识别或负载损坏的 source
    Other { source: Option<i64> },
}

/// 序列化 DOM 节点（快照和新增节点共用）
///
/// `kind` 对应录制格式中的节点类型：
/// 0 Document、1 DocumentType、2 Element、3 Text、4 CDATA、5 Comment。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SerializedNode {
    #[serde(rename = "type")]
    pub kind: i64,
    pub id: i64,
    pub tag_name: Option<String>,
    /// 属性值可能是字符串、数字、布尔值，构建节点表时统一转为字符串
    pub attributes: HashMap<String, Value>,
    pub child_nodes: Vec<SerializedNode>,
    pub text_content: Option<String>,
}

/// DOM 变更负载
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MutationData {
    pub adds: Vec<AddedNode>,
    pub removes: Vec<RemovedNode>,
    pub texts: Vec<TextChange>,
    pub attributes: Vec<AttributeChange>,
}

/// 新增节点：挂到 `parent_id` 下，`next_id` 存在时插在该兄弟节点之前
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddedNode {
    pub parent_id: i64,
    pub next_id: Option<i64>,
    pub node: SerializedNode,
}

/// 被移除的节点
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemovedNode {
    pub parent_id: i64,
    pub id: i64,
}

/// 文本节点内容变化
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextChange {
    pub id: i64,
    pub value: Option<String>,
}

/// 属性变化：值为 `null` 表示删除该属性
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttributeChange {
    pub id: i64,
    pub attributes: HashMap<String, Value>,
}

/// 指针位置（鼠标移动 / 触摸移动）
///
/// `time_offset` 是相对事件时间戳的偏移（通常为负数）。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
    pub id: i64,
    pub time_offset: i64,
}

/// 鼠标交互子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseInteractionKind {
    MouseUp,
    MouseDown,
    Click,
    ContextMenu,
    DblClick,
    Focus,
    Blur,
    TouchStart,
    TouchMoveDeparted,
    TouchEnd,
    TouchCancel,
    Unknown(i64),
}

impl MouseInteractionKind {
    /// 从录制格式的数字编码转换
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::MouseUp,
            1 => Self::MouseDown,
            2 => Self::Click,
            3 => Self::ContextMenu,
            4 => Self::DblClick,
            5 => Self::Focus,
            6 => Self::Blur,
            7 => Self::TouchStart,
            8 => Self::TouchMoveDeparted,
            9 => Self::TouchEnd,
            10 => Self::TouchCancel,
            other => Self::Unknown(other),
        }
    }

    /// 是否为触摸类交互
    pub fn is_touch(self) -> bool {
        matches!(
            self,
            Self::TouchStart | Self::TouchMoveDeparted | Self::TouchEnd | Self::TouchCancel
        )
    }
}

/// 鼠标交互负载
#[derive(Debug, Clone)]
pub struct MouseInteractionData {
    pub kind: MouseInteractionKind,
    pub id: i64,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// 滚动负载
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScrollData {
    pub id: i64,
    pub x: f64,
    pub y: f64,
}

/// 视口尺寸变化负载
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewportData {
    pub width: u32,
    pub height: u32,
}

/// 输入负载
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputData {
    pub id: i64,
    pub text: String,
    /// 复选框 / 单选框的勾选状态
    pub is_checked: Option<bool>,
}

/// 媒体交互子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaAction {
    Play,
    Pause,
    Seeked,
    VolumeChange,
    RateChange,
    Unknown(i64),
}

impl MediaAction {
    /// 从录制格式的数字编码转换
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Play,
            1 => Self::Pause,
            2 => Self::Seeked,
            3 => Self::VolumeChange,
            4 => Self::RateChange,
            other => Self::Unknown(other),
        }
    }
}

/// 媒体交互负载
#[derive(Debug, Clone)]
pub struct MediaData {
    pub action: MediaAction,
    pub id: i64,
}

/// 文本选区
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionRange {
    pub start: i64,
    pub start_offset: i64,
    pub end: i64,
    pub end_offset: i64,
}

/// 选区负载
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectionData {
    pub ranges: Vec<SelectionRange>,
}

/// 剪贴板动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardAction {
    Copy,
    Cut,
    Paste,
}

/// 失败的网络请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFailure {
    pub url: String,
    pub method: String,
    /// HTTP 状态码；0 表示请求未得到响应（网络错误、被拦截等）
    pub status: u16,
}
