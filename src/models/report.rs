//! # 分析报告数据模型
//!
//! 定义了引擎的最终输出 `SemanticSession` 及其组成部分。
//! 所有结构体派生 `Serialize`/`Deserialize` 并使用 camelCase 字段名，
//! 供下游的上下文生成组件直接消费。
//!
//! ## 数据流
//! ```text
//! Value → decoder::decode_events → Vec<RawEvent>
//!       → classifier::InteractionClassifier（逐事件折叠）
//!       → aggregator::assemble_report → SemanticSession
//! ```

use serde::{Deserialize, Serialize};

/// 日志标记：同一节点 2 秒内第 3 次及以后的点击
pub const FLAG_RAGE_CLICK: &str = "[RAGE CLICK]";
/// 日志标记：点击后 1 秒内页面没有任何 DOM 变化
pub const FLAG_NO_RESPONSE: &str = "[NO RESPONSE]";
/// 日志标记：点击了提交类控件
pub const FLAG_FORM_SUBMIT: &str = "[FORM SUBMIT]";
/// 日志标记：输入框被清空
pub const FLAG_CLEARED: &str = "[CLEARED]";
/// 日志标记：两次滚动间隔过短
pub const FLAG_RAPID_SCROLL: &str = "[RAPID SCROLL]";
/// 日志标记：滚动方向反转
pub const FLAG_DIRECTION_CHANGE: &str = "[DIRECTION CHANGE]";
/// 日志标记：长时间悬停未点击
pub const FLAG_HESITATION: &str = "[HESITATION]";
/// 日志标记：横竖屏切换
pub const FLAG_ORIENTATION_CHANGE: &str = "[ORIENTATION CHANGE]";

/// 单条语义日志
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// 相对会话开始的时间（mm:ss）
    pub timestamp: String,
    /// 原始 epoch 毫秒时间戳，供下游与其他分析事件关联
    pub raw_timestamp: i64,
    /// 动作标签，如 "Clicked"、"Typed"
    pub action: String,
    /// 可读描述（已脱敏）
    pub details: String,
    /// 标记列表，如 `[RAGE CLICK]`
    pub flags: Vec<String>,
}

impl LogEntry {
    /// 追加标记（已存在时不重复添加）
    pub fn add_flag(&mut self, flag: &str) {
        if !self.has_flag(flag) {
            self.flags.push(flag.to_string());
        }
    }

    /// 是否带有指定标记
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

/// 会话级计数器
///
/// `hover_time` 与 `idle_time` 单位为毫秒，`scroll_depth_max` 为百分比（0-100），
/// 其余均为次数。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_clicks: u32,
    pub rage_clicks: u32,
    pub dead_clicks: u32,
    pub double_clicks: u32,
    pub right_clicks: u32,
    pub total_inputs: u32,
    pub abandoned_inputs: u32,
    pub cleared_inputs: u32,
    pub form_submissions: u32,
    pub total_scrolls: u32,
    pub scroll_depth_max: u32,
    pub rapid_scrolls: u32,
    pub scroll_reversals: u32,
    pub total_hovers: u32,
    pub hesitations: u32,
    pub hover_time: u64,
    pub total_touches: u32,
    pub swipes: u32,
    pub pinch_zooms: u32,
    pub total_media_interactions: u32,
    pub video_plays: u32,
    pub video_pauses: u32,
    pub total_selections: u32,
    pub copy_events: u32,
    pub paste_events: u32,
    pub console_errors: u32,
    pub network_errors: u32,
    pub tab_switches: u32,
    pub idle_time: u64,
    pub resize_events: u32,
    pub orientation_changes: u32,
    /// 无法识别 type / source 的事件数量（只计数，不参与分类）
    pub unrecognized_events: u32,
}

/// 行为信号
///
/// 在整个事件序列折叠进 `SessionSummary` 之后一次性推导，
/// 是汇总计数的纯函数（`is_mobile` 额外取决于是否出现过触摸事件）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralSignals {
    pub is_frustrated: bool,
    pub is_exploring: bool,
    pub is_engaged: bool,
    pub is_confused: bool,
    pub is_mobile: bool,
    pub completed_goal: bool,
}

/// 最终分析报告
///
/// 每次调用构造一次，返回后不可变；调用之间不共享任何可变状态。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticSession {
    /// 会话时长（mm:ss）
    pub total_duration: String,
    /// 原始输入长度（包含无法使用的事件）
    pub event_count: usize,
    pub page_url: String,
    pub page_title: String,
    /// 视口尺寸，如 "1280x720"；未知时为空字符串
    pub viewport_size: String,
    /// 按时间顺序排列的语义日志
    pub logs: Vec<LogEntry>,
    pub summary: SessionSummary,
    pub behavioral_signals: BehavioralSignals,
}

impl SemanticSession {
    /// 空报告：时长 "00:00"、计数器全零、日志为空，`event_count` 仍反映原始输入长度，
    /// 调用方可据此区分 "没有事件" 与 "事件不可用"
    pub fn empty(event_count: usize) -> Self {
        Self {
            total_duration: "00:00".to_string(),
            event_count,
            ..Self::default()
        }
    }
}
