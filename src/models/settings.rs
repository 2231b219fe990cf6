//! # 分析器配置数据模型
//!
//! 定义了引擎所有可调阈值（AnalyzerConfig）。
//! 配置文件为 JSON（camelCase 字段名），缺失字段使用默认值，
//! 因此用户只需写出想要覆盖的那几项。
//!
//! 注意：行为信号中由产品定义固定的阈值（狂点 > 0、无响应点击 > 2、
//! 滚动 > 20、点击 < 5、点击 > 3、30 秒）不在这里，见 `services::aggregator`。

use serde::{Deserialize, Serialize};

/// 分析器配置
///
/// 配置文件示例：
/// ```json
/// {
///   "rageClickWindowMs": 2000,
///   "deadClickWindowMs": 1000,
///   "idleThresholdMs": 10000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    /// 狂点检测窗口：同一节点在此窗口内的点击参与计数
    pub rage_click_window_ms: i64,
    /// 窗口内达到多少次点击（含当前这次）判定为狂点
    pub rage_click_threshold: usize,
    /// 点击后等待 DOM 变化的窗口，超过则判定为无响应点击
    pub dead_click_window_ms: i64,
    /// 两次滚动间隔小于此值判定为快速滚动
    pub rapid_scroll_interval_ms: i64,
    /// 悬停至少持续多久才计为一次悬停
    pub hover_min_ms: i64,
    /// 悬停超过此时长且未点击该节点，判定为犹豫
    pub hesitation_dwell_ms: i64,
    /// 为 true 时只在可交互元素（按钮、链接、表单控件等）上统计犹豫
    pub hesitation_interactive_only: bool,
    /// 相邻两条事件间隔超过此值时，整段间隔计入空闲时间
    pub idle_threshold_ms: i64,
    /// 输入框最后一次输入距会话结束超过此值且未提交，判定为放弃输入
    pub input_abandon_ms: i64,
    /// 触摸起止点距离超过此值（像素）判定为滑动
    pub swipe_min_distance_px: f64,
    /// 双指距离相对变化超过此比例判定为缩放
    pub pinch_scale_ratio: f64,
    /// 犹豫次数超过此值判定为困惑
    pub confusion_hesitation_threshold: u32,
    /// 滚动反转占比超过此值判定为困惑
    pub confusion_reversal_ratio: f64,
    /// 计算滚动反转占比所需的最少滚动次数
    pub confusion_min_scrolls: u32,
    /// 可见文本作为元素名称的最大字符数
    pub max_label_chars: usize,
    /// 缺少 Meta 事件时用于计算滚动深度的视口高度
    pub fallback_viewport_height: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            rage_click_window_ms: 2000,
            rage_click_threshold: 3,
            dead_click_window_ms: 1000,
            rapid_scroll_interval_ms: 100,
            hover_min_ms: 300,
            hesitation_dwell_ms: 2000,
            hesitation_interactive_only: false,
            idle_threshold_ms: 10_000,
            input_abandon_ms: 5000,
            swipe_min_distance_px: 50.0,
            pinch_scale_ratio: 0.2,
            confusion_hesitation_threshold: 3,
            confusion_reversal_ratio: 0.3,
            confusion_min_scrolls: 5,
            max_label_chars: 40,
            fallback_viewport_height: 800,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        // 只覆盖一个字段，其余保持默认
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{ "rageClickWindowMs": 3000 }"#).unwrap();
        assert_eq!(config.rage_click_window_ms, 3000);
        assert_eq!(config.dead_click_window_ms, 1000);
        assert_eq!(config.rage_click_threshold, 3);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: AnalyzerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn test_hesitation_interactive_only_defaults_off() {
        assert!(!AnalyzerConfig::default().hesitation_interactive_only);
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{ "hesitationInteractiveOnly": true }"#).unwrap();
        assert!(config.hesitation_interactive_only);
        assert_eq!(config.hesitation_dwell_ms, 2000);
    }
}
