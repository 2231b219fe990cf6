//! # 时间格式化工具函数
//!
//! 报告中的时间统一以 "mm:ss" 表示（相对会话开始），
//! 分钟数超过 99 时不截断，负值按 0 处理。

/// 将毫秒时长格式化为 "mm:ss"
///
/// # 参数
/// - `millis` - 毫秒数（负数视为 0）
///
/// # 示例
/// ```
/// use replay_insight::utils::time::format_clock;
/// assert_eq!(format_clock(65_400), "01:05");
/// ```
pub fn format_clock(millis: i64) -> String {
    let total_secs = millis.max(0) / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// 将毫秒时长格式化为便于阅读的秒数，如 "2.5s"
pub fn format_seconds(millis: i64) -> String {
    format!("{:.1}s", millis.max(0) as f64 / 1000.0)
}
