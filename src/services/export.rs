//! # 报告导出服务
//!
//! 把 `SemanticSession` 导出为字符串：
//! - **JSON**：完整报告，camelCase 字段，美化输出，供程序消费
//! - **Markdown**：供人阅读的摘要，包含概览、行为信号、非零计数器和时间线

use serde_json::Value;

use crate::models::report::SemanticSession;

/// 将报告导出为美化的 JSON 字符串（2 空格缩进）
///
/// # 错误
/// 序列化失败时返回错误信息
pub fn to_json(report: &SemanticSession) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("序列化报告失败: {}", e))
}

/// 将报告导出为 Markdown 格式字符串
///
/// # 参数
/// - `report` - 分析报告
/// - `source_name` - 录制来源名称（通常是文件名），用作文档标题
pub fn to_markdown(report: &SemanticSession, source_name: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# Session: {}", source_name));
    lines.push(String::new());

    // 概览
    lines.push("## Overview".into());
    lines.push(String::new());
    lines.push(format!("- Duration: {}", report.total_duration));
    lines.push(format!("- Events: {}", report.event_count));
    if !report.page_url.is_empty() {
        lines.push(format!("- Page: {}", report.page_url));
    }
    if !report.page_title.is_empty() {
        lines.push(format!("- Title: {}", report.page_title));
    }
    if !report.viewport_size.is_empty() {
        lines.push(format!("- Viewport: {}", report.viewport_size));
    }
    lines.push(String::new());

    // 行为信号：只列出命中的信号
    lines.push("## Signals".into());
    lines.push(String::new());
    let signals = &report.behavioral_signals;
    let active: Vec<&str> = [
        (signals.is_frustrated, "frustrated"),
        (signals.is_exploring, "exploring"),
        (signals.is_engaged, "engaged"),
        (signals.is_confused, "confused"),
        (signals.is_mobile, "mobile"),
        (signals.completed_goal, "completed goal"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    if active.is_empty() {
        lines.push("None".into());
    } else {
        lines.push(active.join(", "));
    }
    lines.push(String::new());

    // 计数器：借助 serde 的 camelCase 名称，只列出非零项
    lines.push("## Counters".into());
    lines.push(String::new());
    let counters = nonzero_counters(report);
    if counters.is_empty() {
        lines.push("None".into());
    } else {
        lines.push("| Counter | Value |".into());
        lines.push("| --- | --- |".into());
        for (name, value) in counters {
            lines.push(format!("| {} | {} |", name, value));
        }
    }
    lines.push(String::new());

    // 时间线
    lines.push("## Timeline".into());
    lines.push(String::new());
    if report.logs.is_empty() {
        lines.push("No interactions recorded.".into());
    }
    for entry in &report.logs {
        let mut line = format!("- `{}` **{}** {}", entry.timestamp, entry.action, entry.details);
        if !entry.flags.is_empty() {
            line.push(' ');
            line.push_str(&entry.flags.join(" "));
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.join("\n")
}

/// 收集非零计数器（按 camelCase 名称排序）
fn nonzero_counters(report: &SemanticSession) -> Vec<(String, u64)> {
    let Ok(Value::Object(fields)) = serde_json::to_value(&report.summary) else {
        return Vec::new();
    };
    fields
        .into_iter()
        .filter_map(|(name, value)| value.as_u64().filter(|v| *v > 0).map(|v| (name, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{FLAG_RAGE_CLICK, LogEntry};

    fn sample() -> SemanticSession {
        let mut report = SemanticSession::empty(3);
        report.total_duration = "00:02".into();
        report.page_url = "https://shop.example.com".into();
        report.summary.total_clicks = 3;
        report.summary.rage_clicks = 1;
        report.behavioral_signals.is_frustrated = true;
        report.logs.push(LogEntry {
            timestamp: "00:01".into(),
            raw_timestamp: 1900,
            action: "Clicked".into(),
            details: "the 'Save' button".into(),
            flags: vec![FLAG_RAGE_CLICK.to_string()],
        });
        report
    }

    #[test]
    fn test_markdown_digest() {
        let md = to_markdown(&sample(), "checkout.json");
        assert!(md.starts_with("# Session: checkout.json"));
        assert!(md.contains("- Page: https://shop.example.com"));
        assert!(md.contains("frustrated"));
        assert!(md.contains("| totalClicks | 3 |"));
        assert!(!md.contains("deadClicks"));
        assert!(md.contains("- `00:01` **Clicked** the 'Save' button [RAGE CLICK]"));
    }

    #[test]
    fn test_markdown_empty_report() {
        let md = to_markdown(&SemanticSession::empty(0), "empty.json");
        assert!(md.contains("No interactions recorded."));
        assert!(!md.contains("- Page:"));
    }

    #[test]
    fn test_json_round_trip() {
        let report = sample();
        let json = to_json(&report).unwrap();
        let back: SemanticSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
