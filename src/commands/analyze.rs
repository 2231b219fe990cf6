//! # 单文件分析命令
//!
//! 读取录制文件 → 分析 → 按指定格式导出到文件或标准输出。

use std::path::Path;

use crate::commands::ExportFormat;
use crate::models::report::SemanticSession;
use crate::models::settings::AnalyzerConfig;
use crate::services::{analyzer, export, parser};

/// 读取并分析单个录制文件
///
/// # 参数
/// - `file` - 录制文件路径
/// - `config` - 分析配置
///
/// # 错误
/// 文件读取、解析失败，或事件序列形状不合法时返回错误
pub async fn analyze_file(file: &Path, config: &AnalyzerConfig) -> Result<SemanticSession, String> {
    let events = parser::read_recording(file).await?;
    let report = analyzer::analyze_value(&events, config)
        .map_err(|e| format!("分析 {} 失败: {}", file.display(), e))?;

    log::info!(
        "{}: {} 条事件，{} 条日志，时长 {}",
        file.display(),
        report.event_count,
        report.logs.len(),
        report.total_duration
    );
    Ok(report)
}

/// 渲染报告
pub fn render(report: &SemanticSession, format: ExportFormat, source_name: &str) -> Result<String, String> {
    match format {
        ExportFormat::Json => export::to_json(report),
        ExportFormat::Markdown => Ok(export::to_markdown(report, source_name)),
    }
}

/// `analyze` 子命令
///
/// # 参数
/// - `file` - 录制文件路径
/// - `format` - 导出格式
/// - `output` - 输出文件；`None` 时写到标准输出
/// - `config` - 分析配置
pub async fn run_analyze(
    file: &Path,
    format: ExportFormat,
    output: Option<&Path>,
    config: &AnalyzerConfig,
) -> Result<(), String> {
    let report = analyze_file(file, config).await?;
    let source_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string());
    let rendered = render(&report, format, &source_name)?;

    match output {
        Some(path) => tokio::fs::write(path, rendered)
            .await
            .map_err(|e| format!("写入报告文件 {} 失败: {}", path.display(), e)),
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = r#"{"events":[
        {"type":4,"timestamp":1000,"data":{"href":"https://shop.example.com","width":1280,"height":720}},
        {"type":2,"timestamp":1001,"data":{"node":{"type":0,"id":1,"childNodes":[
            {"type":2,"id":2,"tagName":"button","childNodes":[{"type":3,"id":3,"textContent":"Buy"}]}
        ]}}},
        {"type":3,"timestamp":2000,"data":{"source":2,"type":2,"id":2}},
        {"type":3,"timestamp":2300,"data":{"source":2,"type":2,"id":2}},
        {"type":3,"timestamp":2600,"data":{"source":2,"type":2,"id":2}}
    ]}"#;

    #[tokio::test]
    async fn test_analyze_file_and_write_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("checkout.json");
        std::fs::write(&input, RECORDING).unwrap();

        let config = AnalyzerConfig::default();
        let report = analyze_file(&input, &config).await.unwrap();
        assert_eq!(report.viewport_size, "1280x720");
        assert_eq!(report.summary.total_clicks, 3);
        assert_eq!(report.summary.rage_clicks, 1);

        let output = dir.path().join("report.md");
        run_analyze(&input, ExportFormat::Markdown, Some(&output), &config)
            .await
            .unwrap();
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("# Session: checkout.json"));
        assert!(written.contains("[RAGE CLICK]"));
    }

    #[tokio::test]
    async fn test_invalid_shape_reports_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.json");
        std::fs::write(&input, "[1, 2]").unwrap();
        let err = analyze_file(&input, &AnalyzerConfig::default()).await.unwrap_err();
        assert!(err.contains("bad.json"));
    }
}
