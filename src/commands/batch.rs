//! # 批量分析命令
//!
//! 扫描目录 → 读取所有录制文件 → 用 rayon 并行分析（每个会话独立折叠）。
//! 单个文件失败只记录在对应条目中，不影响其他文件。

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::models::report::SemanticSession;
use crate::models::settings::AnalyzerConfig;
use crate::services::{analyzer, parser, scanner};

/// 单个录制文件的批量分析结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub id: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SemanticSession>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `batch` 子命令：分析目录下的全部录制文件
///
/// # 返回值
/// 与扫描顺序一致（最新的录制在前）的结果列表
///
/// # 错误
/// 目录无法读取时返回错误
pub async fn run_batch(dir: &Path, config: &AnalyzerConfig) -> Result<Vec<BatchEntry>, String> {
    let recordings = scanner::scan_recordings(dir).await?;
    log::info!("在 {} 中找到 {} 个录制文件", dir.display(), recordings.len());

    // 读取失败的文件在这里就确定了结果，只把读取成功的交给并行分析
    let mut loaded: Vec<Value> = Vec::with_capacity(recordings.len());
    let mut read_errors: Vec<Option<String>> = Vec::with_capacity(recordings.len());
    for recording in &recordings {
        match parser::read_recording(Path::new(&recording.file_path)).await {
            Ok(events) => {
                loaded.push(events);
                read_errors.push(None);
            }
            Err(e) => {
                log::warn!("{}", e);
                read_errors.push(Some(e));
            }
        }
    }

    let mut analyzed = analyzer::analyze_batch(&loaded, config).into_iter();
    let entries = recordings
        .into_iter()
        .zip(read_errors)
        .map(|(recording, read_error)| {
            let (report, error) = match read_error {
                Some(e) => (None, Some(e)),
                None => match analyzed.next() {
                    Some(Ok(report)) => (Some(report), None),
                    Some(Err(e)) => (None, Some(e.to_string())),
                    None => (None, Some("分析结果缺失".to_string())),
                },
            };
            BatchEntry {
                id: recording.id,
                file_path: recording.file_path,
                report,
                error,
            }
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_mixes_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ok.json"),
            r#"[{"type":4,"timestamp":1000,"data":{"href":"https://a.test","width":800,"height":600}},
                {"type":3,"timestamp":3000,"data":{"source":3,"id":1,"x":0,"y":400}}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("shape.json"), r#""just a string""#).unwrap();
        std::fs::write(dir.path().join("broken.jsonl"), "not json\nstill not\n").unwrap();

        let entries = run_batch(dir.path(), &AnalyzerConfig::default()).await.unwrap();
        assert_eq!(entries.len(), 3);

        let find = |id: &str| entries.iter().find(|e| e.id == id).unwrap();
        let ok = find("ok");
        assert_eq!(ok.report.as_ref().unwrap().summary.total_scrolls, 1);
        assert!(ok.error.is_none());
        assert!(find("shape").error.is_some());
        assert!(find("broken").error.as_deref().unwrap().contains("解析录制文件"));
    }
}
