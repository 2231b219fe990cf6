//! # 录制目录扫描服务
//!
//! 列出目录下的所有录制文件（`.json` / `.jsonl`），并行获取文件元数据。
//!
//! ## 实现方式
//! 1. 使用 `tokio::fs::read_dir` 异步读取目录
//! 2. 使用 `tokio::task::JoinSet` 并行 stat 所有录制文件
//! 3. 按修改时间倒序返回（最新的录制排在前面）

use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;

use crate::models::recording::RecordingFile;

/// 录制文件扩展名
const RECORDING_EXTENSIONS: [&str; 2] = ["json", "jsonl"];

/// 并行扫描目录下的录制文件
///
/// 只扫描一层，不递归子目录；隐藏文件（`.` 开头）被跳过。
///
/// # 参数
/// - `dir` - 录制文件所在目录
///
/// # 返回值
/// 按修改时间降序排列的 RecordingFile 数组；目录不存在时返回空数组
///
/// # 错误
/// 目录存在但无法读取时返回错误
pub async fn scan_recordings(dir: &Path) -> Result<Vec<RecordingFile>, String> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| format!("读取录制目录失败: {}", e))?;

    // 第一步：收集候选文件
    let mut candidates = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| format!("遍历录制目录条目失败: {}", e))?
    {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();
        if file_name.starts_with('.') || !is_recording_file(&path) {
            continue;
        }
        candidates.push(path);
    }

    // 第二步：并行获取元数据
    let mut join_set = JoinSet::new();
    for path in candidates {
        join_set.spawn(async move {
            let metadata = tokio::fs::metadata(&path).await.ok()?;
            if !metadata.is_file() {
                return None;
            }
            let modified: DateTime<Utc> = metadata.modified().ok()?.into();
            let id = path.file_stem()?.to_string_lossy().to_string();

            Some(RecordingFile {
                id,
                file_path: path.to_string_lossy().to_string(),
                size: metadata.len(),
                modified,
            })
        });
    }

    // 第三步：收集结果，单个文件失败只记录日志
    let mut recordings = Vec::new();
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(Some(recording)) => recordings.push(recording),
            Ok(None) => {}
            Err(e) => log::warn!("获取录制文件元数据的任务失败: {}", e),
        }
    }

    recordings.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));
    Ok(recordings)
}

/// 按扩展名判断是否是录制文件（大小写不敏感）
fn is_recording_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            RECORDING_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
