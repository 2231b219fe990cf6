//! # 录制文件数据模型
//!
//! 目录扫描的结果：每个录制文件一条记录，
//! 由 `services::scanner` 生成，批量分析时按修改时间倒序处理。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 录制文件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingFile {
    /// 录制 ID：去掉扩展名的文件名
    pub id: String,

    /// 文件完整路径
    pub file_path: String,

    /// 文件大小（字节）
    pub size: u64,

    /// 最后修改时间（UTC）
    pub modified: DateTime<Utc>,
}
