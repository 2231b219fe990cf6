//! # 引擎错误类型
//!
//! 引擎对稀疏、损坏的事件一律本地降级处理，不会报错；
//! 只有输入形状违反调用约定（顶层不是数组、数组元素不是对象）时才返回错误，
//! 避免上游把一个误导性的空报告当作真实的空会话保存。

use thiserror::Error;

/// 分析输入违反调用约定
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    /// 顶层既不是数组也不是 null
    #[error("录制数据必须是事件数组，实际类型为 {found}")]
    NotASequence { found: &'static str },

    /// 数组元素不是 JSON 对象
    #[error("第 {index} 条事件不是 JSON 对象，实际类型为 {found}")]
    InvalidEvent { index: usize, found: &'static str },
}
