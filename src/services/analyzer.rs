//! # 分析入口
//!
//! 把解码、分类、汇总三个阶段串起来：
//! ```text
//! &[RawEvent] → InteractionClassifier::process（逐条折叠）→ finish → assemble_report
//! ```
//!
//! 每次调用各自构造分类器，调用之间不共享任何可变状态，
//! 因此多个会话可以放心地并行分析（见 `analyze_batch`）。

use rayon::prelude::*;
use serde_json::Value;

use crate::error::AnalyzeError;
use crate::models::event::RawEvent;
use crate::models::report::SemanticSession;
use crate::models::settings::AnalyzerConfig;
use crate::services::aggregator::assemble_report;
use crate::services::classifier::InteractionClassifier;
use crate::services::decoder::decode_events;

/// 分析一个已解码的事件序列
///
/// 事件需按时间戳升序排列。不会失败：缺失或损坏的数据在局部降级处理，
/// 空序列或没有任何可用时间戳时返回空报告。
pub fn analyze_events(events: &[RawEvent], config: &AnalyzerConfig) -> SemanticSession {
    let mut classifier = InteractionClassifier::new(config);
    for event in events {
        classifier.process(event);
    }
    assemble_report(classifier.finish(), events.len(), config)
}

/// 分析原始 JSON 事件序列
///
/// # 错误
/// 顶层既不是数组也不是 null，或某个元素不是 JSON 对象时返回 `AnalyzeError`。
pub fn analyze_value(input: &Value, config: &AnalyzerConfig) -> Result<SemanticSession, AnalyzeError> {
    let events = decode_events(input)?;
    Ok(analyze_events(&events, config))
}

/// 并行分析多个互相独立的会话
///
/// 结果顺序与输入一致，单个会话的错误不影响其他会话。
pub fn analyze_batch(
    sessions: &[Value],
    config: &AnalyzerConfig,
) -> Vec<Result<SemanticSession, AnalyzeError>> {
    sessions
        .par_iter()
        .map(|session| analyze_value(session, config))
        .collect()
}
