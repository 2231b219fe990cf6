//! # 汇总与报告组装
//!
//! 分类器折叠完成后执行一次：
//! - 推导放弃输入数
//! - 由汇总计数推导行为信号
//! - 组装最终的 `SemanticSession`
//!
//! 这里的函数都是纯函数，不持有任何状态。

use crate::models::report::{BehavioralSignals, SemanticSession, SessionSummary};
use crate::models::settings::AnalyzerConfig;
use crate::services::classifier::ClassifiedSession;
use crate::utils::time::format_clock;

/// 判定 "沮丧" 的无响应点击数下限（严格大于）
const FRUSTRATION_DEAD_CLICKS: u32 = 2;
/// 判定 "探索" 的滚动次数下限（严格大于）
const EXPLORING_MIN_SCROLLS: u32 = 20;
/// 判定 "探索" 的点击次数上限（严格小于）
const EXPLORING_MAX_CLICKS: u32 = 5;
/// 判定 "投入" 的点击次数下限（严格大于）
const ENGAGED_MIN_CLICKS: u32 = 3;
/// 判定 "投入" 的会话时长下限（毫秒，严格大于）
const ENGAGED_MIN_DURATION_MS: i64 = 30_000;

/// 由汇总计数推导行为信号
///
/// # 参数
/// - `summary` - 已填好全部计数器（含 `abandoned_inputs`）的汇总
/// - `duration_ms` - 会话时长（毫秒）
/// - `saw_touch` - 是否出现过触摸事件
/// - `config` - 困惑判定阈值
pub fn derive_signals(
    summary: &SessionSummary,
    duration_ms: i64,
    saw_touch: bool,
    config: &AnalyzerConfig,
) -> BehavioralSignals {
    let reversal_heavy = summary.total_scrolls >= config.confusion_min_scrolls
        && summary.total_scrolls > 0
        && f64::from(summary.scroll_reversals) / f64::from(summary.total_scrolls)
            > config.confusion_reversal_ratio;

    BehavioralSignals {
        is_frustrated: summary.rage_clicks > 0 || summary.dead_clicks > FRUSTRATION_DEAD_CLICKS,
        is_exploring: summary.total_scrolls > EXPLORING_MIN_SCROLLS
            && summary.total_clicks < EXPLORING_MAX_CLICKS,
        is_engaged: summary.total_clicks > ENGAGED_MIN_CLICKS
            && summary.total_inputs > 0
            && duration_ms > ENGAGED_MIN_DURATION_MS,
        is_confused: summary.hesitations > config.confusion_hesitation_threshold
            || reversal_heavy,
        is_mobile: saw_touch,
        completed_goal: summary.form_submissions >= 1,
    }
}

/// 统计放弃的输入框
///
/// 满足以下全部条件的输入框计为放弃：
/// - 最后的值非空
/// - 最后一次输入之后没有任何表单提交
/// - 最后一次输入距会话结束至少 `input_abandon_ms`
pub fn count_abandoned_inputs(session: &ClassifiedSession, config: &AnalyzerConfig) -> u32 {
    let Some(end) = session.session_end else {
        return 0;
    };
    let abandoned = session
        .fields
        .values()
        .filter(|field| !field.last_value.is_empty())
        .filter(|field| {
            session
                .last_submit_at
                .is_none_or(|submitted| submitted < field.last_input_at)
        })
        .filter(|field| end.saturating_sub(field.last_input_at) >= config.input_abandon_ms)
        .count();
    u32::try_from(abandoned).unwrap_or(u32::MAX)
}

/// 组装最终报告
///
/// 没有任何可用时间戳时返回空报告（`event_count` 仍为原始长度）。
pub fn assemble_report(
    session: ClassifiedSession,
    event_count: usize,
    config: &AnalyzerConfig,
) -> SemanticSession {
    let (Some(start), Some(end)) = (session.session_start, session.session_end) else {
        return SemanticSession::empty(event_count);
    };
    let duration_ms = end.saturating_sub(start).max(0);

    let mut summary = session.summary.clone();
    summary.abandoned_inputs = count_abandoned_inputs(&session, config);
    let behavioral_signals = derive_signals(&summary, duration_ms, session.saw_touch, config);

    SemanticSession {
        total_duration: format_clock(duration_ms),
        event_count,
        page_url: session.page_url,
        page_title: session.page_title,
        viewport_size: session
            .viewport
            .map(|(w, h)| format!("{}x{}", w, h))
            .unwrap_or_default(),
        logs: session.logs,
        summary,
        behavioral_signals,
    }
}
