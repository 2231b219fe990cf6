//! # 交互分类器
//!
//! 按时间顺序逐条折叠录制事件，维护节点表和若干滚动窗口状态，
//! 产出计数器和语义日志。这是引擎唯一的有状态组件。
//!
//! ## 前置条件
//! 事件必须已按时间戳升序排列。乱序输入的行为未定义：
//! 分类器只记录一次警告，不会重新排序。
//!
//! ## 状态
//! - 节点表：完整快照重建、DOM 变更原地更新
//! - 每节点点击历史：狂点检测（窗口内第 3 次及以后的点击）
//! - 待响应点击队列：任意节点的 DOM 变更在窗口内到达即视为页面有响应，
//!   窗口过期（下一条事件晚于点击 + 窗口）或会话结束仍未响应则回溯标记为无响应点击
//! - 滚动轨迹：最大深度、方向反转、快速滚动
//! - 悬停轨迹：鼠标移动位置推导出的悬停与犹豫
//! - 触摸轨迹：滑动和双指缩放
//! - 输入框状态：清空检测，供聚合阶段判断放弃输入
//!
//! 没有离散的命名状态，所有窗口都在访问时惰性裁剪，不依赖定时器。

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::models::event::{
    ClipboardAction, EventKind, IncrementalData, InputData, MediaAction, MediaData, MetaData,
    MouseInteractionData, MouseInteractionKind, NetworkFailure, PointerPosition, RawEvent,
    ScrollData, SelectionData, ViewportData,
};
use crate::models::report::{
    FLAG_CLEARED, FLAG_DIRECTION_CHANGE, FLAG_FORM_SUBMIT, FLAG_HESITATION, FLAG_NO_RESPONSE,
    FLAG_ORIENTATION_CHANGE, FLAG_RAGE_CLICK, FLAG_RAPID_SCROLL, LogEntry, SessionSummary,
};
use crate::models::settings::AnalyzerConfig;
use crate::services::namer;
use crate::services::node_map::NodeMap;
use crate::services::redactor::{REDACTED, redact};
use crate::utils::time::{format_clock, format_seconds};

/// 错误信息写入日志前的最大字符数
const MAX_ERROR_MESSAGE_CHARS: usize = 200;

/// 单个节点的近期点击历史
///
/// 首次点击时惰性创建；每次检查前裁剪掉窗口外的时间戳，
/// 长度上限为狂点阈值，不会无限增长。
#[derive(Debug, Default)]
struct ClickHistory {
    recent: VecDeque<i64>,
}

impl ClickHistory {
    /// 裁剪窗口外的点击，返回窗口内（不含本次）的点击数
    fn prune(&mut self, now: i64, window_ms: i64) -> usize {
        while self.recent.front().is_some_and(|&t| now.saturating_sub(t) > window_ms) {
            self.recent.pop_front();
        }
        self.recent.len()
    }

    fn record(&mut self, now: i64, capacity: usize) {
        self.recent.push_back(now);
        while self.recent.len() > capacity {
            self.recent.pop_front();
        }
    }
}

/// 等待页面响应的点击
#[derive(Debug, Clone, Copy)]
struct PendingClick {
    at: i64,
    log_index: usize,
}

/// 滚动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// 会话级滚动轨迹
#[derive(Debug, Default)]
struct ScrollTrack {
    /// 观测到的最大深度（百分比）
    max_depth: u32,
    last_y: Option<f64>,
    last_direction: Option<ScrollDirection>,
    reversals: u32,
    last_at: Option<i64>,
    /// 当前合并中的滚动日志下标及其方向
    log: Option<(usize, ScrollDirection)>,
}

/// 当前悬停
#[derive(Debug, Clone, Copy)]
struct HoverTrack {
    node: i64,
    since: i64,
    clicked: bool,
}

/// 当前触摸手势
#[derive(Debug, Default)]
struct TouchTrack {
    /// 起点：(时间, x, y)
    start: Option<(i64, f64, f64)>,
    /// 双指初始距离
    pinch_base: Option<f64>,
    /// 本次手势是否已计过缩放
    pinch_counted: bool,
}

/// 单个输入框的状态
#[derive(Debug, Clone, Default)]
pub struct FieldState {
    pub last_value: String,
    pub last_input_at: i64,
    /// 当前合并中的输入日志下标
    pub(crate) log_index: Option<usize>,
}

/// 折叠结束后交给聚合阶段的结果
#[derive(Debug)]
pub struct ClassifiedSession {
    pub summary: SessionSummary,
    pub logs: Vec<LogEntry>,
    /// 第一个可用时间戳；`None` 表示没有任何可用事件
    pub session_start: Option<i64>,
    pub session_end: Option<i64>,
    pub page_url: String,
    pub page_title: String,
    pub viewport: Option<(u32, u32)>,
    pub saw_touch: bool,
    pub fields: HashMap<i64, FieldState>,
    pub last_submit_at: Option<i64>,
}

/// 交互分类器：持有单次分析的全部可变状态
pub struct InteractionClassifier<'a> {
    config: &'a AnalyzerConfig,
    node_map: NodeMap,
    summary: SessionSummary,
    logs: Vec<LogEntry>,
    session_start: Option<i64>,
    last_timestamp: Option<i64>,
    click_history: HashMap<i64, ClickHistory>,
    awaiting_response: VecDeque<PendingClick>,
    scroll: ScrollTrack,
    hover: Option<HoverTrack>,
    touch: TouchTrack,
    fields: HashMap<i64, FieldState>,
    last_submit_at: Option<i64>,
    page_url: String,
    page_title: String,
    /// 报告使用的视口（第一条 Meta）
    page_viewport: Option<(u32, u32)>,
    /// 当前视口（随 Meta 和尺寸变化更新）
    viewport: Option<(u32, u32)>,
    saw_touch: bool,
    out_of_order_warned: bool,
}

impl<'a> InteractionClassifier<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self {
            config,
            node_map: NodeMap::new(),
            summary: SessionSummary::default(),
            logs: Vec::new(),
            session_start: None,
            last_timestamp: None,
            click_history: HashMap::new(),
            awaiting_response: VecDeque::new(),
            scroll: ScrollTrack::default(),
            hover: None,
            touch: TouchTrack::default(),
            fields: HashMap::new(),
            last_submit_at: None,
            page_url: String::new(),
            page_title: String::new(),
            page_viewport: None,
            viewport: None,
            saw_touch: false,
            out_of_order_warned: false,
        }
    }

    /// 折叠一条事件
    pub fn process(&mut self, event: &RawEvent) {
        let Some(ts) = event.timestamp else {
            // 没有可用时间戳：只应用结构性变化（快照、DOM 变更、页面信息），不参与分类
            self.apply_structure(&event.kind);
            return;
        };

        if let Some(last) = self.last_timestamp {
            if ts < last && !self.out_of_order_warned {
                log::warn!("事件时间戳乱序（{} < {}），分析结果可能不准确", ts, last);
                self.out_of_order_warned = true;
            }
            let gap = ts.saturating_sub(last);
            if gap > self.config.idle_threshold_ms {
                self.summary.idle_time = self.summary.idle_time.saturating_add(gap as u64);
                self.push_log(last, "Idle", format!("No activity for {}", format_seconds(gap)));
            }
        }
        self.session_start.get_or_insert(ts);
        self.expire_pending_clicks(ts);
        self.last_timestamp = Some(ts);

        match &event.kind {
            EventKind::Meta(meta) => self.on_meta(ts, meta),
            EventKind::FullSnapshot(_) => self.apply_structure(&event.kind),
            EventKind::Incremental(data) => self.on_incremental(ts, data),
            EventKind::Clipboard(action) => self.on_clipboard(ts, *action),
            EventKind::Visibility { hidden } => self.on_visibility(ts, *hidden),
            EventKind::ConsoleError { message } => self.on_console_error(ts, message),
            EventKind::NetworkError(failures) => self.on_network_errors(ts, failures),
            // DomContentLoaded / Load：页面生命周期事件，没有交互含义
            EventKind::Other {
                event_type: Some(0 | 1),
            } => {}
            EventKind::Other { event_type } => {
                log::debug!("忽略无法识别的事件类型 {:?}", event_type);
                self.summary.unrecognized_events += 1;
            }
        }
    }

    /// 结束折叠：最终的无响应点击清算、关闭悬停
    pub fn finish(mut self) -> ClassifiedSession {
        while let Some(pending) = self.awaiting_response.pop_front() {
            self.mark_dead_click(pending);
        }
        if let Some(end) = self.last_timestamp {
            self.close_hover(end);
        }
        self.summary.scroll_reversals = self.scroll.reversals;
        self.summary.scroll_depth_max = self.scroll.max_depth;

        ClassifiedSession {
            summary: self.summary,
            logs: self.logs,
            session_start: self.session_start,
            session_end: self.last_timestamp,
            page_url: self.page_url,
            page_title: self.page_title,
            viewport: self.page_viewport,
            saw_touch: self.saw_touch,
            fields: self.fields,
            last_submit_at: self.last_submit_at,
        }
    }

    /// 应用不依赖时间的结构性变化
    fn apply_structure(&mut self, kind: &EventKind) {
        match kind {
            EventKind::FullSnapshot(Some(root)) => {
                self.node_map.rebuild(root);
                if self.page_title.is_empty() {
                    if let Some(title) = self.node_map.page_title() {
                        self.page_title = redact(&title).into_owned();
                    }
                }
            }
            EventKind::FullSnapshot(None) => {}
            EventKind::Incremental(IncrementalData::Mutation(mutation)) => {
                self.node_map.apply_mutation(mutation);
            }
            EventKind::Meta(meta) => self.record_page(meta),
            _ => {}
        }
    }

    fn record_page(&mut self, meta: &MetaData) {
        if self.page_url.is_empty() {
            self.page_url = redact(&meta.href).into_owned();
        }
        if meta.width > 0 && meta.height > 0 {
            self.page_viewport.get_or_insert((meta.width, meta.height));
            self.viewport = Some((meta.width, meta.height));
        }
    }

    fn on_meta(&mut self, ts: i64, meta: &MetaData) {
        let navigated = !self.page_url.is_empty() && !meta.href.is_empty();
        let href = redact(&meta.href).into_owned();
        if navigated && href != self.page_url {
            self.push_log(ts, "Navigated", format!("to {}", href));
        }
        self.record_page(meta);
    }

    fn on_incremental(&mut self, ts: i64, data: &IncrementalData) {
        match data {
            IncrementalData::Mutation(mutation) => {
                self.node_map.apply_mutation(mutation);
                // 过期的点击已在前面清算，队列中剩余的都在窗口内：页面有响应
                self.awaiting_response.clear();
            }
            IncrementalData::MouseMove(positions) => self.on_pointer_moves(ts, positions),
            IncrementalData::MouseInteraction(interaction) => {
                self.on_mouse_interaction(ts, interaction)
            }
            IncrementalData::Scroll(scroll) => self.on_scroll(ts, scroll),
            IncrementalData::ViewportResize(viewport) => self.on_resize(ts, viewport),
            IncrementalData::Input(input) => self.on_input(ts, input),
            IncrementalData::TouchMove(positions) => self.on_touch_moves(positions),
            IncrementalData::MediaInteraction(media) => self.on_media(ts, media),
            IncrementalData::Selection(selection) => self.on_selection(ts, selection),
            IncrementalData::Other { source } => {
                log::debug!("忽略无法识别的增量来源 {:?}", source);
                self.summary.unrecognized_events += 1;
            }
        }
    }

    // ======== 点击 ========

    fn on_mouse_interaction(&mut self, ts: i64, interaction: &MouseInteractionData) {
        if interaction.kind.is_touch() {
            self.saw_touch = true;
        }
        match interaction.kind {
            MouseInteractionKind::Click => self.on_click(ts, interaction.id),
            MouseInteractionKind::DblClick => {
                self.summary.double_clicks += 1;
                let target = self.describe(interaction.id);
                self.push_log(ts, "Double-clicked", target);
            }
            MouseInteractionKind::ContextMenu => {
                self.summary.right_clicks += 1;
                let target = self.describe(interaction.id);
                self.push_log(ts, "Right-clicked", target);
            }
            MouseInteractionKind::TouchStart => {
                self.summary.total_touches += 1;
                self.touch = TouchTrack {
                    start: interaction
                        .x
                        .zip(interaction.y)
                        .map(|(x, y)| (ts, x, y)),
                    ..TouchTrack::default()
                };
            }
            MouseInteractionKind::TouchEnd => self.on_touch_end(ts, interaction),
            MouseInteractionKind::TouchCancel => self.touch = TouchTrack::default(),
            MouseInteractionKind::MouseUp
            | MouseInteractionKind::MouseDown
            | MouseInteractionKind::Focus
            | MouseInteractionKind::Blur
            | MouseInteractionKind::TouchMoveDeparted => {}
            MouseInteractionKind::Unknown(code) => {
                log::debug!("忽略无法识别的鼠标交互类型 {}", code);
                self.summary.unrecognized_events += 1;
            }
        }
    }

    fn on_click(&mut self, ts: i64, id: i64) {
        self.summary.total_clicks += 1;
        let target = self.describe(id);
        let log_index = self.push_log(ts, "Clicked", target);

        // 狂点：窗口内已有 ≥ (阈值 - 1) 次点击
        let threshold = self.config.rage_click_threshold.max(1);
        let history = self.click_history.entry(id).or_default();
        let prior = history.prune(ts, self.config.rage_click_window_ms);
        history.record(ts, threshold);
        if prior + 1 >= threshold {
            self.summary.rage_clicks += 1;
            self.logs[log_index].add_flag(FLAG_RAGE_CLICK);
        }

        if namer::is_submit_control(&self.node_map, id) {
            self.summary.form_submissions += 1;
            self.last_submit_at = Some(ts);
            self.logs[log_index].add_flag(FLAG_FORM_SUBMIT);
        }

        if let Some(hover) = self.hover.as_mut() {
            if hover.node == id {
                hover.clicked = true;
            }
        }

        self.awaiting_response
            .push_back(PendingClick { at: ts, log_index });
    }

    /// 清算窗口已过期仍未得到响应的点击
    fn expire_pending_clicks(&mut self, now: i64) {
        let window = self.config.dead_click_window_ms;
        while self
            .awaiting_response
            .front()
            .is_some_and(|p| now.saturating_sub(p.at) > window)
        {
            if let Some(pending) = self.awaiting_response.pop_front() {
                self.mark_dead_click(pending);
            }
        }
    }

    fn mark_dead_click(&mut self, pending: PendingClick) {
        self.summary.dead_clicks += 1;
        if let Some(entry) = self.logs.get_mut(pending.log_index) {
            entry.add_flag(FLAG_NO_RESPONSE);
        }
    }

    // ======== 触摸 ========

    fn on_touch_end(&mut self, ts: i64, interaction: &MouseInteractionData) {
        let track = std::mem::take(&mut self.touch);
        let (Some((_, x0, y0)), Some(x1), Some(y1)) = (track.start, interaction.x, interaction.y)
        else {
            return;
        };
        let (dx, dy) = (x1 - x0, y1 - y0);
        if dx.hypot(dy) < self.config.swipe_min_distance_px {
            return;
        }
        self.summary.swipes += 1;
        let direction = if dx.abs() >= dy.abs() {
            if dx > 0.0 { "right" } else { "left" }
        } else if dy > 0.0 {
            "down"
        } else {
            "up"
        };
        self.push_log(ts, "Swiped", direction.to_string());
    }

    /// 触摸移动：同一时间偏移上的多个点视为多指，距离变化超过比例计为一次缩放
    fn on_touch_moves(&mut self, positions: &[PointerPosition]) {
        self.saw_touch = true;
        let mut frames: BTreeMap<i64, Vec<&PointerPosition>> = BTreeMap::new();
        for p in positions {
            frames.entry(p.time_offset).or_default().push(p);
        }
        for points in frames.values() {
            let [a, b, ..] = points.as_slice() else {
                continue;
            };
            let distance = (a.x - b.x).hypot(a.y - b.y);
            let Some(base) = self.touch.pinch_base else {
                self.touch.pinch_base = Some(distance);
                continue;
            };
            if self.touch.pinch_counted || base <= 0.0 {
                continue;
            }
            let change = (distance - base) / base;
            if change.abs() > self.config.pinch_scale_ratio {
                self.touch.pinch_counted = true;
                self.summary.pinch_zooms += 1;
                let at = self.last_timestamp.unwrap_or_default();
                let details = if change > 0.0 { "zoomed in" } else { "zoomed out" };
                self.push_log(at, "Pinch-zoomed", details.to_string());
            }
        }
    }

    // ======== 悬停 ========

    fn on_pointer_moves(&mut self, ts: i64, positions: &[PointerPosition]) {
        for p in positions {
            let at = ts.saturating_add(p.time_offset.min(0));
            if p.id < 0 {
                self.close_hover(at);
                continue;
            }
            if self.hover.is_some_and(|h| h.node == p.id) {
                continue;
            }
            self.close_hover(at);
            self.hover = Some(HoverTrack {
                node: p.id,
                since: at,
                clicked: false,
            });
        }
    }

    /// 结束当前悬停，统计悬停时长和犹豫
    ///
    /// 开启 `hesitation_interactive_only` 时，停在正文等非交互元素上不算犹豫。
    fn close_hover(&mut self, end: i64) {
        let Some(hover) = self.hover.take() else {
            return;
        };
        let dwell = end.saturating_sub(hover.since);
        if dwell < self.config.hover_min_ms {
            return;
        }
        self.summary.total_hovers += 1;
        self.summary.hover_time = self.summary.hover_time.saturating_add(dwell as u64);

        if dwell >= self.config.hesitation_dwell_ms
            && !hover.clicked
            && (!self.config.hesitation_interactive_only
                || namer::is_interactive_target(&self.node_map, hover.node))
        {
            self.summary.hesitations += 1;
            let target = self.describe(hover.node);
            let at = self
                .logs
                .last()
                .map_or(end, |l| end.max(l.raw_timestamp));
            let index = self.push_log(
                at,
                "Hesitated",
                format!("over {} for {}", target, format_seconds(dwell)),
            );
            self.logs[index].add_flag(FLAG_HESITATION);
        }
    }

    // ======== 滚动 ========

    fn on_scroll(&mut self, ts: i64, scroll: &ScrollData) {
        self.summary.total_scrolls += 1;

        let viewport_height = self
            .viewport
            .map(|(_, h)| h)
            .unwrap_or(self.config.fallback_viewport_height)
            .max(1) as f64;
        let y = scroll.y.max(0.0);
        let depth = (y / (y + viewport_height) * 100.0).round() as u32;
        self.scroll.max_depth = self.scroll.max_depth.max(depth);

        let direction = match self.scroll.last_y {
            Some(prev) if y > prev => Some(ScrollDirection::Down),
            Some(prev) if y < prev => Some(ScrollDirection::Up),
            Some(_) => None,
            None if y > 0.0 => Some(ScrollDirection::Down),
            None => None,
        };

        let reversed = matches!(
            (self.scroll.last_direction, direction),
            (Some(prev), Some(cur)) if prev != cur
        );
        if reversed {
            self.scroll.reversals += 1;
        }
        let rapid = self
            .scroll
            .last_at
            .is_some_and(|last| ts.saturating_sub(last) < self.config.rapid_scroll_interval_ms);
        if rapid {
            self.summary.rapid_scrolls += 1;
        }

        self.scroll.last_y = Some(y);
        self.scroll.last_at = Some(ts);
        if direction.is_some() {
            self.scroll.last_direction = direction;
        }

        // 同方向的连续滚动合并为一条日志
        let direction = direction.or(self.scroll.last_direction).unwrap_or(ScrollDirection::Down);
        let details = format!("{} to {}% of the page", direction.label(), depth);
        let index = match self.scroll.log {
            Some((index, dir))
                if !reversed && dir == direction && index + 1 == self.logs.len() =>
            {
                self.logs[index].details = details;
                index
            }
            _ => self.push_log(ts, "Scrolled", details),
        };
        self.scroll.log = Some((index, direction));
        if reversed {
            self.logs[index].add_flag(FLAG_DIRECTION_CHANGE);
        }
        if rapid {
            self.logs[index].add_flag(FLAG_RAPID_SCROLL);
        }
    }

    // ======== 输入 ========

    fn on_input(&mut self, ts: i64, input: &InputData) {
        self.summary.total_inputs += 1;
        let target = self.describe(input.id);

        if namer::is_toggle_control(&self.node_map, input.id) {
            let verb = if input.is_checked.unwrap_or(false) {
                "checked"
            } else {
                "unchecked"
            };
            self.push_log(ts, "Toggled", format!("{} {}", verb, target));
            return;
        }

        let field = self.fields.entry(input.id).or_default();
        let cleared = input.text.is_empty() && !field.last_value.is_empty();
        field.last_value = input.text.clone();
        field.last_input_at = ts;
        let previous_log = field.log_index;
        if cleared {
            self.summary.cleared_inputs += 1;
        }

        let details = if input.text.is_empty() {
            format!("cleared {}", target)
        } else if namer::is_password_field(&self.node_map, input.id) {
            format!("\"{}\" into {}", REDACTED, target)
        } else {
            format!("\"{}\" into {}", redact(&input.text), target)
        };

        // 同一输入框的连续输入合并为一条日志
        let index = match previous_log {
            Some(index) if index + 1 == self.logs.len() => {
                self.logs[index].details = details;
                index
            }
            _ => self.push_log(ts, "Typed", details),
        };
        if cleared {
            self.logs[index].add_flag(FLAG_CLEARED);
        }
        if let Some(field) = self.fields.get_mut(&input.id) {
            field.log_index = Some(index);
        }
    }

    // ======== 媒体 / 选区 / 剪贴板 / 视口 / 可见性 / 错误 ========

    fn on_media(&mut self, ts: i64, media: &MediaData) {
        let action = match media.action {
            MediaAction::Play => {
                self.summary.video_plays += 1;
                "Played media"
            }
            MediaAction::Pause => {
                self.summary.video_pauses += 1;
                "Paused media"
            }
            MediaAction::Seeked => "Seeked media",
            MediaAction::VolumeChange => "Changed volume",
            MediaAction::RateChange => "Changed playback speed",
            MediaAction::Unknown(code) => {
                log::debug!("忽略无法识别的媒体交互类型 {}", code);
                self.summary.unrecognized_events += 1;
                return;
            }
        };
        self.summary.total_media_interactions += 1;
        let target = self.describe(media.id);
        self.push_log(ts, action, target);
    }

    fn on_selection(&mut self, ts: i64, selection: &SelectionData) {
        // 空选区表示取消选择
        let Some(range) = selection.ranges.first() else {
            return;
        };
        self.summary.total_selections += 1;
        let target = self.describe(range.start);
        self.push_log(ts, "Selected text", format!("in {}", target));
    }

    fn on_clipboard(&mut self, ts: i64, action: ClipboardAction) {
        let (label, details) = match action {
            ClipboardAction::Copy => {
                self.summary.copy_events += 1;
                ("Copied", "text to the clipboard")
            }
            ClipboardAction::Cut => {
                self.summary.copy_events += 1;
                ("Cut", "text to the clipboard")
            }
            ClipboardAction::Paste => {
                self.summary.paste_events += 1;
                ("Pasted", "text from the clipboard")
            }
        };
        self.push_log(ts, label, details.to_string());
    }

    fn on_resize(&mut self, ts: i64, viewport: &ViewportData) {
        self.summary.resize_events += 1;
        let next = (viewport.width, viewport.height);
        let is_portrait = |(w, h): (u32, u32)| h > w;
        let flipped = self
            .viewport
            .is_some_and(|prev| is_portrait(prev) != is_portrait(next));
        self.viewport = Some(next);

        let index = self.push_log(
            ts,
            "Resized viewport",
            format!("to {}x{}", viewport.width, viewport.height),
        );
        if flipped {
            self.summary.orientation_changes += 1;
            self.logs[index].add_flag(FLAG_ORIENTATION_CHANGE);
        }
    }

    fn on_visibility(&mut self, ts: i64, hidden: bool) {
        if hidden {
            self.summary.tab_switches += 1;
            self.push_log(ts, "Left tab", "switched away from the page".to_string());
        } else {
            self.push_log(ts, "Returned to tab", "came back to the page".to_string());
        }
    }

    fn on_console_error(&mut self, ts: i64, message: &str) {
        self.summary.console_errors += 1;
        let message: String = redact(message)
            .chars()
            .take(MAX_ERROR_MESSAGE_CHARS)
            .collect();
        self.push_log(ts, "Console error", message);
    }

    fn on_network_errors(&mut self, ts: i64, failures: &[NetworkFailure]) {
        for failure in failures {
            self.summary.network_errors += 1;
            let method = redact(&failure.method);
            let url = redact(&failure.url);
            let details = if failure.status == 0 {
                format!("{} {} failed", method, url)
            } else {
                format!("{} {} returned {}", method, url, failure.status)
            };
            self.push_log(ts, "Network error", details);
        }
    }

    // ======== 辅助 ========

    fn describe(&self, id: i64) -> String {
        namer::describe(&self.node_map, id, self.config.max_label_chars)
    }

    /// 追加一条日志，返回其下标
    fn push_log(&mut self, ts: i64, action: &str, details: String) -> usize {
        let start = self.session_start.unwrap_or(ts);
        self.logs.push(LogEntry {
            timestamp: format_clock(ts.saturating_sub(start)),
            raw_timestamp: ts,
            action: action.to_string(),
            details,
            flags: Vec::new(),
        });
        self.logs.len() - 1
    }
}
