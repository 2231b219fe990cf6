//! # 录制事件解码器
//!
//! 将已经反序列化的 `serde_json::Value` 录制数据解码为强类型的 `RawEvent` 列表。
//!
//! ## 解码规则
//! - 顶层 `null` → 空列表；顶层不是数组 → `AnalyzeError::NotASequence`
//! - 数组元素不是对象 → `AnalyzeError::InvalidEvent`
//! - 其余所有损坏都在本地降级：负载无法解析的事件解码为 `Other` 分支，
//!   只计数不分类，从不导致整体失败
//!
//! ## 事件编码
//! | type | 含义 | source（type = 3 时） | 含义 |
//! |------|------|------------------------|------|
//! | 2 | FullSnapshot | 0 | Mutation |
//! | 3 | IncrementalSnapshot | 1 | MouseMove |
//! | 4 | Meta | 2 | MouseInteraction |
//! | 5 | Custom | 3 / 4 / 5 | Scroll / ViewportResize / Input |
//! | 6 | Plugin | 6 / 7 / 14 | TouchMove / MediaInteraction / Selection |

use serde::Deserialize;
use serde_json::Value;

use crate::error::AnalyzeError;
use crate::models::event::{
    ClipboardAction, EventKind, IncrementalData, InputData, MediaAction, MediaData, MetaData,
    MouseInteractionData, MouseInteractionKind, MutationData, NetworkFailure, PointerPosition,
    RawEvent, ScrollData, SelectionData, SerializedNode, ViewportData,
};

/// 控制台插件名称
const CONSOLE_PLUGIN: &str = "rrweb/console@1";
/// 网络插件名称
const NETWORK_PLUGIN: &str = "rrweb/network@1";

/// 解码整段录制数据
///
/// # 参数
/// - `input` - 录制数据（应为事件数组）
///
/// # 返回值
/// 与输入等长、顺序一致的 `RawEvent` 列表
///
/// # 错误
/// 输入形状违反约定时返回 `AnalyzeError`
pub fn decode_events(input: &Value) -> Result<Vec<RawEvent>, AnalyzeError> {
    let items = match input {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(AnalyzeError::NotASequence {
                found: json_type_name(other),
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if item.is_object() {
                Ok(decode_event(item))
            } else {
                Err(AnalyzeError::InvalidEvent {
                    index,
                    found: json_type_name(item),
                })
            }
        })
        .collect()
}

/// 解码单条事件对象
///
/// 永不失败：无法识别的类型或损坏的负载解码为 `Other` 分支。
pub fn decode_event(value: &Value) -> RawEvent {
    let timestamp = value.get("timestamp").and_then(parse_timestamp);
    let data = value.get("data").unwrap_or(&Value::Null);
    let event_type = value.get("type").and_then(Value::as_i64);

    let kind = match event_type {
        Some(2) => EventKind::FullSnapshot(decode_snapshot(data)),
        Some(3) => EventKind::Incremental(decode_incremental(data)),
        Some(4) => MetaData::deserialize(data)
            .map(EventKind::Meta)
            .unwrap_or(EventKind::Other { event_type }),
        Some(5) => decode_custom(data).unwrap_or(EventKind::Other { event_type }),
        Some(6) => decode_plugin(data).unwrap_or(EventKind::Other { event_type }),
        _ => EventKind::Other { event_type },
    };

    RawEvent { timestamp, kind }
}

/// 解析时间戳：整数或有限浮点数（四舍五入到毫秒），其余返回 `None`
fn parse_timestamp(value: &Value) -> Option<i64> {
    if let Some(ts) = value.as_i64() {
        return Some(ts);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f.round() as i64)
}

/// 解码完整快照的节点树
fn decode_snapshot(data: &Value) -> Option<Box<SerializedNode>> {
    let node = data.get("node")?;
    match SerializedNode::deserialize(node) {
        Ok(root) => Some(Box::new(root)),
        Err(e) => {
            log::warn!("完整快照节点树解码失败，跳过该快照: {}", e);
            None
        }
    }
}

/// 按 `source` 解码增量快照
fn decode_incremental(data: &Value) -> IncrementalData {
    let source = data.get("source").and_then(Value::as_i64);
    let decoded = match source {
        Some(0) => MutationData::deserialize(data).ok().map(IncrementalData::Mutation),
        Some(1) => positions(data).map(IncrementalData::MouseMove),
        Some(2) => decode_mouse_interaction(data).map(IncrementalData::MouseInteraction),
        Some(3) => ScrollData::deserialize(data).ok().map(IncrementalData::Scroll),
        Some(4) => ViewportData::deserialize(data)
            .ok()
            .map(IncrementalData::ViewportResize),
        Some(5) => InputData::deserialize(data).ok().map(IncrementalData::Input),
        Some(6) => positions(data).map(IncrementalData::TouchMove),
        Some(7) => decode_media(data).map(IncrementalData::MediaInteraction),
        Some(14) => SelectionData::deserialize(data)
            .ok()
            .map(IncrementalData::Selection),
        _ => None,
    };
    decoded.unwrap_or(IncrementalData::Other { source })
}

/// 指针位置列表；缺失时视为空列表
fn positions(data: &Value) -> Option<Vec<PointerPosition>> {
    match data.get("positions") {
        Some(p) => Vec::<PointerPosition>::deserialize(p).ok(),
        None => Some(Vec::new()),
    }
}

fn decode_mouse_interaction(data: &Value) -> Option<MouseInteractionData> {
    let code = data.get("type")?.as_i64()?;
    let id = data.get("id")?.as_i64()?;
    Some(MouseInteractionData {
        kind: MouseInteractionKind::from_code(code),
        id,
        x: data.get("x").and_then(Value::as_f64),
        y: data.get("y").and_then(Value::as_f64),
    })
}

fn decode_media(data: &Value) -> Option<MediaData> {
    let code = data.get("type")?.as_i64()?;
    let id = data.get("id").and_then(Value::as_i64).unwrap_or(-1);
    Some(MediaData {
        action: MediaAction::from_code(code),
        id,
    })
}

/// 解码自定义事件（`data.tag` + `data.payload`）
///
/// 支持的 tag：
/// - `copy` / `cut` / `paste` → 剪贴板
/// - `visibilitychange` → 标签页可见性（`payload.hidden` 或 `payload.visibilityState`）
/// - `console-error` → 控制台错误（`payload.message` 或字符串 payload）
/// - `network-error` → 网络错误（`payload.url` / `method` / `status`）
fn decode_custom(data: &Value) -> Option<EventKind> {
    let tag = data.get("tag")?.as_str()?;
    let payload = data.get("payload").unwrap_or(&Value::Null);
    match tag {
        "copy" => Some(EventKind::Clipboard(ClipboardAction::Copy)),
        "cut" => Some(EventKind::Clipboard(ClipboardAction::Cut)),
        "paste" => Some(EventKind::Clipboard(ClipboardAction::Paste)),
        "visibilitychange" => {
            let hidden = payload
                .get("hidden")
                .and_then(Value::as_bool)
                .or_else(|| {
                    payload
                        .get("visibilityState")
                        .and_then(Value::as_str)
                        .map(|s| s == "hidden")
                })?;
            Some(EventKind::Visibility { hidden })
        }
        "console-error" => {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| payload.as_str())
                .unwrap_or("")
                .to_string();
            Some(EventKind::ConsoleError { message })
        }
        "network-error" => Some(EventKind::NetworkError(vec![network_failure(payload)])),
        _ => None,
    }
}

/// 解码插件事件（`data.plugin` + `data.payload`）
///
/// - 控制台插件：仅 `error` / `assert` 级别计为控制台错误
/// - 网络插件：状态码 ≥ 400 或为 0 的请求计为网络错误
fn decode_plugin(data: &Value) -> Option<EventKind> {
    let plugin = data.get("plugin")?.as_str()?;
    let payload = data.get("payload")?;
    match plugin {
        CONSOLE_PLUGIN => {
            let level = payload.get("level").and_then(Value::as_str)?;
            if level != "error" && level != "assert" {
                return None;
            }
            // 控制台插件把每个参数序列化为 JSON 字符串，去掉外层引号
            let message = payload
                .get("payload")
                .and_then(Value::as_array)
                .map(|args| {
                    args.iter()
                        .filter_map(Value::as_str)
                        .map(|s| s.trim_matches('"'))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            Some(EventKind::ConsoleError { message })
        }
        NETWORK_PLUGIN => {
            let failures: Vec<NetworkFailure> = payload
                .get("requests")
                .and_then(Value::as_array)?
                .iter()
                .map(network_failure)
                .filter(|f| f.status == 0 || f.status >= 400)
                .collect();
            (!failures.is_empty()).then_some(EventKind::NetworkError(failures))
        }
        _ => None,
    }
}

/// 提取单个请求的 url / method / status
///
/// 兼容 `url`/`name` 与 `status`/`responseStatus` 两种字段命名。
fn network_failure(request: &Value) -> NetworkFailure {
    let url = request
        .get("url")
        .or_else(|| request.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or("GET")
        .to_ascii_uppercase();
    let status = request
        .get("status")
        .or_else(|| request.get("responseStatus"))
        .and_then(Value::as_u64)
        .map(|s| s.min(u16::MAX as u64) as u16)
        .unwrap_or(0);
    NetworkFailure {
        url,
        method,
        status,
    }
}

/// JSON 值的类型名称（用于错误信息）
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_empty_and_non_array_rejected() {
        assert!(decode_events(&Value::Null).unwrap().is_empty());
        assert_eq!(
            decode_events(&json!({ "events": [] })).unwrap_err(),
            AnalyzeError::NotASequence { found: "object" }
        );
        assert_eq!(
            decode_events(&json!([{ "type": 4 }, 42])).unwrap_err(),
            AnalyzeError::InvalidEvent { index: 1, found: "number" }
        );
    }

    #[test]
    fn test_timestamp_parsing() {
        let events = decode_events(&json!([
            { "type": 3, "timestamp": 1000, "data": { "source": 0 } },
            { "type": 3, "timestamp": 1500.6, "data": { "source": 0 } },
            { "type": 3, "timestamp": "soon", "data": { "source": 0 } },
            { "type": 3, "data": { "source": 0 } }
        ]))
        .unwrap();
        let ts: Vec<Option<i64>> = events.iter().map(|e| e.timestamp).collect();
        assert_eq!(ts, vec![Some(1000), Some(1501), None, None]);
    }

    #[test]
    fn test_meta_and_snapshot() {
        let events = decode_events(&json!([
            { "type": 4, "timestamp": 1, "data": { "href": "https://app.example.com/billing", "width": 1280, "height": 720 } },
            { "type": 2, "timestamp": 2, "data": { "node": { "type": 0, "id": 1, "childNodes": [] } } },
            { "type": 2, "timestamp": 3, "data": {} }
        ]))
        .unwrap();
        match &events[0].kind {
            EventKind::Meta(meta) => {
                assert_eq!(meta.href, "https://app.example.com/billing");
                assert_eq!((meta.width, meta.height), (1280, 720));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&events[1].kind, EventKind::FullSnapshot(Some(root)) if root.id == 1));
        assert!(matches!(&events[2].kind, EventKind::FullSnapshot(None)));
    }

    #[test]
    fn test_incremental_sources() {
        let events = decode_events(&json!([
            { "type": 3, "timestamp": 1, "data": { "source": 2, "type": 2, "id": 10, "x": 5, "y": 6 } },
            { "type": 3, "timestamp": 2, "data": { "source": 3, "id": 1, "x": 0, "y": 400 } },
            { "type": 3, "timestamp": 3, "data": { "source": 5, "id": 14, "text": "hi", "isChecked": false } },
            { "type": 3, "timestamp": 4, "data": { "source": 7, "type": 0, "id": 40 } },
            { "type": 3, "timestamp": 5, "data": { "source": 1, "positions": [ { "x": 1, "y": 2, "id": 10, "timeOffset": -20 } ] } },
            { "type": 3, "timestamp": 6, "data": { "source": 9, "id": 3 } },
            { "type": 3, "timestamp": 7, "data": { "source": 2, "type": 2 } }
        ]))
        .unwrap();

        assert!(matches!(
            &events[0].kind,
            EventKind::Incremental(IncrementalData::MouseInteraction(m))
                if m.kind == MouseInteractionKind::Click && m.id == 10 && m.x == Some(5.0)
        ));
        assert!(matches!(
            &events[1].kind,
            EventKind::Incremental(IncrementalData::Scroll(s)) if s.y == 400.0
        ));
        assert!(matches!(
            &events[2].kind,
            EventKind::Incremental(IncrementalData::Input(i)) if i.text == "hi" && i.is_checked == Some(false)
        ));
        assert!(matches!(
            &events[3].kind,
            EventKind::Incremental(IncrementalData::MediaInteraction(m)) if m.action == MediaAction::Play
        ));
        assert!(matches!(
            &events[4].kind,
            EventKind::Incremental(IncrementalData::MouseMove(p)) if p.len() == 1 && p[0].time_offset == -20
        ));
        // 未处理的 source（画布变更）
        assert!(matches!(
            &events[5].kind,
            EventKind::Incremental(IncrementalData::Other { source: Some(9) })
        ));
        // 缺少 id 的鼠标交互视为损坏
        assert!(matches!(
            &events[6].kind,
            EventKind::Incremental(IncrementalData::Other { source: Some(2) })
        ));
    }

    #[test]
    fn test_custom_and_plugin_events() {
        let events = decode_events(&json!([
            { "type": 5, "timestamp": 1, "data": { "tag": "paste", "payload": {} } },
            { "type": 5, "timestamp": 2, "data": { "tag": "visibilitychange", "payload": { "visibilityState": "hidden" } } },
            { "type": 6, "timestamp": 3, "data": { "plugin": "rrweb/console@1",
                "payload": { "level": "error", "payload": ["\"Payment failed\"", "\"code 42\""] } } },
            { "type": 6, "timestamp": 4, "data": { "plugin": "rrweb/console@1",
                "payload": { "level": "log", "payload": ["\"hello\""] } } },
            { "type": 6, "timestamp": 5, "data": { "plugin": "rrweb/network@1",
                "payload": { "requests": [
                    { "name": "https://api.example.com/cancel", "method": "post", "responseStatus": 500 },
                    { "name": "https://api.example.com/ok", "responseStatus": 200 }
                ] } } },
            { "type": 5, "timestamp": 6, "data": { "tag": "something-else" } }
        ]))
        .unwrap();

        assert!(matches!(&events[0].kind, EventKind::Clipboard(ClipboardAction::Paste)));
        assert!(matches!(&events[1].kind, EventKind::Visibility { hidden: true }));
        assert!(matches!(
            &events[2].kind,
            EventKind::ConsoleError { message } if message == "Payment failed code 42"
        ));
        assert!(matches!(&events[3].kind, EventKind::Other { event_type: Some(6) }));
        match &events[4].kind {
            EventKind::NetworkError(failures) => {
                assert_eq!(
                    failures,
                    &vec![NetworkFailure {
                        url: "https://api.example.com/cancel".into(),
                        method: "POST".into(),
                        status: 500,
                    }]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&events[5].kind, EventKind::Other { event_type: Some(5) }));
    }
}
