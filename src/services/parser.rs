//! # 录制文件解析服务
//!
//! 把磁盘上的录制文件读成事件序列（`serde_json::Value` 数组），
//! 交给 `analyzer::analyze_value` 做形状校验和分析。
//!
//! ## 支持的文件格式
//! - JSON 数组：`[event, event, ...]`
//! - JSON 对象：`{ "events": [...] }` 或 `{ "snapshots": [...] }`
//! - JSON Lines：每行一条事件，解析失败的行静默跳过
//!
//! 单个事件对象（只有一行的 JSONL）也按长度为 1 的序列处理。

use std::path::Path;

use serde_json::Value;

/// 录制对象中可能存放事件数组的字段名，按优先级排列
const EVENT_ARRAY_KEYS: [&str; 2] = ["events", "snapshots"];

/// 读取并解析录制文件
///
/// # 参数
/// - `file_path` - 录制文件路径
///
/// # 返回值
/// 事件序列。顶层形状不符合预期时原样返回，由分析阶段报告形状错误
///
/// # 错误
/// 文件无法读取，或内容既不是 JSON 也不包含任何可解析的 JSON 行时返回错误
pub async fn read_recording(file_path: &Path) -> Result<Value, String> {
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|e| format!("读取录制文件 {} 失败: {}", file_path.display(), e))?;

    parse_recording(&content)
        .map_err(|e| format!("解析录制文件 {} 失败: {}", file_path.display(), e))
}

/// 解析录制文件内容
///
/// 先按整体 JSON 解析；失败时退回 JSON Lines 逐行解析。
pub fn parse_recording(content: &str) -> Result<Value, String> {
    if content.trim().is_empty() {
        return Ok(Value::Array(Vec::new()));
    }

    match serde_json::from_str::<Value>(content) {
        Ok(value) => Ok(unwrap_container(value)),
        Err(whole_err) => {
            let events: Vec<Value> = content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .filter_map(|line| serde_json::from_str(line).ok())
                .collect();

            if events.is_empty() {
                return Err(whole_err.to_string());
            }
            log::debug!("按 JSON Lines 解析出 {} 条事件", events.len());
            Ok(Value::Array(events))
        }
    }
}

/// 从容器对象中取出事件数组
fn unwrap_container(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };

    for key in EVENT_ARRAY_KEYS {
        if matches!(map.get(key), Some(Value::Array(_))) {
            if let Some(events) = map.remove(key) {
                return events;
            }
        }
    }

    // 单个事件对象
    if map.contains_key("type") {
        return Value::Array(vec![Value::Object(map)]);
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_array_and_container() {
        let array = parse_recording(r#"[{"type":4,"timestamp":1}]"#).unwrap();
        assert_eq!(array, json!([{ "type": 4, "timestamp": 1 }]));

        let wrapped = parse_recording(r#"{"sessionId":"abc","events":[{"type":4}]}"#).unwrap();
        assert_eq!(wrapped, json!([{ "type": 4 }]));

        let snapshots = parse_recording(r#"{"snapshots":[{"type":2},{"type":3}]}"#).unwrap();
        assert_eq!(snapshots.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_parse_jsonl_skips_broken_lines() {
        let content = "{\"type\":4,\"timestamp\":1}\n\n{\"type\":3,\"timest\n{\"type\":3,\"timestamp\":2}\n";
        let events = parse_recording(content).unwrap();
        assert_eq!(events.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_parse_single_event_and_passthrough() {
        assert_eq!(parse_recording(r#"{"type":4}"#).unwrap(), json!([{ "type": 4 }]));
        // 无法识别的对象原样返回，由分析阶段报错
        assert_eq!(parse_recording(r#"{"foo":1}"#).unwrap(), json!({ "foo": 1 }));
        assert_eq!(parse_recording("  \n").unwrap(), json!([]));
        assert!(parse_recording("not json at all").is_err());
    }

    #[tokio::test]
    async fn test_read_recording_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"events":[{{"type":4,"timestamp":5,"data":{{"href":"https://a.test"}}}}]}}"#).unwrap();
        let events = read_recording(file.path()).await.unwrap();
        assert_eq!(events[0]["timestamp"], json!(5));

        let missing = read_recording(Path::new("/definitely/not/here.json")).await;
        assert!(missing.unwrap_err().contains("读取录制文件"));
    }
}
