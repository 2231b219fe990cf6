//! # 数据模型模块
//!
//! 所有对外输出的结构体均派生 `Serialize` 和 `Deserialize`，使用 camelCase 字段名。
//! - `event` - 录制事件及各类负载
//! - `node` - 节点表中的 DOM 节点描述
//! - `report` - 分析报告（日志、计数器、行为信号）
//! - `settings` - 分析配置（全部阈值）
//! - `recording` - 目录扫描得到的录制文件

pub mod event;
pub mod node;
pub mod recording;
pub mod report;
pub mod settings;
