//! # 业务逻辑服务模块
//!
//! 分析引擎（纯同步、无 I/O）：
//! - `decoder` - 录制格式 JSON → 类型化事件
//! - `node_map` - 节点表：快照重建 + DOM 变更应用
//! - `namer` - 节点 → 可读名称
//! - `redactor` - PII 脱敏
//! - `classifier` - 交互分类器：逐事件折叠出计数器和语义日志
//! - `aggregator` - 行为信号推导与报告组装
//! - `analyzer` - 分析入口（单会话 / rayon 批量）
//!
//! 文件读写（tokio 异步 I/O）：
//! - `parser` - 录制文件解析（JSON / JSON Lines）
//! - `scanner` - 录制目录并行扫描
//! - `export` - 报告导出为 JSON / Markdown

pub mod aggregator;
pub mod analyzer;
pub mod classifier;
pub mod decoder;
pub mod export;
pub mod namer;
pub mod node_map;
pub mod parser;
pub mod redactor;
pub mod scanner;
