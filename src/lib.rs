//! # Replay Insight - 会话回放语义分析引擎
//!
//! 把 rrweb 风格的会话录制事件流转换为结构化的语义报告：
//! 人类可读的交互日志、会话级计数器，以及沮丧、困惑、完成目标等行为信号。
//!
//! ## 模块结构
//! - `models/` - 数据模型（事件、节点、报告、配置、录制文件）
//! - `services/` - 核心逻辑（解码、节点表、分类、命名、脱敏、汇总、文件读写）
//! - `commands/` - 命令行处理函数
//! - `utils/` - 通用工具函数（时间格式化、配置路径）
//!
//! ## 库用法
//! ```
//! use replay_insight::{AnalyzerConfig, analyze_value};
//! use serde_json::json;
//!
//! let events = json!([
//!     { "type": 4, "timestamp": 1000, "data": { "href": "https://example.com", "width": 1280, "height": 720 } }
//! ]);
//! let report = analyze_value(&events, &AnalyzerConfig::default()).unwrap();
//! assert_eq!(report.viewport_size, "1280x720");
//! ```

pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::process::ExitCode;

use clap::Parser;

pub use error::AnalyzeError;
pub use models::event::RawEvent;
pub use models::report::{BehavioralSignals, LogEntry, SemanticSession, SessionSummary};
pub use models::settings::AnalyzerConfig;
pub use services::analyzer::{analyze_batch, analyze_events, analyze_value};
pub use services::decoder::decode_events;

/// 命令行启动函数
///
/// 1. 解析命令行参数
/// 2. 初始化 env_logger（默认 warn，`--verbose` 为 debug，`RUST_LOG` 可覆盖）
/// 3. 构建单线程 tokio 运行时并执行子命令
///
/// # 返回值
/// 命令成功时为 `ExitCode::SUCCESS`，否则输出错误信息并返回 `ExitCode::FAILURE`
pub fn run() -> ExitCode {
    let cli = commands::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("创建异步运行时失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(commands::dispatch(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("错误: {}", e);
            ExitCode::FAILURE
        }
    }
}
