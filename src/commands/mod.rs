//! # 命令行处理模块
//!
//! 定义命令行参数（clap derive）并把子命令分发到各处理函数。
//! 每个子模块对应一个功能域：
//! - `analyze` - 分析单个录制文件
//! - `batch` - 批量分析目录下的所有录制文件
//! - `settings` - 分析配置的定位、读取和初始化
//!
//! 与服务层的约定：处理函数均为 async，返回 `Result<T, String>`，
//! 错误信息带上下文，由入口统一输出。

pub mod analyze;
pub mod batch;
pub mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// 会话回放语义分析命令行
#[derive(Debug, Parser)]
#[command(name = "replay-insight")]
#[command(about = "Turn session-replay recordings into semantic interaction reports")]
#[command(version)]
pub struct Cli {
    /// 分析配置文件路径（默认 <配置目录>/replay-insight/config.json）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// 分析单个录制文件
    Analyze {
        /// 录制文件（JSON 数组、含 events 的对象或 JSON Lines）
        file: PathBuf,

        /// 输出格式
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// 输出文件；省略时写到标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 批量分析目录下的所有录制文件
    Batch {
        /// 录制文件所在目录
        dir: PathBuf,
    },

    /// 显示当前生效的分析配置
    Config {
        /// 把默认配置写入配置文件
        #[arg(long)]
        init: bool,
    },
}

/// 报告导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

/// 执行解析后的命令
///
/// # 错误
/// 任一步骤失败时返回带上下文的错误信息
pub async fn dispatch(cli: Cli) -> Result<(), String> {
    let config_path = settings::resolve_config_path(cli.config)?;

    match cli.command {
        Commands::Analyze {
            file,
            format,
            output,
        } => {
            let config = settings::read_config(&config_path).await?;
            analyze::run_analyze(&file, format, output.as_deref(), &config).await
        }
        Commands::Batch { dir } => {
            let config = settings::read_config(&config_path).await?;
            let entries = batch::run_batch(&dir, &config).await?;
            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| format!("序列化批量分析结果失败: {}", e))?;
            println!("{}", json);
            Ok(())
        }
        Commands::Config { init } => settings::run_config(&config_path, init).await,
    }
}
