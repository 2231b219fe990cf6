//! # 分析配置命令
//!
//! - `resolve_config_path` - 确定配置文件路径（命令行参数优先）
//! - `read_config` - 读取配置（文件不存在时使用默认值）
//! - `run_config` - `config` 子命令：显示当前配置，或用 `--init` 写入默认配置

use std::path::{Path, PathBuf};

use crate::models::settings::AnalyzerConfig;
use crate::utils::path;

/// 确定配置文件路径
///
/// # 参数
/// - `explicit` - 命令行 `--config` 指定的路径
///
/// # 错误
/// 未指定路径且无法确定用户配置目录时返回错误
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, String> {
    match explicit {
        Some(p) => Ok(p),
        None => path::default_config_path(),
    }
}

/// 读取分析配置
pub async fn read_config(config_path: &Path) -> Result<AnalyzerConfig, String> {
    path::load_config(config_path).await
}

/// `config` 子命令
///
/// `init` 为 true 时写入默认配置（已存在的文件会被覆盖）；
/// 随后打印配置文件路径和当前生效的配置。
pub async fn run_config(config_path: &Path, init: bool) -> Result<(), String> {
    if init {
        path::save_config(config_path, &AnalyzerConfig::default()).await?;
        log::info!("已写入默认配置: {}", config_path.display());
    }

    let config = read_config(config_path).await?;
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| format!("序列化配置失败: {}", e))?;
    println!("# {}", config_path.display());
    println!("{}", json);
    Ok(())
}
