//! # 路径与配置文件工具函数
//!
//! - 获取默认配置文件路径（`<配置目录>/replay-insight/config.json`）
//! - 读取 / 写入分析配置

use std::path::{Path, PathBuf};

use crate::models::settings::AnalyzerConfig;

/// 应用配置子目录名
const APP_DIR_NAME: &str = "replay-insight";
/// 配置文件名
const CONFIG_FILE_NAME: &str = "config.json";

/// 获取默认配置文件的绝对路径
///
/// 使用 `dirs` crate 获取跨平台的配置目录。
///
/// # 错误
/// 无法确定用户配置目录时返回错误信息
///
/// # 示例
/// - Linux: `~/.config/replay-insight/config.json`
/// - macOS: `~/Library/Application Support/replay-insight/config.json`
/// - Windows: `C:\Users\username\AppData\Roaming\replay-insight\config.json`
pub fn default_config_path() -> Result<PathBuf, String> {
    let dir = dirs::config_dir().ok_or_else(|| "无法获取用户配置目录".to_string())?;
    Ok(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// 读取分析配置
///
/// 文件不存在时返回默认配置；文件中缺失的字段同样取默认值。
///
/// # 错误
/// 文件存在但无法读取或 JSON 解析失败时返回错误
pub async fn load_config(path: &Path) -> Result<AnalyzerConfig, String> {
    if !path.exists() {
        log::debug!("配置文件 {} 不存在，使用默认配置", path.display());
        return Ok(AnalyzerConfig::default());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("读取配置文件失败: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("解析配置文件失败: {}", e))
}

/// 写入分析配置（2 空格缩进），父目录不存在时自动创建
///
/// # 错误
/// 创建目录、序列化或写入失败时返回错误
pub async fn save_config(path: &Path, config: &AnalyzerConfig) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("创建配置目录失败: {}", e))?;
    }

    let content =
        serde_json::to_string_pretty(config).map_err(|e| format!("序列化配置失败: {}", e))?;

    tokio::fs::write(path, content)
        .await
        .map_err(|e| format!("写入配置文件失败: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path_layout() {
        // 某些 CI 环境没有配置目录，此时跳过
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("replay-insight/config.json"));
        }
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("none.json")).await.unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AnalyzerConfig {
            rage_click_threshold: 4,
            ..AnalyzerConfig::default()
        };
        save_config(&path, &config).await.unwrap();
        assert_eq!(load_config(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_config(&path).await.unwrap_err().contains("解析配置文件失败"));
    }
}
