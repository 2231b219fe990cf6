//! # 通用工具函数
//!
//! - `path` - 配置文件路径定位
//! - `time` - 报告时间格式化

pub mod path;
pub mod time;
