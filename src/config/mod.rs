// ==========================================
// 负荷日程系统 - 配置层
// ==========================================
// 职责: 容量上限、存储键等系统配置
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
