// ==========================================
// 安保服务管理系统 - 配置层
// ==========================================
// 职责: 系统配置读取
// 存储: config_kv 表 (key-value + scope)
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心类型
pub use config_manager::ConfigManager;
pub use import_config_trait::ImportConfigReader;
