// ==========================================
// 安保服务管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 客户/服务点/警情干预管理 + 表格批量导入
// 边界: UI 壳层(路由/认证/样式)为外部协作方,本库仅实现数据与计算层
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 派生计算规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Cliente, DqLevel, DqReport, DqSummary, DqViolation, ImportBatch, ImportConflict, Intervento,
    Operatore, OperatorRecord, PuntoServizio,
};

// 表单状态抽象
pub use domain::form::{FieldValue, FormState, InMemoryFormState, SetOptions};

// 引擎
pub use engine::{AutoDelayEngine, DelayEngine};

// 导入层
pub use importer::{ImportError, OperatorImporter, OperatorImporterImpl};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "安保服务管理系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
