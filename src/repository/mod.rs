// ==========================================
// 安保服务管理系统 - 数据仓储层
// ==========================================
// 职责: 数据访问,不含业务规则
// 红线: Repository 不含业务规则,只做数据 CRUD
// ==========================================

pub mod error;
pub mod intervention_repo;
pub mod operator_import_repo;
pub mod operator_import_repo_impl;

// 重导出核心类型
pub use error::{RepositoryError, RepositoryResult};
pub use intervention_repo::{InterventionRepository, InterventionRepositoryImpl};
pub use operator_import_repo::OperatorImportRepository;
pub use operator_import_repo_impl::OperatorImportRepositoryImpl;
