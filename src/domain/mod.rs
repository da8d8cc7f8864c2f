// ==========================================
// 安保服务管理系统 - 领域层
// ==========================================
// 职责: 实体与类型定义,不含数据访问与业务编排
// ==========================================

pub mod client;
pub mod form;
pub mod intervention;
pub mod operator;

// 重导出核心实体
pub use client::{Cliente, PuntoServizio};
pub use intervention::Intervento;
pub use operator::{
    ConflictType, DqLevel, DqReport, DqSummary, DqViolation, ImportBatch, ImportConflict,
    ImportResult, Operatore, OperatorRecord,
};
