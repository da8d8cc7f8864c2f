// ==========================================
// 安保服务管理系统 - 导入层
// ==========================================
// 职责: 外部表格数据导入,生成内部数据
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod conflict_handler;
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod operator_importer_impl;
pub mod operator_importer_trait;

// 重导出核心类型
pub use conflict_handler::ConflictHandler as ConflictHandlerImpl;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use operator_importer_impl::OperatorImporterImpl;

// 重导出 Trait 接口
pub use operator_importer_trait::{
    ConflictHandler, DataCleaner, DqValidator, FieldMapper, FileParser, OperatorImporter,
};
