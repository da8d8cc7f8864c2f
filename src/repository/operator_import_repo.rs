// ==========================================
// 安保服务管理系统 - 操作员导入 Repository Trait
// ==========================================
// 职责: 定义导入相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::operator::{ImportBatch, ImportConflict, Operatore};
use async_trait::async_trait;
use std::error::Error;
use uuid::Uuid;

// ==========================================
// OperatorImportRepository Trait
// ==========================================
// 用途: 操作员导入相关数据访问
// 实现者: OperatorImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait OperatorImportRepository: Send + Sync {
    // ===== 批量写入（事务化）=====

    /// 批量插入操作员（整个事务要么全部成功要么回滚）
    ///
    /// # 参数
    /// - operatori: 操作员实体列表
    ///
    /// # 返回
    /// - Ok(usize): 成功插入的记录数
    /// - Err: 数据库错误（整个事务回滚）
    async fn batch_insert_operatori(
        &self,
        operatori: Vec<Operatore>,
    ) -> Result<usize, Box<dyn Error>>;

    // ===== 冲突队列管理 =====

    /// 插入冲突记录到 import_conflict 表
    async fn insert_conflict(&self, conflict: ImportConflict) -> Result<(), Box<dyn Error>>;

    /// 批量插入冲突记录
    async fn batch_insert_conflicts(
        &self,
        conflicts: Vec<ImportConflict>,
    ) -> Result<usize, Box<dyn Error>>;

    /// 查询指定批次的冲突记录
    async fn get_conflicts_by_batch(
        &self,
        batch_id: &str,
    ) -> Result<Vec<ImportConflict>, Box<dyn Error>>;

    /// 标记冲突为已解决
    async fn mark_conflict_resolved(&self, conflict_id: &str) -> Result<(), Box<dyn Error>>;

    // ===== 批次管理 =====

    /// 插入导入批次记录
    async fn insert_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error>>;

    /// 查询最近的导入批次
    ///
    /// # 参数
    /// - limit: 返回记录数限制
    async fn get_recent_batches(&self, limit: usize) -> Result<Vec<ImportBatch>, Box<dyn Error>>;

    // ===== 查询与校验 =====

    /// 批量检查姓名去重键是否已存在
    ///
    /// # 参数
    /// - dedup_keys: 姓名去重键列表（"nome|cognome" 小写）
    ///
    /// # 返回
    /// - Ok(Vec<String>): 已存在的去重键列表
    async fn batch_check_exists(
        &self,
        dedup_keys: Vec<String>,
    ) -> Result<Vec<String>, Box<dyn Error>>;

    /// 列出客户表中全部 cliente_id（用于引用校验）
    async fn list_cliente_ids(&self) -> Result<Vec<Uuid>, Box<dyn Error>>;

    /// 统计 operatori 表记录数
    async fn count_operatori(&self) -> Result<usize, Box<dyn Error>>;
}
