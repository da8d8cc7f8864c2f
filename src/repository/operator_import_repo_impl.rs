// ==========================================
// 安保服务管理系统 - 操作员导入 Repository 实现
// ==========================================
// 存储: SQLite (rusqlite)
// 约定: 枚举以 format!("{:?}") 文本落库,读取时 normalize
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::operator::{ConflictType, ImportBatch, ImportConflict, Operatore};
use crate::repository::error::RepositoryError;
use crate::repository::operator_import_repo::OperatorImportRepository;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Transaction};
use std::error::Error;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub(crate) fn parse_conflict_type(raw: &str) -> ConflictType {
    // 枚举以 `format!("{:?}")` 写入 DB（非 JSON）。
    // 为兼容未来可能写入 JSON 字符串（带引号），这里做一次 normalize。
    let normalized = raw.trim().trim_matches('"');
    match normalized {
        "RequiredFieldMissing" => ConflictType::RequiredFieldMissing,
        "DuplicateOperator" => ConflictType::DuplicateOperator,
        "UnknownClient" => ConflictType::UnknownClient,
        _ => ConflictType::DataTypeError,
    }
}

// ==========================================
// OperatorImportRepositoryImpl
// ==========================================
pub struct OperatorImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl OperatorImportRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 Repository
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 在事务中批量插入操作员
    fn batch_insert_operatori_tx(
        tx: &Transaction,
        operatori: &[Operatore],
    ) -> Result<usize, Box<dyn Error>> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO operatori (
                operatore_id, nome, cognome, cliente_id,
                telefono, email, note, import_batch_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )?;

        let mut count = 0;
        for operatore in operatori {
            stmt.execute(params![
                operatore.operatore_id,
                operatore.nome,
                operatore.cognome,
                operatore.cliente_id.map(|u| u.to_string()),
                operatore.telefono,
                operatore.email,
                operatore.note,
                operatore.import_batch_id,
                operatore.created_at,
                operatore.updated_at,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    fn insert_conflict_row(
        conn: &Connection,
        conflict: &ImportConflict,
    ) -> Result<(), Box<dyn Error>> {
        conn.execute(
            r#"
            INSERT INTO import_conflict (
                conflict_id, batch_id, row_number, operator_label,
                conflict_type, raw_data, reason, resolved, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                conflict.conflict_id,
                conflict.batch_id,
                conflict.row_number as i64,
                conflict.operator_label,
                format!("{:?}", conflict.conflict_type),
                conflict.raw_data,
                conflict.reason,
                conflict.resolved as i32,
                conflict.created_at,
            ],
        )?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl OperatorImportRepository for OperatorImportRepositoryImpl {
    async fn batch_insert_operatori(
        &self,
        operatori: Vec<Operatore>,
    ) -> Result<usize, Box<dyn Error>> {
        let mut conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let count = Self::batch_insert_operatori_tx(&tx, &operatori)?;

        tx.commit().map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(count)
    }

    async fn insert_conflict(&self, conflict: ImportConflict) -> Result<(), Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Self::insert_conflict_row(&conn, &conflict)
    }

    async fn batch_insert_conflicts(
        &self,
        conflicts: Vec<ImportConflict>,
    ) -> Result<usize, Box<dyn Error>> {
        let mut conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        for conflict in &conflicts {
            Self::insert_conflict_row(&tx, conflict)?;
            count += 1;
        }

        tx.commit().map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(count)
    }

    async fn get_conflicts_by_batch(
        &self,
        batch_id: &str,
    ) -> Result<Vec<ImportConflict>, Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT conflict_id, batch_id, row_number, operator_label,
                   conflict_type, raw_data, reason, resolved, created_at
            FROM import_conflict
            WHERE batch_id = ?1
            ORDER BY row_number
            "#,
        )?;

        let conflicts = stmt
            .query_map(params![batch_id], |row| {
                Ok(ImportConflict {
                    conflict_id: row.get(0)?,
                    batch_id: row.get(1)?,
                    row_number: row.get::<_, i64>(2)? as usize,
                    operator_label: row.get(3)?,
                    conflict_type: parse_conflict_type(&row.get::<_, String>(4)?),
                    raw_data: row.get(5)?,
                    reason: row.get(6)?,
                    resolved: row.get::<_, i32>(7)? != 0,
                    created_at: row.get::<_, DateTime<Utc>>(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(conflicts)
    }

    async fn mark_conflict_resolved(&self, conflict_id: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let updated = conn.execute(
            "UPDATE import_conflict SET resolved = 1 WHERE conflict_id = ?1",
            params![conflict_id],
        )?;

        if updated == 0 {
            return Err(Box::new(RepositoryError::NotFound {
                entity: "ImportConflict".to_string(),
                id: conflict_id.to_string(),
            }));
        }
        Ok(())
    }

    async fn insert_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file_name, file_path, total_rows, success_rows,
                blocked_rows, warning_rows, conflict_rows, imported_at,
                imported_by, elapsed_ms, dq_report_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.file_path,
                batch.total_rows,
                batch.success_rows,
                batch.blocked_rows,
                batch.warning_rows,
                batch.conflict_rows,
                batch.imported_at,
                batch.imported_by,
                batch.elapsed_ms,
                batch.dq_report_json,
            ],
        )?;
        Ok(())
    }

    async fn get_recent_batches(&self, limit: usize) -> Result<Vec<ImportBatch>, Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, file_name, file_path, total_rows, success_rows,
                   blocked_rows, warning_rows, conflict_rows, imported_at,
                   imported_by, elapsed_ms, dq_report_json
            FROM import_batch
            ORDER BY imported_at DESC
            LIMIT ?1
            "#,
        )?;

        let batches = stmt
            .query_map(params![limit as i64], |row| {
                Ok(ImportBatch {
                    batch_id: row.get(0)?,
                    file_name: row.get(1)?,
                    file_path: row.get(2)?,
                    total_rows: row.get(3)?,
                    success_rows: row.get(4)?,
                    blocked_rows: row.get(5)?,
                    warning_rows: row.get(6)?,
                    conflict_rows: row.get(7)?,
                    imported_at: row.get::<_, Option<DateTime<Utc>>>(8)?,
                    imported_by: row.get(9)?,
                    elapsed_ms: row.get(10)?,
                    dq_report_json: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(batches)
    }

    async fn batch_check_exists(
        &self,
        dedup_keys: Vec<String>,
    ) -> Result<Vec<String>, Box<dyn Error>> {
        if dedup_keys.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        // SQLite 变量上限内分块查询
        const CHUNK_SIZE: usize = 500;
        let mut existing = Vec::new();

        for chunk in dedup_keys.chunks(CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT DISTINCT lower(nome) || '|' || lower(cognome)
                 FROM operatori
                 WHERE lower(nome) || '|' || lower(cognome) IN ({})",
                placeholders
            );

            let mut stmt = conn.prepare(&sql)?;
            let found = stmt
                .query_map(params_from_iter(chunk.iter()), |row| {
                    row.get::<_, String>(0)
                })?
                .collect::<Result<Vec<_>, _>>()?;
            existing.extend(found);
        }

        Ok(existing)
    }

    async fn list_cliente_ids(&self) -> Result<Vec<Uuid>, Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare("SELECT cliente_id FROM clienti")?;
        let raw_ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        // 历史数据中可能存在非 UUID 主键,跳过不可解析的值
        Ok(raw_ids
            .iter()
            .filter_map(|raw| Uuid::parse_str(raw).ok())
            .collect())
    }

    async fn count_operatori(&self) -> Result<usize, Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM operatori", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
