// ==========================================
// 安保服务管理系统 - 干预日志 Repository
// ==========================================
// 职责: interventi 表数据访问（Trait + rusqlite 实现）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::intervention::Intervento;
use crate::repository::error::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// InterventionRepository Trait
// ==========================================
// 用途: 干预日志数据访问
// 实现者: InterventionRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait InterventionRepository: Send + Sync {
    /// 插入干预记录
    async fn insert_intervento(&self, intervento: Intervento) -> Result<(), Box<dyn Error>>;

    /// 按 ID 查询干预记录
    ///
    /// # 返回
    /// - Ok(Some(Intervento)): 找到记录
    /// - Ok(None): 未找到
    async fn get_intervento(
        &self,
        intervento_id: &str,
    ) -> Result<Option<Intervento>, Box<dyn Error>>;

    /// 按客户查询干预记录（登记时间倒序）
    async fn list_by_cliente(
        &self,
        cliente_id: &Uuid,
    ) -> Result<Vec<Intervento>, Box<dyn Error>>;

    /// 统计 interventi 表记录数
    async fn count_interventi(&self) -> Result<usize, Box<dyn Error>>;
}

// ==========================================
// InterventionRepositoryImpl
// ==========================================
pub struct InterventionRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl InterventionRepositoryImpl {
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

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Intervento> {
        let cliente_raw: Option<String> = row.get(1)?;
        let punto_raw: Option<String> = row.get(2)?;

        Ok(Intervento {
            intervento_id: row.get(0)?,
            cliente_id: cliente_raw.and_then(|raw| Uuid::parse_str(&raw).ok()),
            punto_servizio_id: punto_raw.and_then(|raw| Uuid::parse_str(&raw).ok()),
            data_registrazione: row.get::<_, DateTime<Utc>>(3)?,
            orario_intervento: row.get(4)?,
            data_ora_intervento: row.get::<_, Option<DateTime<Utc>>>(5)?,
            tempo_intervento_minuti: row.get(6)?,
            ritardo_minuti: row.get(7)?,
            note: row.get(8)?,
            created_at: row.get::<_, DateTime<Utc>>(9)?,
            updated_at: row.get::<_, DateTime<Utc>>(10)?,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT intervento_id, cliente_id, punto_servizio_id, data_registrazione,
           orario_intervento, data_ora_intervento, tempo_intervento_minuti,
           ritardo_minuti, note, created_at, updated_at
    FROM interventi
"#;

#[async_trait]
impl InterventionRepository for InterventionRepositoryImpl {
    async fn insert_intervento(&self, intervento: Intervento) -> Result<(), Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO interventi (
                intervento_id, cliente_id, punto_servizio_id, data_registrazione,
                orario_intervento, data_ora_intervento, tempo_intervento_minuti,
                ritardo_minuti, note, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                intervento.intervento_id,
                intervento.cliente_id.map(|u| u.to_string()),
                intervento.punto_servizio_id.map(|u| u.to_string()),
                intervento.data_registrazione,
                intervento.orario_intervento,
                intervento.data_ora_intervento,
                intervento.tempo_intervento_minuti,
                intervento.ritardo_minuti,
                intervento.note,
                intervento.created_at,
                intervento.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn get_intervento(
        &self,
        intervento_id: &str,
    ) -> Result<Option<Intervento>, Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let sql = format!("{} WHERE intervento_id = ?1", SELECT_COLUMNS);
        let result = conn.query_row(&sql, params![intervento_id], Self::map_row);

        match result {
            Ok(intervento) => Ok(Some(intervento)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    async fn list_by_cliente(
        &self,
        cliente_id: &Uuid,
    ) -> Result<Vec<Intervento>, Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let sql = format!(
            "{} WHERE cliente_id = ?1 ORDER BY data_registrazione DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let interventi = stmt
            .query_map(params![cliente_id.to_string()], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(interventi)
    }

    async fn count_interventi(&self) -> Result<usize, Box<dyn Error>> {
        let conn = self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM interventi", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
