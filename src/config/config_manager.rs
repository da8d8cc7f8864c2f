// ==========================================
// 安保服务管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载与查询
// 存储: config_kv 表 (key-value + scope)
// 说明: 配置缺失时回退到硬编码默认值,不视为错误
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ===== 默认值 =====
const DEFAULT_NULL_UNKNOWN_CLIENT_REFS: bool = true;
const DEFAULT_MIN_TELEFONO_DIGITS: usize = 6;
const DEFAULT_MAX_IMPORT_ROWS: usize = 10_000;
const DEFAULT_BATCH_RETENTION_DAYS: i32 = 90;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在（含 config_kv 表本身不存在的情况）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(rusqlite::Error::SqliteFailure(_, Some(msg)))
                if msg.contains("no such table") =>
            {
                Ok(None)
            }
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置值（测试与管理界面使用）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_null_unknown_client_refs(&self) -> Result<bool, Box<dyn Error>> {
        match self.get_config_value("import/null_unknown_client_refs")? {
            Some(v) => Ok(v.trim() == "true" || v.trim() == "1"),
            None => Ok(DEFAULT_NULL_UNKNOWN_CLIENT_REFS),
        }
    }

    async fn get_min_telefono_digits(&self) -> Result<usize, Box<dyn Error>> {
        match self.get_config_value("import/min_telefono_digits")? {
            Some(v) => Ok(v.trim().parse().unwrap_or(DEFAULT_MIN_TELEFONO_DIGITS)),
            None => Ok(DEFAULT_MIN_TELEFONO_DIGITS),
        }
    }

    async fn get_max_import_rows(&self) -> Result<usize, Box<dyn Error>> {
        match self.get_config_value("import/max_import_rows")? {
            Some(v) => Ok(v.trim().parse().unwrap_or(DEFAULT_MAX_IMPORT_ROWS)),
            None => Ok(DEFAULT_MAX_IMPORT_ROWS),
        }
    }

    async fn get_batch_retention_days(&self) -> Result<i32, Box<dyn Error>> {
        match self.get_config_value("import/batch_retention_days")? {
            Some(v) => Ok(v.trim().parse().unwrap_or(DEFAULT_BATCH_RETENTION_DAYS)),
            None => Ok(DEFAULT_BATCH_RETENTION_DAYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, ConfigManager) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();

        let conn = open_sqlite_connection(&db_path).unwrap();
        init_schema(&conn).unwrap();
        drop(conn);

        let manager = ConfigManager::new(&db_path).unwrap();
        (temp_file, manager)
    }

    #[tokio::test]
    async fn test_defaults_when_missing() {
        let (_temp, manager) = setup();

        assert!(manager.get_null_unknown_client_refs().await.unwrap());
        assert_eq!(manager.get_min_telefono_digits().await.unwrap(), 6);
        assert_eq!(manager.get_max_import_rows().await.unwrap(), 10_000);
        assert_eq!(manager.get_batch_retention_days().await.unwrap(), 90);
    }

    #[tokio::test]
    async fn test_override_from_config_kv() {
        let (_temp, manager) = setup();

        manager
            .set_global_config_value("import/min_telefono_digits", "9")
            .unwrap();
        manager
            .set_global_config_value("import/null_unknown_client_refs", "false")
            .unwrap();

        assert_eq!(manager.get_min_telefono_digits().await.unwrap(), 9);
        assert!(!manager.get_null_unknown_client_refs().await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_value_falls_back_to_default() {
        let (_temp, manager) = setup();

        manager
            .set_global_config_value("import/max_import_rows", "not-a-number")
            .unwrap();

        assert_eq!(manager.get_max_import_rows().await.unwrap(), 10_000);
    }
}
