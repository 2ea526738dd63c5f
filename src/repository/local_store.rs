// ==========================================
// SIGLAB Aviário - 本地键值存储
// ==========================================
// 职责: 以 SQLite 表模拟浏览器 localStorage（键 → 字符串）
// 表: local_storage (key TEXT PRIMARY KEY, value TEXT, updated_at TEXT)
// 说明: 记录整体以 JSON 字符串存放，不做关系约束
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// 日产记录数组
pub const RECORDS_KEY: &str = "siglab_records";
/// 批次记录数组
pub const BATCH_RECORDS_KEY: &str = "siglab_batch_records";
/// 同步密钥
pub const SYNC_KEY: &str = "siglab_sync_key";

#[derive(Clone)]
pub struct LocalStore {
    conn: Arc<Mutex<Connection>>,
}

impl LocalStore {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let store = Self { conn };
        store.ensure_table()?;
        Ok(store)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
              value = excluded.value,
              updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 删除键
    ///
    /// # 返回
    /// - true: 键存在并已删除
    pub fn remove_item(&self, key: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// 读取 JSON 值，键不存在时返回 None
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> RepositoryResult<Option<T>> {
        match self.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                RepositoryError::SerializationError {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            }),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> RepositoryResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| RepositoryError::SerializationError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set_item(key, &raw)
    }
}
