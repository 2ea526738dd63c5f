// ==========================================
// SIGLAB Aviário - 日产记录仓储
// ==========================================
// 存储: local_storage[siglab_records] = JSON 数组（新记录在前）
// 约束: 仅负责整体读写，不含业务逻辑
// ==========================================

use crate::domain::production::ProductionRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::local_store::{LocalStore, RECORDS_KEY};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct ProductionRepository {
    store: LocalStore,
}

impl ProductionRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        Ok(Self {
            store: LocalStore::new(db_path)?,
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        Ok(Self {
            store: LocalStore::from_connection(conn)?,
        })
    }

    /// 读取全部记录（存储顺序）
    pub fn list_all(&self) -> RepositoryResult<Vec<ProductionRecord>> {
        Ok(self.store.get_json(RECORDS_KEY)?.unwrap_or_default())
    }

    /// 整体覆盖写入
    pub fn save_all(&self, records: &[ProductionRecord]) -> RepositoryResult<()> {
        tracing::debug!(count = records.len(), "写入日产记录");
        self.store.set_json(RECORDS_KEY, records)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<ProductionRecord> {
        self.list_all()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "ProductionRecord".to_string(),
                id: id.to_string(),
            })
    }

    /// 清空全部记录
    pub fn clear(&self) -> RepositoryResult<()> {
        self.store.remove_item(RECORDS_KEY)?;
        Ok(())
    }
}
