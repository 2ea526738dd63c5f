// ==========================================
// SIGLAB Aviário - 批次记录仓储
// ==========================================
// 存储: local_storage[siglab_batch_records] = JSON 数组
// ==========================================

use crate::domain::batch::BatchRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::local_store::{LocalStore, BATCH_RECORDS_KEY};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct BatchRepository {
    store: LocalStore,
}

impl BatchRepository {
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

    pub fn list_all(&self) -> RepositoryResult<Vec<BatchRecord>> {
        Ok(self.store.get_json(BATCH_RECORDS_KEY)?.unwrap_or_default())
    }

    pub fn save_all(&self, records: &[BatchRecord]) -> RepositoryResult<()> {
        tracing::debug!(count = records.len(), "写入批次记录");
        self.store.set_json(BATCH_RECORDS_KEY, records)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<BatchRecord> {
        self.list_all()?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "BatchRecord".to_string(),
                id: id.to_string(),
            })
    }

    pub fn clear(&self) -> RepositoryResult<()> {
        self.store.remove_item(BATCH_RECORDS_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AviaryId, Feathering};
    use chrono::NaiveDate;

    #[test]
    fn test_save_and_list_shares_connection() {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let repo = BatchRepository::from_connection(conn.clone()).unwrap();
        let batch = BatchRecord {
            id: "b1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            aviary_id: AviaryId::new(2).unwrap(),
            batch_id: "L-2".to_string(),
            age_weeks: 20,
            current_birds: 0,
            weight: 1500.0,
            uniformity: 82.0,
            feathering: Feathering::Bom,
            notes: None,
            updated_at: None,
        };
        repo.save_all(std::slice::from_ref(&batch)).unwrap();

        let other = BatchRepository::from_connection(conn).unwrap();
        assert_eq!(other.list_all().unwrap(), vec![batch]);
        assert_eq!(other.find_by_id("b1").unwrap().batch_id, "L-2");

        other.clear().unwrap();
        assert!(repo.list_all().unwrap().is_empty());
    }
}
