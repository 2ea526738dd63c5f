// ==========================================
// SIGLAB Aviário - 云同步快照
// ==========================================
// 载荷格式: { records, batchRecords, lastUpdated, device }
// ==========================================

use crate::domain::batch::BatchRecord;
use crate::domain::production::ProductionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 上传时写入的设备标识
pub const DEVICE_LABEL: &str = "Desktop";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CloudSnapshot {
    #[serde(default)]
    pub records: Vec<ProductionRecord>,
    #[serde(default)]
    pub batch_records: Vec<BatchRecord>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub device: Option<String>,
}

impl CloudSnapshot {
    pub fn new(records: Vec<ProductionRecord>, batch_records: Vec<BatchRecord>) -> Self {
        Self {
            records,
            batch_records,
            last_updated: Some(Utc::now()),
            device: Some(DEVICE_LABEL.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.batch_records.is_empty()
    }
}

// ==========================================
// Syncable - 可按 updatedAt 合并的记录
// ==========================================
pub trait Syncable {
    fn record_id(&self) -> &str;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

impl Syncable for ProductionRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Syncable for BatchRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
