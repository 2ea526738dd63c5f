// ==========================================
// SIGLAB Aviário - 日产记录领域模型
// ==========================================
// 职责: 日产表单输入 / 派生指标 / 持久化记录
// 存储: 本地存储键 siglab_records (JSON 数组)
// ==========================================

use crate::domain::types::AviaryId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// EggCounts - 按品质分类的蛋数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EggCounts {
    pub clean: u32,
    pub dirty: u32,
    pub cracked: u32,
    pub floor: u32,
}

impl EggCounts {
    pub fn total(&self) -> u32 {
        self.clean
            .saturating_add(self.dirty)
            .saturating_add(self.cracked)
            .saturating_add(self.floor)
    }
}

// ==========================================
// ProductionMetrics - 派生指标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionMetrics {
    pub total_eggs: u32,
    pub clean_percentage: f64,
    pub dirty_percentage: f64,
    pub cracked_percentage: f64,
    pub floor_percentage: f64,
    /// 产蛋率 = 总蛋数 / 存栏数 × 100
    pub laying_rate: f64,
}

// ==========================================
// ProductionFormData - 日产表单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionFormData {
    pub date: NaiveDate,
    pub aviary_id: AviaryId,
    pub live_birds: u32,
    pub clean_eggs: u32,
    pub dirty_eggs: u32,
    pub cracked_eggs: u32,
    pub floor_eggs: u32,
    pub egg_weight_avg: f64,
    pub bird_weight_avg: f64,
    pub mortality: u32,
    #[serde(default)]
    pub notes: String,
}

impl ProductionFormData {
    pub fn egg_counts(&self) -> EggCounts {
        EggCounts {
            clean: self.clean_eggs,
            dirty: self.dirty_eggs,
            cracked: self.cracked_eggs,
            floor: self.floor_eggs,
        }
    }
}

// ==========================================
// ProductionRecord - 日产记录
// ==========================================
// batch_id 为冗余字段，批次变更时由 batch_link 重新计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecord {
    pub id: String,
    pub date: NaiveDate,
    pub aviary_id: AviaryId,
    #[serde(default)]
    pub batch_id: String,
    pub live_birds: u32,
    pub clean_eggs: u32,
    pub dirty_eggs: u32,
    pub cracked_eggs: u32,
    pub floor_eggs: u32,
    #[serde(default)]
    pub egg_weight_avg: f64,
    #[serde(default)]
    pub bird_weight_avg: f64,
    #[serde(default)]
    pub mortality: u32,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    /// 早期数据（含 CSV 导入）可能缺失
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub metrics: ProductionMetrics,
}

impl ProductionRecord {
    pub fn egg_counts(&self) -> EggCounts {
        EggCounts {
            clean: self.clean_eggs,
            dirty: self.dirty_eggs,
            cracked: self.cracked_eggs,
            floor: self.floor_eggs,
        }
    }
}
