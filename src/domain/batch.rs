// ==========================================
// SIGLAB Aviário - 鸡群批次特征记录
// ==========================================
// 职责: 某一时点的鸡群特征（周龄/体重/均匀度/羽毛评级）
// 存储: 本地存储键 siglab_batch_records (JSON 数组)
// 说明: batch_id 为自由文本，不要求唯一
// ==========================================

use crate::domain::types::{AviaryId, Feathering};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 批次特征表单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFormData {
    pub date: NaiveDate,
    pub aviary_id: AviaryId,
    pub batch_id: String,
    pub age_weeks: u32,
    /// 体重 (g)
    pub weight: f64,
    /// 均匀度 (%)
    pub uniformity: f64,
    pub feathering: Feathering,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecord {
    pub id: String,
    pub date: NaiveDate,
    pub aviary_id: AviaryId,
    pub batch_id: String,
    #[serde(default)]
    pub age_weeks: u32,
    /// 兼容旧格式保留；表单与导入均写 0，存栏以日产记录为准
    #[serde(default)]
    pub current_birds: u32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub uniformity: f64,
    #[serde(default)]
    pub feathering: Feathering,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BatchRecord {
    /// 由表单生成新记录（分配 UUID）
    pub fn from_form(form: BatchFormData, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: form.date,
            aviary_id: form.aviary_id,
            batch_id: form.batch_id.trim().to_string(),
            age_weeks: form.age_weeks,
            current_birds: 0,
            weight: form.weight,
            uniformity: form.uniformity,
            feathering: form.feathering,
            notes: form.notes.filter(|n| !n.trim().is_empty()),
            updated_at: Some(now),
        }
    }
}
