// ==========================================
// SIGLAB Aviário - 拉取合并策略
// ==========================================
// Replace:   远端数组整体覆盖本地
// UpdatedAt: 按 id 合并，双方都有时保留 updatedAt 较新者（相同时取远端）
// 缺失 updatedAt 视为最旧
// ==========================================

use crate::domain::batch::BatchRecord;
use crate::domain::production::ProductionRecord;
use crate::domain::snapshot::{CloudSnapshot, Syncable};
use crate::domain::types::MergeStrategy;
use std::collections::HashMap;

/// 合并结果
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub records: Vec<ProductionRecord>,
    pub batch_records: Vec<BatchRecord>,
}

/// 按 updatedAt 合并同类记录
///
/// 输出顺序: 仅远端存在的记录（远端顺序）在前，其后为本地顺序
pub fn merge_by_updated_at<T: Syncable + Clone>(local: &[T], remote: &[T]) -> Vec<T> {
    let remote_by_id: HashMap<&str, &T> = remote.iter().map(|r| (r.record_id(), r)).collect();
    let local_ids: HashMap<&str, ()> = local.iter().map(|l| (l.record_id(), ())).collect();

    let mut merged: Vec<T> = remote
        .iter()
        .filter(|r| !local_ids.contains_key(r.record_id()))
        .cloned()
        .collect();

    for item in local {
        let winner = match remote_by_id.get(item.record_id()) {
            // Option 比较: None < Some(_)
            Some(remote_item) if remote_item.updated_at() >= item.updated_at() => *remote_item,
            _ => item,
        };
        merged.push(winner.clone());
    }
    merged
}

/// 合并本地数据与远端快照
pub fn merge_snapshot(
    local_records: &[ProductionRecord],
    local_batches: &[BatchRecord],
    remote: &CloudSnapshot,
    strategy: MergeStrategy,
) -> MergeOutcome {
    match strategy {
        MergeStrategy::Replace => MergeOutcome {
            records: remote.records.clone(),
            batch_records: remote.batch_records.clone(),
        },
        MergeStrategy::UpdatedAt => MergeOutcome {
            records: merge_by_updated_at(local_records, &remote.records),
            batch_records: merge_by_updated_at(local_batches, &remote.batch_records),
        },
    }
}
