// ==========================================
// SIGLAB Aviário - 日产记录与批次关联
// ==========================================
// 规则: 同一鸡舍中 date <= 日产日期 的最新批次即为当前批次
// 无匹配批次时写入占位符 "-"
// 说明: 不保留历史快照，批次历史变更会回溯改写已有日产记录
// ==========================================

use crate::domain::batch::BatchRecord;
use crate::domain::production::ProductionRecord;
use crate::domain::types::AviaryId;
use chrono::NaiveDate;

/// 无批次占位符
pub const NO_BATCH: &str = "-";

/// 查找 (鸡舍, 日期) 对应的当前批次
///
/// # 参数
/// - batches: 全部批次记录（存储顺序）
/// - aviary: 鸡舍
/// - date: 日产日期
///
/// # 返回
/// - Some(&BatchRecord): date 最大的候选；同日多条时取存储顺序中的第一条
/// - None: 该鸡舍在此日期之前没有批次
pub fn find_active_batch(
    batches: &[BatchRecord],
    aviary: AviaryId,
    date: NaiveDate,
) -> Option<&BatchRecord> {
    batches
        .iter()
        .filter(|b| b.aviary_id == aviary && b.date <= date)
        .fold(None, |best: Option<&BatchRecord>, b| match best {
            Some(cur) if cur.date >= b.date => Some(cur),
            _ => Some(b),
        })
}

/// 解析当前批次号，无批次时返回 "-"
pub fn resolve_batch_id(batches: &[BatchRecord], aviary: AviaryId, date: NaiveDate) -> String {
    find_active_batch(batches, aviary, date)
        .map(|b| b.batch_id.clone())
        .unwrap_or_else(|| NO_BATCH.to_string())
}

/// 按批次记录重新计算全部日产记录的 batch_id
///
/// # 返回
/// - 发生变化的记录数
pub fn sync_production_with_batches(
    production: &mut [ProductionRecord],
    batches: &[BatchRecord],
) -> usize {
    let mut changed = 0;
    for record in production.iter_mut() {
        let batch_id = resolve_batch_id(batches, record.aviary_id, record.date);
        if record.batch_id != batch_id {
            tracing::debug!(
                record_id = %record.id,
                from = %record.batch_id,
                to = %batch_id,
                "重新关联批次"
            );
            record.batch_id = batch_id;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::production::ProductionMetrics;
    use crate::domain::types::Feathering;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn batch(id: &str, aviary: u8, d: &str, batch_id: &str) -> BatchRecord {
        BatchRecord {
            id: id.to_string(),
            date: date(d),
            aviary_id: AviaryId::new(aviary).unwrap(),
            batch_id: batch_id.to_string(),
            age_weeks: 20,
            current_birds: 0,
            weight: 1500.0,
            uniformity: 85.0,
            feathering: Feathering::Bom,
            notes: None,
            updated_at: None,
        }
    }

    fn production(id: &str, aviary: u8, d: &str, batch_id: &str) -> ProductionRecord {
        ProductionRecord {
            id: id.to_string(),
            date: date(d),
            aviary_id: AviaryId::new(aviary).unwrap(),
            batch_id: batch_id.to_string(),
            live_birds: 100,
            clean_eggs: 80,
            dirty_eggs: 0,
            cracked_eggs: 0,
            floor_eggs: 0,
            egg_weight_avg: 0.0,
            bird_weight_avg: 0.0,
            mortality: 0,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: None,
            metrics: ProductionMetrics::default(),
        }
    }

    #[test]
    fn test_find_active_batch_latest_not_after_date() {
        let batches = vec![
            batch("b1", 1, "2024-01-01", "L-01"),
            batch("b2", 1, "2024-03-01", "L-02"),
            batch("b3", 1, "2024-06-01", "L-03"),
            batch("b4", 2, "2024-02-01", "L-99"),
        ];
        let a1 = AviaryId::new(1).unwrap();
        let found = find_active_batch(&batches, a1, date("2024-04-15")).unwrap();
        assert_eq!(found.batch_id, "L-02");

        // 当天生效
        let found = find_active_batch(&batches, a1, date("2024-06-01")).unwrap();
        assert_eq!(found.batch_id, "L-03");

        // 早于全部批次
        assert!(find_active_batch(&batches, a1, date("2023-12-31")).is_none());
    }

    #[test]
    fn test_find_active_batch_same_date_keeps_first_in_storage_order() {
        let batches = vec![
            batch("b1", 3, "2024-05-01", "NEW"),
            batch("b2", 3, "2024-05-01", "OLD"),
        ];
        let found = find_active_batch(&batches, AviaryId::new(3).unwrap(), date("2024-05-02"));
        assert_eq!(found.map(|b| b.batch_id.as_str()), Some("NEW"));
    }

    #[test]
    fn test_sync_production_with_batches_relabels_and_counts() {
        let batches = vec![batch("b1", 1, "2024-01-10", "L-A")];
        let mut records = vec![
            production("p1", 1, "2024-01-09", "L-A"),
            production("p2", 1, "2024-01-10", "-"),
            production("p3", 2, "2024-01-10", "-"),
        ];

        let changed = sync_production_with_batches(&mut records, &batches);
        assert_eq!(changed, 2);
        assert_eq!(records[0].batch_id, NO_BATCH);
        assert_eq!(records[1].batch_id, "L-A");
        assert_eq!(records[2].batch_id, NO_BATCH);

        // 幂等
        assert_eq!(sync_production_with_batches(&mut records, &batches), 0);
    }

    #[test]
    fn test_sync_with_empty_batches_resets_everything() {
        let mut records = vec![production("p1", 4, "2024-01-09", "L-A")];
        sync_production_with_batches(&mut records, &[]);
        assert_eq!(records[0].batch_id, NO_BATCH);
    }
}
