// ==========================================
// SIGLAB Aviário - 看板聚合
// ==========================================
// 职责: 总体 KPI / 分鸡舍统计 / 月度产量 / 周龄产蛋曲线
// 输入: 已筛选的日产记录（任意顺序，内部按日期升序处理）
// ==========================================

use crate::domain::batch::BatchRecord;
use crate::domain::production::ProductionRecord;
use crate::domain::types::AviaryId;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 周龄曲线有效范围（周）
pub const MAX_AGE_WEEKS: i64 = 120;

// ==========================================
// 输出结构
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityBreakdown {
    pub clean: u64,
    pub dirty: u64,
    pub cracked: u64,
    pub floor: u64,
    pub total: u64,
}

impl QualityBreakdown {
    fn add(&mut self, record: &ProductionRecord) {
        self.clean += u64::from(record.clean_eggs);
        self.dirty += u64::from(record.dirty_eggs);
        self.cracked += u64::from(record.cracked_eggs);
        self.floor += u64::from(record.floor_eggs);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStats {
    pub total_eggs: u64,
    /// 总蛋数 / Σ存栏(鸡日) × 100
    pub avg_laying_rate: f64,
    /// 各鸡舍最新一条记录的存栏之和
    pub current_birds: u64,
    pub total_mortality: u64,
    /// 死亡 / (死亡 + 当前存栏) × 100
    pub mortality_rate: f64,
    /// 仅统计 > 0 的记录
    pub avg_egg_weight: f64,
    pub avg_bird_weight: f64,
    pub quality: QualityBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AviaryStats {
    pub aviary_id: AviaryId,
    pub total_eggs: u64,
    /// 最新一条记录的存栏
    pub live_birds: u32,
    pub laying_rate: f64,
    pub quality: QualityBreakdown,
    pub mortality: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    /// 0..=11（跨年合并）
    pub month_index: u32,
    /// 下标 0..=3 对应 1..=4 号鸡舍
    pub per_aviary: [u64; 4],
    pub total: u64,
}

impl MonthlyBucket {
    pub fn value_for(&self, aviary: Option<AviaryId>) -> u64 {
        match aviary {
            Some(a) => self.per_aviary[a.index()],
            None => self.total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityPoint {
    pub age_weeks: i64,
    pub laying_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityCurve {
    pub batch_id: String,
    pub points: Vec<MaturityPoint>,
}

// ==========================================
// 聚合函数
// ==========================================

fn sorted_by_date(records: &[ProductionRecord]) -> Vec<&ProductionRecord> {
    let mut sorted: Vec<&ProductionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));
    sorted
}

fn bird_day_rate(total_eggs: u64, bird_days: u64) -> f64 {
    if bird_days == 0 {
        0.0
    } else {
        total_eggs as f64 / bird_days as f64 * 100.0
    }
}

fn positive_average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| *v > 0.0)
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// 总体 KPI
///
/// # 返回
/// - None: 输入为空
pub fn general_stats(records: &[ProductionRecord]) -> Option<GeneralStats> {
    if records.is_empty() {
        return None;
    }
    let sorted = sorted_by_date(records);

    let total_eggs: u64 = sorted.iter().map(|r| u64::from(r.metrics.total_eggs)).sum();

    let mut latest_by_aviary: HashMap<AviaryId, u32> = HashMap::new();
    for r in &sorted {
        latest_by_aviary.insert(r.aviary_id, r.live_birds);
    }
    let current_birds: u64 = latest_by_aviary.values().map(|v| u64::from(*v)).sum();

    let bird_days: u64 = sorted.iter().map(|r| u64::from(r.live_birds)).sum();
    let total_mortality: u64 = sorted.iter().map(|r| u64::from(r.mortality)).sum();
    let mortality_base = total_mortality + current_birds;
    let mortality_rate = if mortality_base > 0 {
        total_mortality as f64 / mortality_base as f64 * 100.0
    } else {
        0.0
    };

    let mut quality = QualityBreakdown::default();
    for r in &sorted {
        quality.add(r);
    }
    quality.total = total_eggs;

    Some(GeneralStats {
        total_eggs,
        avg_laying_rate: bird_day_rate(total_eggs, bird_days),
        current_birds,
        total_mortality,
        mortality_rate,
        avg_egg_weight: positive_average(sorted.iter().map(|r| r.egg_weight_avg)),
        avg_bird_weight: positive_average(sorted.iter().map(|r| r.bird_weight_avg)),
        quality,
    })
}

/// 分鸡舍统计（固定返回 1..=4 四项）
pub fn aviary_stats(records: &[ProductionRecord]) -> Vec<AviaryStats> {
    let sorted = sorted_by_date(records);

    AviaryId::ALL
        .iter()
        .map(|&aviary| {
            let own: Vec<&&ProductionRecord> =
                sorted.iter().filter(|r| r.aviary_id == aviary).collect();

            let total_eggs: u64 = own.iter().map(|r| u64::from(r.metrics.total_eggs)).sum();
            let bird_days: u64 = own.iter().map(|r| u64::from(r.live_birds)).sum();
            let mut quality = QualityBreakdown::default();
            for r in &own {
                quality.add(r);
            }
            quality.total = total_eggs;

            AviaryStats {
                aviary_id: aviary,
                total_eggs,
                live_birds: own.last().map(|r| r.live_birds).unwrap_or(0),
                laying_rate: bird_day_rate(total_eggs, bird_days),
                quality,
                mortality: own.iter().map(|r| u64::from(r.mortality)).sum(),
            }
        })
        .collect()
}

/// 月度产量（12 个月桶，跨年合并）
pub fn monthly_production(records: &[ProductionRecord]) -> Vec<MonthlyBucket> {
    let mut buckets: Vec<MonthlyBucket> = (0..12)
        .map(|month_index| MonthlyBucket {
            month_index,
            per_aviary: [0; 4],
            total: 0,
        })
        .collect();

    for r in records {
        let eggs = u64::from(r.metrics.total_eggs);
        if let Some(bucket) = buckets.get_mut(r.date.month0() as usize) {
            bucket.per_aviary[r.aviary_id.index()] += eggs;
            bucket.total += eggs;
        }
    }
    buckets
}

/// 周龄产蛋曲线
///
/// # 规则
/// - 参考批次: 批次记录中第一条 batch_id 与鸡舍均匹配的记录
/// - 周龄 = 参考批次周龄 + floor((日产日期 - 参考日期) / 7)
/// - 周龄不在 0..=120 的记录丢弃
/// - 同批次同周龄的产蛋率取算术平均
///
/// # 返回
/// - 按 batch_id 升序；点按周龄升序
pub fn maturity_curves(
    records: &[ProductionRecord],
    batches: &[BatchRecord],
) -> Vec<MaturityCurve> {
    let mut acc: BTreeMap<String, BTreeMap<i64, (f64, u32)>> = BTreeMap::new();

    for r in records {
        let reference = match batches
            .iter()
            .find(|b| b.batch_id == r.batch_id && b.aviary_id == r.aviary_id)
        {
            Some(b) => b,
            None => continue,
        };

        let diff_weeks = (r.date - reference.date).num_days().div_euclid(7);
        let age = i64::from(reference.age_weeks) + diff_weeks;
        if !(0..=MAX_AGE_WEEKS).contains(&age) {
            continue;
        }

        let slot = acc
            .entry(r.batch_id.clone())
            .or_default()
            .entry(age)
            .or_insert((0.0, 0));
        slot.0 += r.metrics.laying_rate;
        slot.1 += 1;
    }

    acc.into_iter()
        .map(|(batch_id, ages)| MaturityCurve {
            batch_id,
            points: ages
                .into_iter()
                .map(|(age_weeks, (sum, count))| MaturityPoint {
                    age_weeks,
                    laying_rate: sum / f64::from(count),
                })
                .collect(),
        })
        .filter(|c| !c.points.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::production::EggCounts;
    use crate::domain::types::Feathering;
    use crate::engine::metrics::compute_form_metrics;
    use chrono::{NaiveDate, Utc};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(
        aviary: u8,
        d: &str,
        batch_id: &str,
        birds: u32,
        clean: u32,
        mortality: u32,
        egg_weight: f64,
    ) -> ProductionRecord {
        let counts = EggCounts {
            clean,
            ..Default::default()
        };
        ProductionRecord {
            id: format!("{}-{}", aviary, d),
            date: date(d),
            aviary_id: AviaryId::new(aviary).unwrap(),
            batch_id: batch_id.to_string(),
            live_birds: birds,
            clean_eggs: clean,
            dirty_eggs: 0,
            cracked_eggs: 0,
            floor_eggs: 0,
            egg_weight_avg: egg_weight,
            bird_weight_avg: 0.0,
            mortality,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: None,
            metrics: compute_form_metrics(counts, birds),
        }
    }

    fn batch(aviary: u8, d: &str, batch_id: &str, age: u32) -> BatchRecord {
        BatchRecord {
            id: format!("b-{}-{}", aviary, d),
            date: date(d),
            aviary_id: AviaryId::new(aviary).unwrap(),
            batch_id: batch_id.to_string(),
            age_weeks: age,
            current_birds: 0,
            weight: 0.0,
            uniformity: 0.0,
            feathering: Feathering::Bom,
            notes: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_general_stats_empty() {
        assert!(general_stats(&[]).is_none());
    }

    #[test]
    fn test_general_stats_aggregates() {
        // 输入故意乱序
        let records = vec![
            record(1, "2024-01-02", "L1", 90, 80, 2, 60.0),
            record(1, "2024-01-01", "L1", 100, 90, 10, 0.0),
            record(2, "2024-01-01", "L2", 50, 40, 0, 62.0),
        ];
        let stats = general_stats(&records).unwrap();

        assert_eq!(stats.total_eggs, 210);
        // 鸡日 = 240
        assert!((stats.avg_laying_rate - 87.5).abs() < 1e-9);
        // 1 号取最新日期 90，2 号 50
        assert_eq!(stats.current_birds, 140);
        assert_eq!(stats.total_mortality, 12);
        assert!((stats.mortality_rate - 12.0 / 152.0 * 100.0).abs() < 1e-9);
        // 零值不参与平均
        assert!((stats.avg_egg_weight - 61.0).abs() < 1e-9);
        assert_eq!(stats.avg_bird_weight, 0.0);
        assert_eq!(stats.quality.clean, 210);
        assert_eq!(stats.quality.total, 210);
    }

    #[test]
    fn test_aviary_stats_always_four_entries() {
        let records = vec![
            record(3, "2024-02-01", "L3", 200, 150, 1, 0.0),
            record(3, "2024-02-02", "L3", 199, 160, 0, 0.0),
        ];
        let stats = aviary_stats(&records);
        assert_eq!(stats.len(), 4);
        assert_eq!(stats[0].total_eggs, 0);
        assert_eq!(stats[0].laying_rate, 0.0);

        let a3 = &stats[2];
        assert_eq!(a3.aviary_id.value(), 3);
        assert_eq!(a3.total_eggs, 310);
        assert_eq!(a3.live_birds, 199);
        assert_eq!(a3.mortality, 1);
        assert!((a3.laying_rate - 310.0 / 399.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_production_merges_years() {
        let records = vec![
            record(1, "2023-03-05", "L1", 100, 10, 0, 0.0),
            record(2, "2024-03-20", "L2", 100, 20, 0, 0.0),
            record(4, "2024-12-31", "L4", 100, 5, 0, 0.0),
        ];
        let buckets = monthly_production(&records);
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[2].total, 30);
        assert_eq!(buckets[2].per_aviary, [10, 20, 0, 0]);
        assert_eq!(buckets[11].value_for(AviaryId::new(4)), 5);
        assert_eq!(buckets[0].total, 0);
    }

    #[test]
    fn test_maturity_curves_age_and_average() {
        let batches = vec![batch(1, "2024-01-01", "L1", 20), batch(1, "2024-06-01", "L1", 40)];
        let records = vec![
            // 同周龄 20 两条，取平均
            record(1, "2024-01-01", "L1", 100, 80, 0, 0.0),
            record(1, "2024-01-07", "L1", 100, 90, 0, 0.0),
            // 第 8 天 → 21 周
            record(1, "2024-01-08", "L1", 100, 95, 0, 0.0),
            // 参考批次不存在 → 丢弃
            record(2, "2024-01-08", "L1", 100, 95, 0, 0.0),
        ];
        let curves = maturity_curves(&records, &batches);
        assert_eq!(curves.len(), 1);
        let points = &curves[0].points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].age_weeks, 20);
        assert!((points[0].laying_rate - 85.0).abs() < 1e-9);
        assert_eq!(points[1].age_weeks, 21);
    }

    #[test]
    fn test_maturity_curves_drop_out_of_range_ages() {
        let batches = vec![batch(1, "2024-01-15", "L1", 0), batch(2, "2024-01-01", "L2", 120)];
        let records = vec![
            // 早于参考日期 1 天 → -1 周
            record(1, "2024-01-14", "L1", 100, 80, 0, 0.0),
            // 120 + 1 周 → 丢弃
            record(2, "2024-01-08", "L2", 100, 80, 0, 0.0),
            record(2, "2024-01-07", "L2", 100, 80, 0, 0.0),
        ];
        let curves = maturity_curves(&records, &batches);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].batch_id, "L2");
        assert_eq!(curves[0].points[0].age_weeks, 120);
    }
}
