// ==========================================
// SIGLAB Aviário - 日产记录筛选
// ==========================================
// 职责: 时段 / 年 / 月 / 半月 / 鸡舍 / 批次 / 关键字筛选 + 排序
// 职责: 生成年份 / 批次 / 半月下拉选项
// ==========================================

use crate::domain::production::ProductionRecord;
use crate::domain::types::{AviaryId, FortnightHalf};
use crate::engine::batch_link::NO_BATCH;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 月份缩写（标签用）
pub const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

// ==========================================
// 时段筛选
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeriodFilter {
    #[default]
    All,
    Last7Days,
    Last30Days,
    CurrentMonth,
}

impl PeriodFilter {
    /// 判断日期是否落在时段内
    ///
    /// 天数差按 |today - date| 计算，未来日期同样计入
    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        let diff_days = (today - date).num_days().abs();
        match self {
            PeriodFilter::All => true,
            PeriodFilter::Last7Days => diff_days <= 7,
            PeriodFilter::Last30Days => diff_days <= 30,
            PeriodFilter::CurrentMonth => {
                date.year() == today.year() && date.month() == today.month()
            }
        }
    }
}

impl FromStr for PeriodFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "todo" => Ok(PeriodFilter::All),
            "7d" | "last7" | "last_7_days" => Ok(PeriodFilter::Last7Days),
            "30d" | "last30" | "last_30_days" => Ok(PeriodFilter::Last30Days),
            "month" | "current_month" => Ok(PeriodFilter::CurrentMonth),
            other => Err(format!("unknown period: {}", other)),
        }
    }
}

// ==========================================
// 半月段
// ==========================================
// 值编码: "{year}-{monthIdx}-{part}"，monthIdx 从 0 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fortnight {
    pub year: i32,
    /// 0..=11
    pub month_index: u32,
    pub half: FortnightHalf,
}

impl Fortnight {
    pub fn of_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month_index: date.month0(),
            half: FortnightHalf::of_day(date.day()),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        *self == Self::of_date(date)
    }

    pub fn label(&self) -> String {
        let month = MONTHS_SHORT
            .get(self.month_index as usize)
            .copied()
            .unwrap_or("?");
        let ordinal = match self.half {
            FortnightHalf::First => "1ª",
            FortnightHalf::Second => "2ª",
        };
        format!("{}/{} - {} Quinzena", month, self.year, ordinal)
    }
}

impl fmt::Display for Fortnight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month_index, self.half.part())
    }
}

impl FromStr for Fortnight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        let invalid = || format!("invalid fortnight value: {}", s);
        if parts.len() != 3 {
            return Err(invalid());
        }
        let year = parts[0].parse::<i32>().map_err(|_| invalid())?;
        let month_index = parts[1].parse::<u32>().map_err(|_| invalid())?;
        if month_index > 11 {
            return Err(invalid());
        }
        let half = parts[2]
            .parse::<u8>()
            .ok()
            .and_then(FortnightHalf::from_part)
            .ok_or_else(invalid)?;
        Ok(Self {
            year,
            month_index,
            half,
        })
    }
}

impl Serialize for Fortnight {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fortnight {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 半月下拉选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortnightOption {
    pub label: String,
    pub value: Fortnight,
}

// ==========================================
// 排序
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// 日报列表
    NewestFirst,
    /// 看板
    OldestFirst,
}

// ==========================================
// RecordFilter - 组合筛选条件
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub period: PeriodFilter,
    #[serde(default)]
    pub year: Option<i32>,
    /// 1..=12
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub fortnight: Option<Fortnight>,
    #[serde(default)]
    pub aviary: Option<AviaryId>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        *self == RecordFilter::default()
    }

    /// 单条记录是否满足全部条件
    pub fn matches(&self, record: &ProductionRecord, today: NaiveDate) -> bool {
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let date_str = record.date.format("%Y-%m-%d").to_string();
            let matched = date_str.contains(term)
                || record.batch_id.to_lowercase().contains(&term.to_lowercase());
            if !matched {
                return false;
            }
        }

        if let Some(aviary) = self.aviary {
            if record.aviary_id != aviary {
                return false;
            }
        }

        if let Some(batch_id) = self.batch_id.as_deref() {
            if record.batch_id != batch_id {
                return false;
            }
        }

        if let Some(year) = self.year {
            if record.date.year() != year {
                return false;
            }
        }

        if let Some(month) = self.month {
            if record.date.month() != month {
                return false;
            }
        }

        if let Some(fortnight) = self.fortnight {
            if !fortnight.contains(record.date) {
                return false;
            }
        }

        self.period.contains(record.date, today)
    }

    /// 筛选并排序（同日期保持原存储顺序）
    pub fn apply(
        &self,
        records: &[ProductionRecord],
        today: NaiveDate,
        order: SortOrder,
    ) -> Vec<ProductionRecord> {
        let mut result: Vec<ProductionRecord> = records
            .iter()
            .filter(|r| self.matches(r, today))
            .cloned()
            .collect();
        match order {
            SortOrder::NewestFirst => result.sort_by(|a, b| b.date.cmp(&a.date)),
            SortOrder::OldestFirst => result.sort_by(|a, b| a.date.cmp(&b.date)),
        }
        result
    }
}

// ==========================================
// 下拉选项
// ==========================================

/// 年份选项（降序）
pub fn year_options(records: &[ProductionRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().map(|r| r.date.year()).collect();
    years.into_iter().rev().collect()
}

/// 批次选项（升序，排除空值与 "-"）
pub fn batch_options(records: &[ProductionRecord]) -> Vec<String> {
    let batches: BTreeSet<&str> = records
        .iter()
        .map(|r| r.batch_id.as_str())
        .filter(|id| !id.is_empty() && *id != NO_BATCH)
        .collect();
    batches.into_iter().map(str::to_string).collect()
}

/// 半月选项
///
/// 月份按时间倒序；同月内 2ª Quinzena 在前
pub fn fortnight_options(records: &[ProductionRecord]) -> Vec<FortnightOption> {
    let months: BTreeSet<(i32, u32)> = records
        .iter()
        .map(|r| (r.date.year(), r.date.month0()))
        .collect();

    let mut options = Vec::with_capacity(months.len() * 2);
    for (year, month_index) in months.into_iter().rev() {
        for half in [FortnightHalf::Second, FortnightHalf::First] {
            let value = Fortnight {
                year,
                month_index,
                half,
            };
            options.push(FortnightOption {
                label: value.label(),
                value,
            });
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::production::ProductionMetrics;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(id: &str, aviary: u8, d: &str, batch_id: &str) -> ProductionRecord {
        ProductionRecord {
            id: id.to_string(),
            date: date(d),
            aviary_id: AviaryId::new(aviary).unwrap(),
            batch_id: batch_id.to_string(),
            live_birds: 100,
            clean_eggs: 90,
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
    fn test_fortnight_halves_split_at_day_15() {
        let first: Fortnight = "2024-2-1".parse().unwrap();
        let second: Fortnight = "2024-2-2".parse().unwrap();

        assert!(first.contains(date("2024-03-15")));
        assert!(!first.contains(date("2024-03-16")));
        assert!(second.contains(date("2024-03-16")));
        assert!(second.contains(date("2024-03-31")));
        assert!(!second.contains(date("2024-04-01")));
    }

    #[test]
    fn test_fortnight_value_roundtrip_and_label() {
        let f = Fortnight::of_date(date("2024-10-20"));
        assert_eq!(f.to_string(), "2024-9-2");
        assert_eq!(f.label(), "Out/2024 - 2ª Quinzena");
        assert!("2024-12-1".parse::<Fortnight>().is_err());
        assert!("2024-1".parse::<Fortnight>().is_err());
    }

    #[test]
    fn test_period_windows() {
        let today = date("2024-05-31");
        assert!(PeriodFilter::Last7Days.contains(date("2024-05-24"), today));
        assert!(!PeriodFilter::Last7Days.contains(date("2024-05-23"), today));
        assert!(PeriodFilter::Last30Days.contains(date("2024-05-01"), today));
        assert!(!PeriodFilter::Last30Days.contains(date("2024-04-30"), today));
        assert!(PeriodFilter::CurrentMonth.contains(date("2024-05-01"), today));
        assert!(!PeriodFilter::CurrentMonth.contains(date("2023-05-10"), today));
        // 未来日期按绝对天数计算
        assert!(PeriodFilter::Last7Days.contains(date("2024-06-03"), today));
    }

    #[test]
    fn test_search_matches_date_or_batch_case_insensitive() {
        let today = date("2024-05-31");
        let r = record("p1", 1, "2024-05-10", "Lote-ABC");
        let by_date = RecordFilter {
            search: Some("2024-05".to_string()),
            ..Default::default()
        };
        let by_batch = RecordFilter {
            search: Some("abc".to_string()),
            ..Default::default()
        };
        let miss = RecordFilter {
            search: Some("xyz".to_string()),
            ..Default::default()
        };
        assert!(by_date.matches(&r, today));
        assert!(by_batch.matches(&r, today));
        assert!(!miss.matches(&r, today));
    }

    #[test]
    fn test_apply_filters_and_sorts() {
        let today = date("2024-05-31");
        let records = vec![
            record("p1", 1, "2024-05-10", "L1"),
            record("p2", 2, "2024-05-20", "L2"),
            record("p3", 1, "2024-04-02", "L1"),
            record("p4", 1, "2023-05-02", "L1"),
        ];
        let filter = RecordFilter {
            aviary: AviaryId::new(1),
            year: Some(2024),
            ..Default::default()
        };

        let newest = filter.apply(&records, today, SortOrder::NewestFirst);
        let ids: Vec<&str> = newest.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);

        let oldest = filter.apply(&records, today, SortOrder::OldestFirst);
        assert_eq!(oldest[0].id, "p3");

        let by_month = RecordFilter {
            month: Some(5),
            ..Default::default()
        };
        assert_eq!(by_month.apply(&records, today, SortOrder::NewestFirst).len(), 3);
    }

    #[test]
    fn test_options() {
        let records = vec![
            record("p1", 1, "2024-09-10", "L2"),
            record("p2", 1, "2024-10-20", "-"),
            record("p3", 1, "2023-01-02", "L1"),
            record("p4", 1, "2024-10-02", ""),
        ];

        assert_eq!(year_options(&records), vec![2024, 2023]);
        assert_eq!(batch_options(&records), vec!["L1".to_string(), "L2".to_string()]);

        let values: Vec<String> = fortnight_options(&records)
            .iter()
            .map(|o| o.value.to_string())
            .collect();
        // 10 月排在 9 月之前（按时间而非字符串排序）
        assert_eq!(
            values,
            vec!["2024-9-2", "2024-9-1", "2024-8-2", "2024-8-1", "2023-0-2", "2023-0-1"]
        );
    }
}
