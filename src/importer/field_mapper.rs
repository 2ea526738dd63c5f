// ==========================================
// SIGLAB Aviário - 字段映射器实现
// ==========================================
// 职责: CSV 列位置 → 领域记录 + 类型转换
// 日产列序: Data;Aviario;Lote;Aves Vivas;Ovos Limpos;Ovos Sujos;
//           Ovos Trincados;Ovos Cama;Peso Ovos;Peso Aves;Mortalidade;Observacoes
// 批次列序: [可选前置列] Data;Aviario;Lote;Idade;Peso;Uniformidade;Empenamento
// ==========================================

use crate::domain::batch::BatchRecord;
use crate::domain::production::{EggCounts, ProductionRecord};
use crate::domain::types::{AviaryId, Feathering};
use crate::engine::batch_link::NO_BATCH;
use crate::engine::metrics::compute_import_metrics;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::import_trait::{DataCleaner as DataCleanerTrait, FieldMapper, RawRow};
use chrono::Utc;

/// 日产 CSV 最少列数（备注列可缺省）
pub const PRODUCTION_MIN_COLUMNS: usize = 11;

/// 批次 CSV 中日期允许出现的前几列
pub const BATCH_DATE_SEARCH_COLUMNS: usize = 3;

/// 批次号缺省值
pub const DEFAULT_BATCH_LABEL: &str = "S/L";

// ==========================================
// ProductionFieldMapper - 日产记录
// ==========================================
pub struct ProductionFieldMapper {
    cleaner: DataCleaner,
}

impl ProductionFieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    fn count(&self, row: &RawRow, index: usize) -> u32 {
        row.get(index).map(|v| self.cleaner.parse_count(v)).unwrap_or(0)
    }

    fn number(&self, row: &RawRow, index: usize) -> f64 {
        row.get(index).map(|v| self.cleaner.parse_number(v)).unwrap_or(0.0)
    }
}

impl Default for ProductionFieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapper for ProductionFieldMapper {
    type Output = ProductionRecord;

    fn map_row(&self, row: &RawRow) -> Result<ProductionRecord, String> {
        if row.columns.len() < PRODUCTION_MIN_COLUMNS {
            return Err(format!(
                "列数不足: {} < {}",
                row.columns.len(),
                PRODUCTION_MIN_COLUMNS
            ));
        }

        let raw_date = row.get(0).unwrap_or_default();
        let date = self
            .cleaner
            .parse_flexible_date(raw_date)
            .ok_or_else(|| format!("日期无法识别: {}", raw_date))?;

        let raw_aviary = row.get(1).unwrap_or_default();
        let aviary_id = AviaryId::from_digits(raw_aviary)
            .ok_or_else(|| format!("鸡舍编号无效: {}", raw_aviary))?;

        let batch_id = row
            .get(2)
            .map(|v| self.cleaner.clean_text(v))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| NO_BATCH.to_string());

        let live_birds = self.count(row, 3);
        let counts = EggCounts {
            clean: self.count(row, 4),
            dirty: self.count(row, 5),
            cracked: self.count(row, 6),
            floor: self.count(row, 7),
        };
        let now = Utc::now();

        Ok(ProductionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            aviary_id,
            batch_id,
            live_birds,
            clean_eggs: counts.clean,
            dirty_eggs: counts.dirty,
            cracked_eggs: counts.cracked,
            floor_eggs: counts.floor,
            egg_weight_avg: self.number(row, 8),
            bird_weight_avg: self.number(row, 9),
            mortality: self.count(row, 10),
            notes: row.get(11).map(|v| self.cleaner.clean_text(v)).unwrap_or_default(),
            created_at: now,
            updated_at: Some(now),
            metrics: compute_import_metrics(counts, live_birds),
        })
    }
}

// ==========================================
// BatchFieldMapper - 批次特征记录
// ==========================================
// 日期列在前 3 列中查找，其余字段相对日期列定位
pub struct BatchFieldMapper {
    cleaner: DataCleaner,
}

impl BatchFieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }
}

impl Default for BatchFieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapper for BatchFieldMapper {
    type Output = BatchRecord;

    fn map_row(&self, row: &RawRow) -> Result<BatchRecord, String> {
        let (date_col, date) = row
            .columns
            .iter()
            .take(BATCH_DATE_SEARCH_COLUMNS)
            .enumerate()
            .find_map(|(i, v)| self.cleaner.parse_flexible_date(v).map(|d| (i, d)))
            .ok_or_else(|| "前 3 列中未找到日期 (DD/MM/AAAA 或 AAAA-MM-DD)".to_string())?;

        let aviary_id = match row.get(date_col + 1) {
            Some(raw) => {
                AviaryId::from_digits(raw).ok_or_else(|| format!("鸡舍编号无效: {}", raw))?
            }
            None => AviaryId::ALL[0],
        };

        let batch_id = row
            .get(date_col + 2)
            .map(|v| self.cleaner.clean_text(v))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BATCH_LABEL.to_string());

        let number = |offset: usize| {
            row.get(date_col + offset)
                .map(|v| self.cleaner.parse_number(v))
                .unwrap_or(0.0)
        };

        Ok(BatchRecord {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            aviary_id,
            batch_id,
            age_weeks: row
                .get(date_col + 3)
                .map(|v| self.cleaner.parse_count(v))
                .unwrap_or(0),
            current_birds: 0,
            weight: number(4),
            uniformity: number(5),
            feathering: row
                .get(date_col + 6)
                .map(Feathering::parse_lenient)
                .unwrap_or_default(),
            notes: None,
            updated_at: Some(Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cols: &[&str]) -> RawRow {
        RawRow {
            line_number: 2,
            columns: cols.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_production_row_mapping() {
        let mapper = ProductionFieldMapper::new();
        let r = row(&[
            "2024-01-05", "1", "L-01", "20", "10", "5", "2", "0", "62,5", "1800", "1", "ração nova",
        ]);
        let rec = mapper.map_row(&r).unwrap();
        assert_eq!(rec.aviary_id.value(), 1);
        assert_eq!(rec.batch_id, "L-01");
        assert_eq!(rec.metrics.total_eggs, 17);
        assert_eq!(rec.metrics.laying_rate, 85.0);
        assert_eq!(rec.egg_weight_avg, 62.5);
        assert_eq!(rec.notes, "ração nova");
        assert!(rec.updated_at.is_some());
    }

    #[test]
    fn test_production_row_rejects_short_rows_and_bad_aviary() {
        let mapper = ProductionFieldMapper::new();
        assert!(mapper.map_row(&row(&["2024-01-05", "1", "L"])).is_err());

        let bad = row(&["2024-01-05", "9", "L", "1", "1", "1", "1", "1", "1", "1", "1"]);
        assert!(mapper.map_row(&bad).unwrap_err().contains("9"));
    }

    #[test]
    fn test_production_row_missing_batch_and_notes() {
        let mapper = ProductionFieldMapper::new();
        let r = row(&["05/01/2024", "Aviário 2", "", "0", "0", "0", "0", "3", "", "", ""]);
        let rec = mapper.map_row(&r).unwrap();
        assert_eq!(rec.batch_id, NO_BATCH);
        assert_eq!(rec.floor_eggs, 3);
        assert_eq!(rec.metrics.laying_rate, 0.0);
        assert_eq!(rec.notes, "");
    }

    #[test]
    fn test_batch_row_date_in_leading_columns() {
        let mapper = BatchFieldMapper::new();
        let r = row(&["ID-7", "15/03/2024", "Av 3", "L-22", "30", "1650", "88.5", "excelente"]);
        let rec = mapper.map_row(&r).unwrap();
        assert_eq!(rec.date.to_string(), "2024-03-15");
        assert_eq!(rec.aviary_id.value(), 3);
        assert_eq!(rec.batch_id, "L-22");
        assert_eq!(rec.age_weeks, 30);
        assert_eq!(rec.weight, 1650.0);
        assert_eq!(rec.uniformity, 88.5);
        assert_eq!(rec.feathering, Feathering::Excelente);
        assert_eq!(rec.current_birds, 0);
    }

    #[test]
    fn test_batch_row_defaults() {
        let mapper = BatchFieldMapper::new();
        let rec = mapper.map_row(&row(&["2024-03-15"])).unwrap();
        assert_eq!(rec.aviary_id.value(), 1);
        assert_eq!(rec.batch_id, DEFAULT_BATCH_LABEL);
        assert_eq!(rec.feathering, Feathering::Bom);
    }

    #[test]
    fn test_batch_row_without_date_is_skipped() {
        let mapper = BatchFieldMapper::new();
        assert!(mapper.map_row(&row(&["a", "b", "c", "2024-03-15"])).is_err());
    }
}
