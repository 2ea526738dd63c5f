// ==========================================
// SIGLAB Aviário - CSV 导出
// ==========================================
// 格式: ';' 分隔 / '\n' 换行 / UTF-8 BOM（批次导出）
// 说明: 导出文件可被对应的导入器重新读取
// ==========================================

use crate::domain::batch::BatchRecord;
use crate::domain::production::ProductionRecord;
use crate::engine::batch_link::NO_BATCH;
use crate::importer::error::{ImportError, ImportResult};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io::Write;

pub const PRODUCTION_HEADERS: [&str; 12] = [
    "Data",
    "Aviario",
    "Lote",
    "Aves Vivas",
    "Ovos Limpos",
    "Ovos Sujos",
    "Ovos Trincados",
    "Ovos Cama",
    "Peso Ovos",
    "Peso Aves",
    "Mortalidade",
    "Observacoes",
];

pub const BATCH_HEADERS: [&str; 7] = [
    "Data",
    "Aviario",
    "Lote",
    "Idade (Sem)",
    "Peso (g)",
    "Uniformidade",
    "Empenamento",
];

const UTF8_BOM: &[u8] = "\u{feff}".as_bytes();

/// 备注列始终加引号，内部引号双写
fn quote_always(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn writer_builder(quote_style: QuoteStyle) -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .delimiter(b';')
        .terminator(Terminator::Any(b'\n'))
        .quote_style(quote_style);
    builder
}

/// 导出日产记录
///
/// # 参数
/// - records: 按调用方给定顺序写出
/// - out: 输出目标
///
/// # 返回
/// - 写出的数据行数
pub fn export_production_csv<W: Write>(
    records: &[ProductionRecord],
    mut out: W,
) -> ImportResult<usize> {
    if records.is_empty() {
        return Err(ImportError::ExportError("没有可导出的记录".to_string()));
    }

    // 备注已手工加引号，其余字段不含分隔符
    let mut writer = writer_builder(QuoteStyle::Never).from_writer(Vec::new());
    writer.write_record(PRODUCTION_HEADERS)?;

    for r in records {
        let batch = if r.batch_id.is_empty() {
            NO_BATCH
        } else {
            r.batch_id.as_str()
        };
        writer.write_record([
            r.date.to_string(),
            r.aviary_id.to_string(),
            batch.replace(';', ","),
            r.live_birds.to_string(),
            r.clean_eggs.to_string(),
            r.dirty_eggs.to_string(),
            r.cracked_eggs.to_string(),
            r.floor_eggs.to_string(),
            r.egg_weight_avg.to_string(),
            r.bird_weight_avg.to_string(),
            r.mortality.to_string(),
            quote_always(&r.notes.replace(['\n', '\r'], " ")),
        ])?;
    }

    let bytes = writer.into_inner()?;
    out.write_all(&bytes)?;
    Ok(records.len())
}

/// 导出批次记录（带 BOM，便于表格软件识别编码）
pub fn export_batch_csv<W: Write>(records: &[BatchRecord], mut out: W) -> ImportResult<usize> {
    if records.is_empty() {
        return Err(ImportError::ExportError("没有可导出的记录".to_string()));
    }

    let mut writer = writer_builder(QuoteStyle::Necessary).from_writer(Vec::new());
    writer.write_record(BATCH_HEADERS)?;
    for b in records {
        writer.write_record([
            b.date.to_string(),
            b.aviary_id.to_string(),
            b.batch_id.clone(),
            b.age_weeks.to_string(),
            b.weight.to_string(),
            b.uniformity.to_string(),
            b.feathering.to_string(),
        ])?;
    }

    let bytes = writer.into_inner()?;
    out.write_all(UTF8_BOM)?;
    out.write_all(&bytes)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::production::ProductionMetrics;
    use crate::domain::types::{AviaryId, Feathering};
    use crate::importer::csv_importer::{batch_importer, production_importer};
    use chrono::{NaiveDate, Utc};

    fn production(notes: &str) -> ProductionRecord {
        ProductionRecord {
            id: "p1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            aviary_id: AviaryId::new(2).unwrap(),
            batch_id: String::new(),
            live_birds: 20,
            clean_eggs: 10,
            dirty_eggs: 5,
            cracked_eggs: 2,
            floor_eggs: 1,
            egg_weight_avg: 62.5,
            bird_weight_avg: 1800.0,
            mortality: 1,
            notes: notes.to_string(),
            created_at: Utc::now(),
            updated_at: None,
            metrics: ProductionMetrics::default(),
        }
    }

    #[test]
    fn test_export_production_layout() {
        let mut out = Vec::new();
        let n = export_production_csv(&[production("chuva \"forte\"")], &mut out).unwrap();
        assert_eq!(n, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], PRODUCTION_HEADERS.join(";"));
        assert_eq!(
            lines[1],
            "2024-01-05;2;-;20;10;5;2;1;62.5;1800;1;\"chuva \"\"forte\"\"\""
        );
    }

    #[test]
    fn test_export_empty_is_error() {
        assert!(export_production_csv(&[], Vec::new()).is_err());
        assert!(export_batch_csv(&[], Vec::new()).is_err());
    }

    #[test]
    fn test_production_export_reimports() {
        let mut out = Vec::new();
        export_production_csv(&[production("")], &mut out).unwrap();
        let report = production_importer()
            .import_str(&String::from_utf8(out).unwrap())
            .unwrap();
        assert_eq!(report.imported_count(), 1);
        let rec = &report.imported[0];
        assert_eq!(rec.aviary_id.value(), 2);
        assert_eq!(rec.batch_id, NO_BATCH);
        assert_eq!(rec.floor_eggs, 1);
        assert_eq!(rec.egg_weight_avg, 62.5);
    }

    #[test]
    fn test_batch_export_has_bom_and_reimports() {
        let batch = BatchRecord {
            id: "b1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            aviary_id: AviaryId::new(4).unwrap(),
            batch_id: "L-44".to_string(),
            age_weeks: 22,
            current_birds: 0,
            weight: 1520.0,
            uniformity: 85.5,
            feathering: Feathering::Regular,
            notes: None,
            updated_at: None,
        };
        let mut out = Vec::new();
        export_batch_csv(&[batch], &mut out).unwrap();
        assert!(out.starts_with(UTF8_BOM));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2024-03-01;4;L-44;22;1520;85.5;Regular"));

        let report = batch_importer().import_str(&text).unwrap();
        assert_eq!(report.imported_count(), 1);
        assert_eq!(report.imported[0].feathering, Feathering::Regular);
        assert_eq!(report.imported[0].age_weeks, 22);
    }
}
