// ==========================================
// SIGLAB Aviário - CSV 导入编排
// ==========================================
// 流程: 读取文件 → 解析行 → 逐行映射 → 汇总报告
// 说明: 坏行跳过并记录原因，不阻断整批导入
// ==========================================

use crate::domain::batch::BatchRecord;
use crate::domain::production::ProductionRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{BatchFieldMapper, ProductionFieldMapper};
use crate::importer::file_parser::CsvParser;
use crate::importer::import_trait::{FieldMapper, FileParser};
use serde::Serialize;
use std::path::Path;

/// 被跳过的行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

/// 导入报告
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport<T> {
    pub imported: Vec<T>,
    pub skipped: Vec<SkippedRow>,
}

impl<T> ImportReport<T> {
    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

// ==========================================
// CsvImporter
// ==========================================
pub struct CsvImporter<P: FileParser, M: FieldMapper> {
    parser: P,
    mapper: M,
}

impl<P: FileParser, M: FieldMapper> CsvImporter<P, M> {
    pub fn new(parser: P, mapper: M) -> Self {
        Self { parser, mapper }
    }

    /// 从文本导入
    pub fn import_str(&self, content: &str) -> ImportResult<ImportReport<M::Output>> {
        let rows = self.parser.parse_rows(content)?;

        let mut report = ImportReport {
            imported: Vec::with_capacity(rows.len()),
            skipped: Vec::new(),
        };
        for row in &rows {
            match self.mapper.map_row(row) {
                Ok(record) => report.imported.push(record),
                Err(reason) => {
                    tracing::debug!(line = row.line_number, %reason, "跳过 CSV 行");
                    report.skipped.push(SkippedRow {
                        line: row.line_number,
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            imported = report.imported_count(),
            skipped = report.skipped_count(),
            "CSV 导入解析完成"
        );
        Ok(report)
    }

    /// 从文件导入
    ///
    /// # 参数
    /// - file_path: .csv / .txt 文件路径
    ///
    /// # 返回
    /// - Err(FileNotFound / UnsupportedFormat / FileReadError): 文件级错误
    pub fn import_file(&self, file_path: &Path) -> ImportResult<ImportReport<M::Output>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        if let Some(ext) = file_path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if ext != "csv" && ext != "txt" {
                return Err(ImportError::UnsupportedFormat(ext));
            }
        }

        // 表格软件导出的文件不一定是 UTF-8
        let bytes = std::fs::read(file_path)?;
        let content = String::from_utf8_lossy(&bytes);
        self.import_str(&content)
    }
}

/// 日产记录导入器
pub fn production_importer() -> CsvImporter<CsvParser, ProductionFieldMapper> {
    CsvImporter::new(CsvParser::per_line(), ProductionFieldMapper::new())
}

/// 批次记录导入器
pub fn batch_importer() -> CsvImporter<CsvParser, BatchFieldMapper> {
    CsvImporter::new(CsvParser::from_header(), BatchFieldMapper::new())
}

/// 导入日产记录 CSV 文件
pub fn import_production_csv(file_path: &Path) -> ImportResult<ImportReport<ProductionRecord>> {
    production_importer().import_file(file_path)
}

/// 导入批次记录 CSV 文件
pub fn import_batch_csv(file_path: &Path) -> ImportResult<ImportReport<BatchRecord>> {
    batch_importer().import_file(file_path)
}
