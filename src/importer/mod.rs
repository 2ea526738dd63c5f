// ==========================================
// SIGLAB Aviário - 导入导出层
// ==========================================
// 职责: CSV 文件 ↔ 日产记录 / 批次记录
// 管道: CsvParser → DataCleaner → FieldMapper → ImportReport
// ==========================================

pub mod csv_importer;
pub mod data_cleaner;
pub mod error;
pub mod exporter;
pub mod field_mapper;
pub mod file_parser;
pub mod import_trait;

// 重导出核心类型
pub use csv_importer::{
    batch_importer, import_batch_csv, import_production_csv, production_importer, CsvImporter,
    ImportReport, SkippedRow,
};
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use exporter::{export_batch_csv, export_production_csv};
pub use field_mapper::{BatchFieldMapper, ProductionFieldMapper};
pub use file_parser::{CsvParser, DelimiterMode};

// 重导出 Trait 接口
pub use import_trait::{DataCleaner, FieldMapper, FileParser, RawRow};
