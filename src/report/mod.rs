// ==========================================
// SIGLAB Aviário - 快报层
// ==========================================
// 职责: 由筛选后的日产数据构建提示词并调用文本生成服务
// ==========================================

pub mod error;
pub mod generator;
pub mod prompt;

pub use error::{ReportError, ReportResult};
pub use generator::{GeminiClient, TextGenerator, DEFAULT_REPORT_MODEL};
pub use prompt::{build_prompt, build_report_rows, ReportRow};
