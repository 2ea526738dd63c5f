// ==========================================
// SIGLAB Aviário - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行调用
// ==========================================

pub mod batch_api;
pub mod config_api;
pub mod dashboard_api;
pub mod error;
pub mod production_api;
pub mod report_api;
pub mod sync_api;

// 重导出核心类型
pub use batch_api::{AviaryBatchGroup, BatchApi};
pub use config_api::ConfigApi;
pub use dashboard_api::{ChartKind, DashboardApi, FilterOptions};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use production_api::{ImportSummary, ProductionApi};
pub use report_api::ReportApi;
pub use sync_api::{PullOutcome, PushOutcome, SyncApi, SyncStatusView};
