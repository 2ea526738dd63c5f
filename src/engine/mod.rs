// ==========================================
// SIGLAB Aviário - 引擎层
// ==========================================
// 职责: 纯计算逻辑（指标 / 批次关联 / 筛选 / 看板聚合 / 图表）
// 约束: 不访问存储与网络
// ==========================================

pub mod batch_link;
pub mod chart;
pub mod dashboard;
pub mod filter;
pub mod metrics;

pub use batch_link::{find_active_batch, resolve_batch_id, sync_production_with_batches, NO_BATCH};
pub use dashboard::{
    aviary_stats, general_stats, maturity_curves, monthly_production, AviaryStats, GeneralStats,
    MaturityCurve, MaturityPoint, MonthlyBucket, QualityBreakdown,
};
pub use filter::{
    batch_options, fortnight_options, year_options, Fortnight, FortnightOption, PeriodFilter,
    RecordFilter, SortOrder,
};
pub use metrics::{compute_form_metrics, compute_import_metrics, compute_metrics};
