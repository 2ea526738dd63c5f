// ==========================================
// SIGLAB Aviário - 看板 API
// ==========================================
// 职责: 基于筛选后的日产记录提供 KPI、分鸡舍统计、图表
// 排序: 看板统一按日期升序
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::production::ProductionRecord;
use crate::domain::types::AviaryId;
use crate::engine::chart::{render_laying_rate_bar_chart, render_maturity_chart, render_monthly_line_chart};
use crate::engine::dashboard::{
    aviary_stats, general_stats, maturity_curves, monthly_production, AviaryStats, GeneralStats,
    MaturityCurve, MonthlyBucket,
};
use crate::engine::filter::{
    batch_options, fortnight_options, year_options, FortnightOption, RecordFilter, SortOrder,
};
use crate::perf::PerfGuard;
use crate::repository::batch_repo::BatchRepository;
use crate::repository::production_repo::ProductionRepository;

/// 筛选下拉选项
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub batches: Vec<String>,
    pub fortnights: Vec<FortnightOption>,
}

/// 图表类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// 月度产量折线（None 为合计）
    Monthly(Option<AviaryId>),
    /// 分鸡舍产蛋率柱状
    LayingRate,
    /// 周龄产蛋曲线
    Maturity,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================

/// 看板API
///
/// 职责：
/// 1. 总体 KPI 与分鸡舍统计
/// 2. 月度产量与周龄曲线
/// 3. SVG 图表渲染
pub struct DashboardApi {
    production_repo: Arc<ProductionRepository>,
    batch_repo: Arc<BatchRepository>,
}

impl DashboardApi {
    pub fn new(production_repo: Arc<ProductionRepository>, batch_repo: Arc<BatchRepository>) -> Self {
        Self {
            production_repo,
            batch_repo,
        }
    }

    fn filtered(&self, filter: &RecordFilter, today: NaiveDate) -> ApiResult<Vec<ProductionRecord>> {
        let records = self.production_repo.list_all()?;
        Ok(filter.apply(&records, today, SortOrder::OldestFirst))
    }

    /// 总体 KPI
    ///
    /// # 返回
    /// - Ok(None): 没有匹配的记录
    pub fn general(&self, filter: &RecordFilter, today: NaiveDate) -> ApiResult<Option<GeneralStats>> {
        let _perf = PerfGuard::new("dashboard_general");
        let records = self.filtered(filter, today)?;
        Ok(general_stats(&records))
    }

    pub fn aviaries(&self, filter: &RecordFilter, today: NaiveDate) -> ApiResult<Vec<AviaryStats>> {
        let _perf = PerfGuard::new("dashboard_aviaries");
        let records = self.filtered(filter, today)?;
        Ok(aviary_stats(&records))
    }

    pub fn monthly(&self, filter: &RecordFilter, today: NaiveDate) -> ApiResult<Vec<MonthlyBucket>> {
        let records = self.filtered(filter, today)?;
        Ok(monthly_production(&records))
    }

    pub fn maturity(&self, filter: &RecordFilter, today: NaiveDate) -> ApiResult<Vec<MaturityCurve>> {
        let records = self.filtered(filter, today)?;
        let batches = self.batch_repo.list_all()?;
        Ok(maturity_curves(&records, &batches))
    }

    /// 下拉选项（基于全部记录，不受筛选影响）
    pub fn options(&self) -> ApiResult<FilterOptions> {
        let records = self.production_repo.list_all()?;
        Ok(FilterOptions {
            years: year_options(&records),
            batches: batch_options(&records),
            fortnights: fortnight_options(&records),
        })
    }

    /// 渲染 SVG 图表
    pub fn chart(&self, kind: ChartKind, filter: &RecordFilter, today: NaiveDate) -> ApiResult<String> {
        let _perf = PerfGuard::new("dashboard_chart");
        let svg = match kind {
            ChartKind::Monthly(aviary) => {
                render_monthly_line_chart(&self.monthly(filter, today)?, aviary)
            }
            ChartKind::LayingRate => render_laying_rate_bar_chart(&self.aviaries(filter, today)?),
            ChartKind::Maturity => render_maturity_chart(&self.maturity(filter, today)?),
        };
        svg.map_err(|e| ApiError::InternalError(format!("图表渲染失败: {}", e)))
    }
}
