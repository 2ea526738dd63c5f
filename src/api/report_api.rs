// ==========================================
// SIGLAB Aviário - 快速报告 API
// ==========================================
// 职责: 将筛选后的日产数据整理为提示词，调用文本生成服务
// 失败处理: 未配置 Key、配额用尽或调用失败时返回固定提示文本
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::engine::filter::{RecordFilter, SortOrder};
use crate::i18n::t;
use crate::report::error::ReportError;
use crate::report::generator::TextGenerator;
use crate::report::prompt::{build_prompt, build_report_rows};
use crate::repository::production_repo::ProductionRepository;

/// 快速报告API
///
/// 职责：
/// 1. 按筛选条件整理报告数据
/// 2. 调用文本生成服务
pub struct ReportApi {
    production_repo: Arc<ProductionRepository>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ReportApi {
    /// # 参数
    /// - generator: None 表示未配置 API Key
    pub fn new(
        production_repo: Arc<ProductionRepository>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            production_repo,
            generator,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// 生成快速报告
    ///
    /// # 返回
    /// - Ok(String): 报告正文，或固定的配置/失败提示
    /// - Err(InvalidInput): 筛选结果为空
    pub async fn generate(&self, filter: &RecordFilter, today: NaiveDate) -> ApiResult<String> {
        let records = self.production_repo.list_all()?;
        let filtered = filter.apply(&records, today, SortOrder::NewestFirst);
        if filtered.is_empty() {
            return Err(ApiError::InvalidInput(t("report.no_data")));
        }

        let Some(generator) = self.generator.as_ref() else {
            return Ok(t("report.api_missing"));
        };

        let rows = build_report_rows(&filtered);
        let prompt = build_prompt(&rows, filter)
            .map_err(|e| ApiError::InternalError(format!("报告提示词生成失败: {}", e)))?;

        match generator.generate(&prompt).await {
            Ok(text) => {
                info!(rows = rows.len(), chars = text.chars().count(), "快速报告已生成");
                Ok(text)
            }
            Err(ReportError::QuotaExceeded) => {
                warn!("快速报告生成失败: 配额已用尽");
                Ok(t("report.quota"))
            }
            Err(e) => {
                warn!(error = %e, "快速报告生成失败");
                Ok(t("report.failed"))
            }
        }
    }
}
