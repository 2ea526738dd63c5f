// ==========================================
// SIGLAB Aviário - 批次特征 API
// ==========================================
// 职责: 批次登记 / 分鸡舍列表 / 删除 / CSV 导入导出
// 规则: 任何批次变更后重新关联全部日产记录的 batch_id
// ==========================================

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::production_api::ImportSummary;
use crate::domain::batch::{BatchFormData, BatchRecord};
use crate::domain::production::ProductionRecord;
use crate::domain::types::AviaryId;
use crate::engine::batch_link::sync_production_with_batches;
use crate::i18n::{t, t_with_args};
use crate::importer::csv_importer::import_batch_csv;
use crate::importer::error::ImportError;
use crate::importer::exporter::export_batch_csv;
use crate::perf::PerfGuard;
use crate::repository::batch_repo::BatchRepository;
use crate::repository::production_repo::ProductionRepository;

/// 单个鸡舍的批次分组
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AviaryBatchGroup {
    pub aviary_id: AviaryId,
    /// 该鸡舍最新一条日产记录的存栏，无记录时为 0
    pub current_birds: u32,
    /// 日期降序
    pub records: Vec<BatchRecord>,
}

/// 按批次记录重新关联日产记录，有变化时写回
///
/// # 返回
/// - 被改写 batch_id 的日产记录数
pub(crate) fn relink_production(
    production_repo: &ProductionRepository,
    batches: &[BatchRecord],
) -> ApiResult<usize> {
    let mut records = production_repo.list_all()?;
    let changed = sync_production_with_batches(&mut records, batches);
    if changed > 0 {
        production_repo.save_all(&records)?;
        info!(changed, "日产记录批次已重新关联");
    }
    Ok(changed)
}

// ==========================================
// BatchApi - 批次特征 API
// ==========================================

/// 批次特征API
///
/// 职责：
/// 1. 批次登记与编辑
/// 2. 批次变更后的日产记录重新关联
/// 3. CSV 导入导出
pub struct BatchApi {
    batch_repo: Arc<BatchRepository>,
    production_repo: Arc<ProductionRepository>,
}

impl BatchApi {
    pub fn new(batch_repo: Arc<BatchRepository>, production_repo: Arc<ProductionRepository>) -> Self {
        Self {
            batch_repo,
            production_repo,
        }
    }

    fn persist(&self, batches: &[BatchRecord]) -> ApiResult<usize> {
        self.batch_repo.save_all(batches)?;
        relink_production(&self.production_repo, batches)
    }

    /// 保存批次记录（新增或编辑）
    ///
    /// # 参数
    /// - form: 表单数据
    /// - editing_id: Some 时更新该记录（保留 id）
    ///
    /// # 返回
    /// - Err(InvalidInput): 批次号为空
    /// - Err(NotFound): editing_id 不存在
    pub fn save_batch(&self, form: BatchFormData, editing_id: Option<&str>) -> ApiResult<BatchRecord> {
        if form.batch_id.trim().is_empty() {
            return Err(ApiError::InvalidInput(t("batch.missing_batch_id")));
        }

        let mut batches = self.batch_repo.list_all()?;
        let mut record = BatchRecord::from_form(form, Utc::now());

        match editing_id {
            Some(id) => {
                let slot = batches.iter_mut().find(|b| b.id == id).ok_or_else(|| {
                    ApiError::NotFound(t_with_args("batch.not_found", &[("id", id)]))
                })?;
                record.id = slot.id.clone();
                record.current_birds = slot.current_birds;
                *slot = record.clone();
            }
            None => batches.insert(0, record.clone()),
        }

        let relinked = self.persist(&batches)?;
        info!(
            id = %record.id,
            batch = %record.batch_id,
            aviary = %record.aviary_id,
            relinked,
            "批次记录已保存"
        );
        Ok(record)
    }

    pub fn list_batches(&self) -> ApiResult<Vec<BatchRecord>> {
        Ok(self.batch_repo.list_all()?)
    }

    /// 按鸡舍分组（1..=4）
    pub fn list_grouped(&self) -> ApiResult<Vec<AviaryBatchGroup>> {
        let batches = self.batch_repo.list_all()?;
        let production = self.production_repo.list_all()?;

        let groups = AviaryId::ALL
            .iter()
            .map(|&aviary| {
                let mut records: Vec<BatchRecord> = batches
                    .iter()
                    .filter(|b| b.aviary_id == aviary)
                    .cloned()
                    .collect();
                records.sort_by(|a, b| b.date.cmp(&a.date));

                let current_birds = production
                    .iter()
                    .filter(|r| r.aviary_id == aviary)
                    // 同日多条时取存储顺序中的第一条（最新录入）
                    .fold(None, |best: Option<&ProductionRecord>, r| match best {
                        Some(cur) if cur.date >= r.date => Some(cur),
                        _ => Some(r),
                    })
                    .map(|r| r.live_birds)
                    .unwrap_or(0);

                AviaryBatchGroup {
                    aviary_id: aviary,
                    current_birds,
                    records,
                }
            })
            .collect();
        Ok(groups)
    }

    pub fn delete_batch(&self, id: &str) -> ApiResult<()> {
        let mut batches = self.batch_repo.list_all()?;
        let before = batches.len();
        batches.retain(|b| b.id != id);
        if batches.len() == before {
            return Err(ApiError::NotFound(t_with_args("batch.not_found", &[("id", id)])));
        }
        let relinked = self.persist(&batches)?;
        info!(id = %id, relinked, "批次记录已删除");
        Ok(())
    }

    /// 清空批次记录，日产记录随之解除关联
    pub fn clear_batches(&self) -> ApiResult<()> {
        self.batch_repo.clear()?;
        let relinked = relink_production(&self.production_repo, &[])?;
        info!(relinked, "批次记录已清空");
        Ok(())
    }

    // ==========================================
    // CSV 导入导出
    // ==========================================

    /// 导入批次 CSV
    ///
    /// # 返回
    /// - Err(InvalidInput): 文件中没有任何有效行
    pub fn import_csv(&self, path: &Path) -> ApiResult<ImportSummary> {
        let _perf = PerfGuard::new("batch_import_csv");

        let report = match import_batch_csv(path) {
            Ok(report) => report,
            Err(ImportError::EmptyFile) => {
                return Err(ApiError::InvalidInput(t("import.no_valid_batch_rows")))
            }
            Err(e) => return Err(e.into()),
        };
        if report.imported_count() == 0 {
            return Err(ApiError::InvalidInput(t("import.no_valid_batch_rows")));
        }

        let existing = self.batch_repo.list_all()?;
        let mut merged = Vec::with_capacity(report.imported_count() + existing.len());
        merged.extend(report.imported.iter().cloned());
        merged.extend(existing);
        let relinked = self.persist(&merged)?;

        info!(
            path = %path.display(),
            imported = report.imported_count(),
            skipped = report.skipped_count(),
            relinked,
            "批次 CSV 导入完成"
        );
        let message = t_with_args(
            "import.batch_success",
            &[("count", &report.imported_count().to_string())],
        );
        Ok(ImportSummary::from_report(&report, message))
    }

    /// 导出全部批次记录（存储顺序）
    pub fn export_csv<W: Write>(&self, out: W) -> ApiResult<usize> {
        let batches = self.batch_repo.list_all()?;
        if batches.is_empty() {
            return Err(ApiError::InvalidInput(t("common.no_data")));
        }
        Ok(export_batch_csv(&batches, out)?)
    }
}
