// ==========================================
// SIGLAB Aviário - 日产记录 API
// ==========================================
// 职责: 日产表单保存 / 列表筛选 / 删除 / CSV 导入导出
// 规则: 保存前必须存在该鸡舍在该日期之前登记的批次
// ==========================================

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::production::{ProductionFormData, ProductionRecord};
use crate::engine::batch_link::find_active_batch;
use crate::engine::filter::{RecordFilter, SortOrder};
use crate::engine::metrics::{compute_form_metrics, effective_egg_counts};
use crate::i18n::{t, t_with_args};
use crate::importer::csv_importer::{import_production_csv, ImportReport, SkippedRow};
use crate::importer::error::ImportError;
use crate::importer::exporter::export_production_csv;
use crate::perf::PerfGuard;
use crate::repository::batch_repo::BatchRepository;
use crate::repository::production_repo::ProductionRepository;

// ==========================================
// ImportSummary - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
    pub message: String,
}

impl ImportSummary {
    pub(crate) fn from_report<T>(report: &ImportReport<T>, message: String) -> Self {
        Self {
            imported: report.imported_count(),
            skipped: report.skipped.clone(),
            message,
        }
    }
}

// ==========================================
// ProductionApi - 日产记录 API
// ==========================================

/// 日产记录API
///
/// 职责：
/// 1. 表单校验与派生指标计算
/// 2. 批次关联（无批次时阻止保存）
/// 3. 列表筛选与排序
/// 4. CSV 导入导出
pub struct ProductionApi {
    production_repo: Arc<ProductionRepository>,
    batch_repo: Arc<BatchRepository>,
}

impl ProductionApi {
    pub fn new(production_repo: Arc<ProductionRepository>, batch_repo: Arc<BatchRepository>) -> Self {
        Self {
            production_repo,
            batch_repo,
        }
    }

    /// 保存日产记录（新增或编辑）
    ///
    /// # 参数
    /// - form: 表单数据
    /// - editing_id: Some 时更新该记录，保留 id 与 createdAt
    ///
    /// # 返回
    /// - Ok(ProductionRecord): 保存后的记录
    /// - Err(InvalidInput): 蛋数与存栏均为 0
    /// - Err(BatchNotRegistered): 该鸡舍在此日期之前没有批次
    /// - Err(NotFound): editing_id 不存在
    pub fn save_record(
        &self,
        form: ProductionFormData,
        editing_id: Option<&str>,
    ) -> ApiResult<ProductionRecord> {
        // 没有地面蛋的鸡舍，地面蛋数归零
        let counts = effective_egg_counts(form.aviary_id, form.egg_counts());
        if counts.total() == 0 && form.live_birds == 0 {
            return Err(ApiError::InvalidInput(t("production.empty_form")));
        }

        let batches = self.batch_repo.list_all()?;
        let batch_id = find_active_batch(&batches, form.aviary_id, form.date)
            .map(|b| b.batch_id.clone())
            .ok_or_else(|| {
                ApiError::BatchNotRegistered(t_with_args(
                    "production.batch_missing",
                    &[
                        ("aviary", &form.aviary_id.to_string()),
                        ("date", &form.date.to_string()),
                    ],
                ))
            })?;

        let metrics = compute_form_metrics(counts, form.live_birds);
        let now = Utc::now();
        let mut records = self.production_repo.list_all()?;

        // 编辑时保留 id / createdAt 与原位置
        let position = match editing_id {
            Some(id) => Some(records.iter().position(|r| r.id == id).ok_or_else(|| {
                ApiError::NotFound(t_with_args("production.not_found", &[("id", id)]))
            })?),
            None => None,
        };
        let (id, created_at) = match position {
            Some(i) => (records[i].id.clone(), records[i].created_at),
            None => (uuid::Uuid::new_v4().to_string(), now),
        };

        let saved = ProductionRecord {
            id,
            date: form.date,
            aviary_id: form.aviary_id,
            batch_id,
            live_birds: form.live_birds,
            clean_eggs: counts.clean,
            dirty_eggs: counts.dirty,
            cracked_eggs: counts.cracked,
            floor_eggs: counts.floor,
            egg_weight_avg: form.egg_weight_avg,
            bird_weight_avg: form.bird_weight_avg,
            mortality: form.mortality,
            notes: form.notes,
            created_at,
            updated_at: Some(now),
            metrics,
        };
        match position {
            Some(i) => records[i] = saved.clone(),
            None => records.insert(0, saved.clone()),
        }

        self.production_repo.save_all(&records)?;
        info!(
            record_id = %saved.id,
            aviary = %saved.aviary_id,
            date = %saved.date,
            batch = %saved.batch_id,
            edited = editing_id.is_some(),
            "日产记录已保存"
        );
        Ok(saved)
    }

    /// 按条件筛选日产记录
    pub fn list_records(
        &self,
        filter: &RecordFilter,
        today: NaiveDate,
        order: SortOrder,
    ) -> ApiResult<Vec<ProductionRecord>> {
        let records = self.production_repo.list_all()?;
        let result = filter.apply(&records, today, order);
        debug!(total = records.len(), matched = result.len(), "筛选日产记录");
        Ok(result)
    }

    pub fn get_record(&self, id: &str) -> ApiResult<ProductionRecord> {
        Ok(self.production_repo.find_by_id(id)?)
    }

    /// 删除单条日产记录
    pub fn delete_record(&self, id: &str) -> ApiResult<()> {
        let mut records = self.production_repo.list_all()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(ApiError::NotFound(t_with_args(
                "production.not_found",
                &[("id", id)],
            )));
        }
        self.production_repo.save_all(&records)?;
        info!(record_id = %id, "日产记录已删除");
        Ok(())
    }

    /// 清空全部日产记录
    pub fn clear_records(&self) -> ApiResult<()> {
        self.production_repo.clear()?;
        info!("日产记录已清空");
        Ok(())
    }

    // ==========================================
    // CSV 导入导出
    // ==========================================

    /// 导入日产 CSV
    ///
    /// 有效行插入到现有记录之前；保留文件中的批次号
    pub fn import_csv(&self, path: &Path) -> ApiResult<ImportSummary> {
        let _perf = PerfGuard::new("production_import_csv");

        let report = match import_production_csv(path) {
            Ok(report) => report,
            Err(ImportError::EmptyFile) => ImportReport {
                imported: Vec::new(),
                skipped: Vec::new(),
            },
            Err(e) => return Err(e.into()),
        };

        if report.imported_count() > 0 {
            let existing = self.production_repo.list_all()?;
            let mut merged = Vec::with_capacity(report.imported_count() + existing.len());
            merged.extend(report.imported.iter().cloned());
            merged.extend(existing);
            self.production_repo.save_all(&merged)?;
        }

        let message = t_with_args(
            "import.production_success",
            &[("count", &report.imported_count().to_string())],
        );
        info!(
            path = %path.display(),
            imported = report.imported_count(),
            skipped = report.skipped_count(),
            "日产 CSV 导入完成"
        );
        Ok(ImportSummary::from_report(&report, message))
    }

    /// 导出筛选后的日产记录（列表顺序：日期降序）
    ///
    /// # 返回
    /// - Ok(usize): 导出的行数
    /// - Err(InvalidInput): 没有匹配的记录
    pub fn export_csv<W: Write>(
        &self,
        filter: &RecordFilter,
        today: NaiveDate,
        out: W,
    ) -> ApiResult<usize> {
        let records = self.list_records(filter, today, SortOrder::NewestFirst)?;
        if records.is_empty() {
            return Err(ApiError::InvalidInput(t("common.no_data")));
        }
        let written = export_production_csv(&records, out)?;
        info!(rows = written, "日产 CSV 已导出");
        Ok(written)
    }
}
