// ==========================================
// SIGLAB Aviário - 云同步 API
// ==========================================
// 职责: 同步密钥管理 / 推送快照 / 拉取并合并 / 状态查询
// 存储: 密钥保存在 local_storage[siglab_sync_key]
// ==========================================

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::api::batch_api::relink_production;
use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::domain::snapshot::CloudSnapshot;
use crate::domain::types::{MergeStrategy, SyncProvider, SyncStatus};
use crate::i18n::{t, t_with_args};
use crate::repository::batch_repo::BatchRepository;
use crate::repository::local_store::{LocalStore, SYNC_KEY};
use crate::repository::production_repo::ProductionRepository;
use crate::sync::key::SyncKey;
use crate::sync::merge::merge_snapshot;
use crate::sync::service::SyncService;

/// 推送结果
#[derive(Debug, Clone, Serialize)]
pub struct PushOutcome {
    /// false 表示防抖期间被更新的推送取代
    pub pushed: bool,
    pub key: Option<SyncKey>,
    pub message: String,
}

/// 拉取结果
#[derive(Debug, Clone, Serialize)]
pub struct PullOutcome {
    /// false 表示远端没有该密钥的数据，本地未改动
    pub applied: bool,
    pub strategy: MergeStrategy,
    pub records: usize,
    pub batches: usize,
    pub relinked: usize,
    pub message: String,
}

/// 同步状态视图
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusView {
    pub provider: SyncProvider,
    pub status: SyncStatus,
    pub key: Option<SyncKey>,
    pub last_error: Option<String>,
}

// ==========================================
// SyncApi - 云同步 API
// ==========================================

/// 云同步API
///
/// 职责：
/// 1. 同步密钥的规范化、生成与保存
/// 2. 整体快照推送（立即或防抖）
/// 3. 拉取快照，按配置策略合并后重新关联批次
pub struct SyncApi {
    service: SyncService,
    local_store: LocalStore,
    production_repo: Arc<ProductionRepository>,
    batch_repo: Arc<BatchRepository>,
    config_manager: Arc<ConfigManager>,
}

impl SyncApi {
    pub fn new(
        service: SyncService,
        local_store: LocalStore,
        production_repo: Arc<ProductionRepository>,
        batch_repo: Arc<BatchRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            service,
            local_store,
            production_repo,
            batch_repo,
            config_manager,
        }
    }

    // ==========================================
    // 密钥管理
    // ==========================================

    pub fn get_key(&self) -> ApiResult<Option<SyncKey>> {
        Ok(self
            .local_store
            .get_item(SYNC_KEY)?
            .and_then(|raw| SyncKey::parse(&raw)))
    }

    /// 保存用户输入的密钥（去空白、转大写）
    ///
    /// # 返回
    /// - Err(InvalidInput): 输入为空
    pub fn set_key(&self, raw: &str) -> ApiResult<SyncKey> {
        let key = SyncKey::parse(raw).ok_or_else(|| ApiError::InvalidInput(t("sync.empty_key")))?;
        self.local_store.set_item(SYNC_KEY, key.as_str())?;
        info!(key = %key, "同步密钥已保存");
        Ok(key)
    }

    /// 生成随机 8 位密钥并保存
    pub fn generate_key(&self) -> ApiResult<SyncKey> {
        let key = SyncKey::generate();
        self.local_store.set_item(SYNC_KEY, key.as_str())?;
        info!(key = %key, "已生成同步密钥");
        Ok(key)
    }

    pub fn clear_key(&self) -> ApiResult<bool> {
        Ok(self.local_store.remove_item(SYNC_KEY)?)
    }

    // ==========================================
    // 推送 / 拉取
    // ==========================================

    fn snapshot(&self) -> ApiResult<CloudSnapshot> {
        Ok(CloudSnapshot::new(
            self.production_repo.list_all()?,
            self.batch_repo.list_all()?,
        ))
    }

    /// 推送本地全部数据
    ///
    /// # 参数
    /// - debounced: true 时等待防抖间隔，期间的新请求会取代本次
    ///
    /// 未配置密钥时由服务端分配（local / jsonblob），分配的密钥会被保存
    pub async fn push(&self, debounced: bool) -> ApiResult<PushOutcome> {
        let key = self.get_key()?;
        let snapshot = self.snapshot()?;

        let pushed_key = if debounced {
            self.service.push_debounced(key.clone(), snapshot).await?
        } else {
            Some(self.service.push_now(key.as_ref(), &snapshot).await?)
        };

        let Some(pushed_key) = pushed_key else {
            return Ok(PushOutcome {
                pushed: false,
                key,
                message: t("sync.superseded"),
            });
        };

        if key.as_ref() != Some(&pushed_key) {
            self.local_store.set_item(SYNC_KEY, pushed_key.as_str())?;
        }
        info!(provider = %self.service.provider(), key = %pushed_key, "快照已推送");
        Ok(PushOutcome {
            pushed: true,
            message: t_with_args("sync.pushed", &[("key", pushed_key.as_str())]),
            key: Some(pushed_key),
        })
    }

    /// 拉取远端快照并合并到本地
    ///
    /// # 返回
    /// - Err(InvalidInput): 未配置密钥或密钥过短
    pub async fn pull(&self) -> ApiResult<PullOutcome> {
        let key = self
            .get_key()?
            .ok_or_else(|| ApiError::InvalidInput(t("sync.no_key")))?;
        let strategy = self.config_manager.merge_strategy()?;

        let Some(remote) = self.service.pull(&key).await? else {
            return Ok(PullOutcome {
                applied: false,
                strategy,
                records: 0,
                batches: 0,
                relinked: 0,
                message: t("sync.remote_empty"),
            });
        };

        let local_records = self.production_repo.list_all()?;
        let local_batches = self.batch_repo.list_all()?;
        let merged = merge_snapshot(&local_records, &local_batches, &remote, strategy);

        self.batch_repo.save_all(&merged.batch_records)?;
        self.production_repo.save_all(&merged.records)?;
        let relinked = relink_production(&self.production_repo, &merged.batch_records)?;

        let records = merged.records.len();
        let batches = merged.batch_records.len();
        info!(key = %key, ?strategy, records, batches, relinked, "远端快照已合并");
        Ok(PullOutcome {
            applied: true,
            strategy,
            records,
            batches,
            relinked,
            message: t_with_args(
                "sync.pulled",
                &[("records", &records.to_string()), ("batches", &batches.to_string())],
            ),
        })
    }

    pub fn status(&self) -> ApiResult<SyncStatusView> {
        Ok(SyncStatusView {
            provider: self.service.provider(),
            status: self.service.status(),
            key: self.get_key()?,
            last_error: self.service.last_error(),
        })
    }
}
