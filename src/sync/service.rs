// ==========================================
// SIGLAB Aviário - 同步服务
// ==========================================
// 职责: 推送/拉取快照 + 同步状态 + 防抖推送
// 防抖: 每次请求递增代数，等待结束时代数已变化则放弃本次推送
// 不重试、不取消已发出的请求
// ==========================================

use crate::domain::snapshot::CloudSnapshot;
use crate::domain::types::{SyncProvider, SyncStatus};
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::key::SyncKey;
use crate::sync::store::CloudStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// 默认防抖时长
pub const DEFAULT_DEBOUNCE_MS: u64 = 2_000;

#[derive(Debug, Default)]
struct SyncState {
    status: SyncStatus,
    last_error: Option<String>,
}

#[derive(Clone)]
pub struct SyncService {
    store: Arc<dyn CloudStore>,
    state: Arc<RwLock<SyncState>>,
    generation: Arc<AtomicU64>,
    debounce: Duration,
}

impl SyncService {
    pub fn new(store: Arc<dyn CloudStore>, debounce: Duration) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(SyncState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    pub fn provider(&self) -> SyncProvider {
        self.store.provider()
    }

    pub fn status(&self) -> SyncStatus {
        self.state
            .read()
            .map(|s| s.status)
            .unwrap_or(SyncStatus::Error)
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().ok().and_then(|s| s.last_error.clone())
    }

    fn set_status(&self, status: SyncStatus, error: Option<String>) {
        if let Ok(mut state) = self.state.write() {
            state.status = status;
            state.last_error = error;
        }
    }

    fn finish<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        match &result {
            Ok(_) => self.set_status(SyncStatus::Success, None),
            Err(e) => {
                tracing::warn!(provider = %self.provider(), error = %e, "同步失败");
                self.set_status(SyncStatus::Error, Some(e.to_string()));
            }
        }
        result
    }

    /// 立即推送快照
    pub async fn push_now(
        &self,
        key: Option<&SyncKey>,
        snapshot: &CloudSnapshot,
    ) -> SyncResult<SyncKey> {
        self.set_status(SyncStatus::Syncing, None);
        let result = self.store.save(key, snapshot).await;
        self.finish(result)
    }

    /// 防抖推送
    ///
    /// # 返回
    /// - Ok(None): 等待期间出现更新的推送请求，本次已放弃
    /// - Ok(Some(key)): 已推送
    pub async fn push_debounced(
        &self,
        key: Option<SyncKey>,
        snapshot: CloudSnapshot,
    ) -> SyncResult<Option<SyncKey>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, "防抖推送被更新的请求取代");
            return Ok(None);
        }
        self.push_now(key.as_ref(), &snapshot).await.map(Some)
    }

    /// 拉取快照
    pub async fn pull(&self, key: &SyncKey) -> SyncResult<Option<CloudSnapshot>> {
        if !key.is_usable() {
            let err = SyncError::InvalidKey(key.to_string());
            self.set_status(SyncStatus::Error, Some(err.to_string()));
            return Err(err);
        }
        self.set_status(SyncStatus::Syncing, None);
        let result = self.store.fetch(key).await;
        self.finish(result)
    }
}
