// ==========================================
// SIGLAB Aviário - KVDB 公共 bucket 存储
// ==========================================
// URL: {base_url}/{bucket_id}/{KEY 规范化}
// 写: POST 完整快照；读: GET，404 视为无数据
// ==========================================

use crate::domain::snapshot::CloudSnapshot;
use crate::domain::types::SyncProvider;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::key::SyncKey;
use crate::sync::store::CloudStore;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

pub const DEFAULT_KVDB_BASE_URL: &str = "https://kvdb.io";
pub const DEFAULT_BUCKET_ID: &str = "siglab_aviario_v1_sync";

#[derive(Clone)]
pub struct KvdbStore {
    client: Client,
    base_url: String,
    bucket_id: String,
}

impl KvdbStore {
    pub fn new(base_url: impl Into<String>, bucket_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket_id: bucket_id.into(),
        }
    }

    pub fn url_for(&self, key: &SyncKey) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket_id, key.sanitized())
    }
}

impl Default for KvdbStore {
    fn default() -> Self {
        Self::new(DEFAULT_KVDB_BASE_URL, DEFAULT_BUCKET_ID)
    }
}

#[async_trait]
impl CloudStore for KvdbStore {
    fn provider(&self) -> SyncProvider {
        SyncProvider::Kvdb
    }

    async fn save(&self, key: Option<&SyncKey>, snapshot: &CloudSnapshot) -> SyncResult<SyncKey> {
        let key = key.ok_or(SyncError::MissingKey)?;
        if !key.is_usable() {
            return Err(SyncError::InvalidKey(key.to_string()));
        }

        let url = self.url_for(key);
        tracing::info!(url = %url, records = snapshot.records.len(), "上传快照到 KVDB");

        let resp = self.client.post(&url).json(snapshot).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SyncError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }
        Ok(key.clone())
    }

    async fn fetch(&self, key: &SyncKey) -> SyncResult<Option<CloudSnapshot>> {
        if !key.is_usable() {
            return Ok(None);
        }

        let url = self.url_for(key);
        tracing::info!(url = %url, "从 KVDB 拉取快照");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            // 该密钥尚未写入过数据
            return Ok(None);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SyncError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        Ok(Some(serde_json::from_str(&body)?))
    }
}
