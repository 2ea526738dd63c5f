// ==========================================
// SIGLAB Aviário - JSONBlob 存储
// ==========================================
// 创建: POST {base}，密钥取 Location 头最后一段
// 更新: PUT {base}/{id}
// 读取: GET {base}/{id}，非 2xx 视为无数据
// ==========================================

use crate::domain::snapshot::CloudSnapshot;
use crate::domain::types::SyncProvider;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::key::SyncKey;
use crate::sync::store::CloudStore;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::Client;

pub const DEFAULT_JSONBLOB_BASE_URL: &str = "https://jsonblob.com/api/jsonBlob";

#[derive(Clone)]
pub struct JsonBlobStore {
    client: Client,
    base_url: String,
}

impl JsonBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn blob_url(&self, key: &SyncKey) -> String {
        format!("{}/{}", self.base_url, key.sanitized())
    }
}

impl Default for JsonBlobStore {
    fn default() -> Self {
        Self::new(DEFAULT_JSONBLOB_BASE_URL)
    }
}

/// 从 Location 头提取 blob id
pub fn blob_id_from_location(location: &str) -> Option<&str> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl CloudStore for JsonBlobStore {
    fn provider(&self) -> SyncProvider {
        SyncProvider::JsonBlob
    }

    async fn save(&self, key: Option<&SyncKey>, snapshot: &CloudSnapshot) -> SyncResult<SyncKey> {
        match key {
            Some(key) => {
                if !key.is_usable() {
                    return Err(SyncError::InvalidKey(key.to_string()));
                }
                let resp = self
                    .client
                    .put(self.blob_url(key))
                    .header(ACCEPT, "application/json")
                    .json(snapshot)
                    .send()
                    .await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(SyncError::HttpStatus {
                        status: status.as_u16(),
                        message: resp.text().await.unwrap_or_default(),
                    });
                }
                Ok(key.clone())
            }
            None => {
                let resp = self
                    .client
                    .post(&self.base_url)
                    .header(ACCEPT, "application/json")
                    .json(snapshot)
                    .send()
                    .await?;
                let location = resp
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(blob_id_from_location)
                    .and_then(SyncKey::parse)
                    .ok_or(SyncError::MissingLocation)?;
                tracing::info!(key = %location, "JSONBlob 已创建");
                Ok(location)
            }
        }
    }

    async fn fetch(&self, key: &SyncKey) -> SyncResult<Option<CloudSnapshot>> {
        if !key.is_usable() {
            return Ok(None);
        }
        let resp = self.client.get(self.blob_url(key)).send().await?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "JSONBlob 读取失败，视为无数据");
            return Ok(None);
        }
        let body = resp.text().await?;
        Ok(Some(serde_json::from_str(&body)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_id_from_location() {
        assert_eq!(
            blob_id_from_location("https://jsonblob.com/api/jsonBlob/1234567890"),
            Some("1234567890")
        );
        assert_eq!(blob_id_from_location("/api/jsonBlob/abc/"), Some("abc"));
        assert_eq!(blob_id_from_location(""), None);
    }

    #[tokio::test]
    async fn test_short_key_is_refused_without_request() {
        let store = JsonBlobStore::new("http://127.0.0.1:9/api/jsonBlob");
        let key = SyncKey::parse("ab").unwrap();
        assert!(store.fetch(&key).await.unwrap().is_none());
        assert!(matches!(
            store.save(Some(&key), &CloudSnapshot::default()).await,
            Err(SyncError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_blob_url_uses_sanitized_key() {
        let store = JsonBlobStore::new("http://localhost/api/jsonBlob/");
        let key = SyncKey::parse("fazenda norte").unwrap();
        assert_eq!(
            store.blob_url(&key),
            "http://localhost/api/jsonBlob/FAZENDA_NORTE"
        );
    }
}
