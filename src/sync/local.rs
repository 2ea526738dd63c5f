// ==========================================
// SIGLAB Aviário - 本地镜像存储
// ==========================================
// 不访问网络，快照写入 local_storage[siglab_cloud_<KEY>]
// 用于离线使用与测试
// ==========================================

use crate::domain::snapshot::CloudSnapshot;
use crate::domain::types::SyncProvider;
use crate::repository::local_store::LocalStore;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::key::SyncKey;
use crate::sync::store::CloudStore;
use async_trait::async_trait;

const MIRROR_KEY_PREFIX: &str = "siglab_cloud_";

pub struct LocalMirrorStore {
    store: LocalStore,
}

impl LocalMirrorStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    fn storage_key(key: &SyncKey) -> String {
        format!("{}{}", MIRROR_KEY_PREFIX, key.sanitized())
    }
}

#[async_trait]
impl CloudStore for LocalMirrorStore {
    fn provider(&self) -> SyncProvider {
        SyncProvider::Local
    }

    async fn save(&self, key: Option<&SyncKey>, snapshot: &CloudSnapshot) -> SyncResult<SyncKey> {
        let key = key.cloned().unwrap_or_else(SyncKey::generate);
        if !key.is_usable() {
            return Err(SyncError::InvalidKey(key.to_string()));
        }
        self.store.set_json(&Self::storage_key(&key), snapshot)?;
        Ok(key)
    }

    async fn fetch(&self, key: &SyncKey) -> SyncResult<Option<CloudSnapshot>> {
        if !key.is_usable() {
            return Ok(None);
        }
        Ok(self.store.get_json(&Self::storage_key(key))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_fetch_roundtrip() {
        let store = LocalMirrorStore::new(LocalStore::new(":memory:").unwrap());
        let key = SyncKey::parse("granja-1").unwrap();
        assert!(store.fetch(&key).await.unwrap().is_none());

        let snapshot = CloudSnapshot::new(vec![], vec![]);
        let used = store.save(Some(&key), &snapshot).await.unwrap();
        assert_eq!(used, key);

        let fetched = store.fetch(&key).await.unwrap().unwrap();
        assert_eq!(fetched.device.as_deref(), Some("Desktop"));
    }

    #[tokio::test]
    async fn test_short_key_is_rejected() {
        let store = LocalMirrorStore::new(LocalStore::new(":memory:").unwrap());
        let key = SyncKey::parse("ab").unwrap();
        let snapshot = CloudSnapshot::default();
        assert!(matches!(
            store.save(Some(&key), &snapshot).await,
            Err(SyncError::InvalidKey(_))
        ));
        assert!(store.fetch(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_without_key_generates_one() {
        let store = LocalMirrorStore::new(LocalStore::new(":memory:").unwrap());
        let key = store.save(None, &CloudSnapshot::default()).await.unwrap();
        assert!(key.is_usable());
        assert!(store.fetch(&key).await.unwrap().is_some());
    }
}
