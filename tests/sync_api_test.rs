// ==========================================
// SyncApi 集成测试
// ==========================================
// 测试范围:
// 1. 同步密钥管理
// 2. 推送 / 拉取（本地镜像存储）与合并策略
// 3. 防抖推送与同步状态
// ==========================================


use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use siglab_aviario::config::config_keys;
use siglab_aviario::domain::{CloudSnapshot, MergeStrategy, SyncProvider, SyncStatus};
use siglab_aviario::sync::{CloudStore, SyncError, SyncKey, SyncResult};
use test_helpers::*;

// ==========================================
// 测试用存储
// ==========================================

/// 记录推送内容的存储，可配置为总是失败
#[derive(Default)]
struct RecordingStore {
    saved: Mutex<Vec<CloudSnapshot>>,
    fail: bool,
}

#[async_trait]
impl CloudStore for RecordingStore {
    fn provider(&self) -> SyncProvider {
        SyncProvider::Kvdb
    }

    async fn save(&self, key: Option<&SyncKey>, snapshot: &CloudSnapshot) -> SyncResult<SyncKey> {
        if self.fail {
            return Err(SyncError::Transport("connection refused".to_string()));
        }
        self.saved.lock().unwrap().push(snapshot.clone());
        key.cloned().ok_or(SyncError::MissingKey)
    }

    async fn fetch(&self, _key: &SyncKey) -> SyncResult<Option<CloudSnapshot>> {
        Ok(self.saved.lock().unwrap().last().cloned())
    }
}

/// 准备一条批次 + 一条日产记录
fn seed(env: &ApiTestEnv) {
    env.register_batch(1, "L-01", date(2024, 1, 1), 20);
    env.production_api
        .save_record(ProductionFormBuilder::new(1, date(2024, 1, 5)).build(), None)
        .expect("保存日产记录失败");
}

// ==========================================
// 密钥管理
// ==========================================

#[test]
fn test_set_key_规范化() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let key = env.sync_api.set_key("  granja-1 ").expect("保存密钥失败");
    assert_eq!(key.as_str(), "GRANJA-1");
    assert_eq!(env.sync_api.get_key().unwrap(), Some(key));

    let err = env.sync_api.set_key("   ").unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
    assert!(err.to_string().contains("chave de acesso"));
}

#[test]
fn test_generate_and_clear_key() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let key = env.sync_api.generate_key().unwrap();
    assert_eq!(key.as_str().len(), 8);
    assert!(key
        .as_str()
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(env.sync_api.get_key().unwrap(), Some(key));

    assert!(env.sync_api.clear_key().unwrap());
    assert!(env.sync_api.get_key().unwrap().is_none());
    assert!(!env.sync_api.clear_key().unwrap());
}

// ==========================================
// 推送 / 拉取
// ==========================================

#[tokio::test]
async fn test_push_without_key_保存分配的密钥() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed(&env);

    let outcome = env.sync_api.push(false).await.expect("推送失败");
    assert!(outcome.pushed);

    let assigned = outcome.key.expect("应分配密钥");
    assert_eq!(env.sync_api.get_key().unwrap(), Some(assigned.clone()));
    assert!(outcome.message.contains(assigned.as_str()));
}

#[tokio::test]
async fn test_push_clear_pull_恢复数据() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed(&env);
    env.sync_api.set_key("granja-1").unwrap();

    env.sync_api.push(false).await.expect("推送失败");

    env.production_api.clear_records().unwrap();
    env.batch_api.clear_batches().unwrap();

    let outcome = env.sync_api.pull().await.expect("拉取失败");
    assert!(outcome.applied);
    assert_eq!(outcome.strategy, MergeStrategy::Replace);
    assert_eq!(outcome.records, 1);
    assert_eq!(outcome.batches, 1);

    let restored = env.production_repo.list_all().unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].batch_id, "L-01");
    assert_eq!(env.batch_repo.list_all().unwrap().len(), 1);

    let status = env.sync_api.status().unwrap();
    assert_eq!(status.provider, SyncProvider::Local);
    assert_eq!(status.status, SyncStatus::Success);
}

#[tokio::test]
async fn test_pull_replace_覆盖本地新增() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed(&env);
    env.sync_api.set_key("granja-2").unwrap();
    env.sync_api.push(false).await.unwrap();

    env.production_api
        .save_record(ProductionFormBuilder::new(1, date(2024, 1, 6)).build(), None)
        .unwrap();

    let outcome = env.sync_api.pull().await.unwrap();
    assert_eq!(outcome.records, 1);
    assert_eq!(env.production_repo.list_all().unwrap().len(), 1);
}

#[tokio::test]
async fn test_pull_updated_at_合并() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed(&env);
    env.sync_api.set_key("granja-3").unwrap();
    env.config_api
        .update_config(config_keys::SYNC_MERGE_STRATEGY, "updated_at")
        .expect("更新配置失败");

    let original = env.production_repo.list_all().unwrap().remove(0);
    env.sync_api.push(false).await.unwrap();

    // 本地编辑（更新）+ 新增
    tokio::time::sleep(Duration::from_millis(5)).await;
    let edited = env
        .production_api
        .save_record(
            ProductionFormBuilder::new(1, date(2024, 1, 5)).mortality(3).build(),
            Some(&original.id),
        )
        .unwrap();
    let added = env
        .production_api
        .save_record(ProductionFormBuilder::new(1, date(2024, 1, 7)).build(), None)
        .unwrap();

    let outcome = env.sync_api.pull().await.expect("拉取失败");
    assert_eq!(outcome.strategy, MergeStrategy::UpdatedAt);
    assert_eq!(outcome.records, 2);

    let merged = env.production_repo.list_all().unwrap();
    let kept = merged.iter().find(|r| r.id == original.id).unwrap();
    assert_eq!(kept.mortality, edited.mortality);
    assert!(merged.iter().any(|r| r.id == added.id));
}

#[tokio::test]
async fn test_pull_updated_at_仅远端记录在前() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed(&env);
    env.sync_api.set_key("granja-4").unwrap();
    env.config_api
        .update_config(config_keys::SYNC_MERGE_STRATEGY, "updated_at")
        .unwrap();
    let remote_only = env.production_repo.list_all().unwrap().remove(0);
    env.sync_api.push(false).await.unwrap();

    env.production_api.clear_records().unwrap();
    let local = env
        .production_api
        .save_record(ProductionFormBuilder::new(1, date(2024, 1, 8)).build(), None)
        .unwrap();

    env.sync_api.pull().await.unwrap();
    let ids: Vec<String> = env
        .production_repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![remote_only.id, local.id]);
}

#[tokio::test]
async fn test_pull_errors() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let err = env.sync_api.pull().await.unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
    assert!(err.to_string().contains("Nenhuma chave"));

    env.sync_api.set_key("ab").unwrap();
    let err = env.sync_api.pull().await.unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
    assert!(err.to_string().contains("AB"));
    assert_eq!(env.sync_api.status().unwrap().status, SyncStatus::Error);
}

#[tokio::test]
async fn test_pull_remote_empty() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed(&env);
    env.sync_api.set_key("sem-dados").unwrap();

    let outcome = env.sync_api.pull().await.expect("拉取失败");
    assert!(!outcome.applied);
    assert!(outcome.message.contains("Ainda não existem dados"));
    assert_eq!(env.production_repo.list_all().unwrap().len(), 1);
}

// ==========================================
// 防抖与自定义存储
// ==========================================

#[tokio::test]
async fn test_debounced_push_只推送最后一次() {
    let store = Arc::new(RecordingStore::default());
    let env = ApiTestEnv::with_store(store.clone()).expect("无法创建测试环境");
    seed(&env);
    env.sync_api.set_key("granja-5").unwrap();

    let (first, second) = tokio::join!(env.sync_api.push(true), env.sync_api.push(true));
    let first = first.expect("推送失败");
    let second = second.expect("推送失败");

    assert!(!first.pushed);
    assert!(first.message.contains("substituído"));
    assert!(second.pushed);
    assert_eq!(store.saved.lock().unwrap().len(), 1);

    // 间隔超过防抖时长的推送各自生效
    env.sync_api.push(true).await.unwrap();
    tokio::time::sleep(TEST_DEBOUNCE).await;
    env.sync_api.push(true).await.unwrap();
    assert_eq!(store.saved.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_push_failure_记录状态() {
    let store = Arc::new(RecordingStore {
        fail: true,
        ..RecordingStore::default()
    });
    let env = ApiTestEnv::with_store(store).expect("无法创建测试环境");
    env.sync_api.set_key("granja-6").unwrap();

    let err = env.sync_api.push(false).await.unwrap_err();
    assert_eq!(err.code(), "SYNC_ERROR");

    let status = env.sync_api.status().unwrap();
    assert_eq!(status.provider, SyncProvider::Kvdb);
    assert_eq!(status.status, SyncStatus::Error);
    assert!(status.last_error.unwrap().contains("connection refused"));

    // 失败不影响本地数据
    env.register_batch(2, "L-02", date(2024, 1, 1), 20);
    assert_eq!(env.batch_repo.list_all().unwrap().len(), 1);
}
