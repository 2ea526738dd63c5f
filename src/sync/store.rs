// ==========================================
// SIGLAB Aviário - 云端存储 Trait
// ==========================================
// 实现者: LocalMirrorStore / KvdbStore / JsonBlobStore
// 说明: 每次读写整个快照，无鉴权、无版本控制
// ==========================================

use crate::domain::snapshot::CloudSnapshot;
use crate::domain::types::SyncProvider;
use crate::sync::error::SyncResult;
use crate::sync::key::SyncKey;
use async_trait::async_trait;

#[async_trait]
pub trait CloudStore: Send + Sync {
    fn provider(&self) -> SyncProvider;

    /// 上传快照
    ///
    /// # 参数
    /// - key: 已有密钥；None 时由服务端分配（仅 JSONBlob 支持）
    /// - snapshot: 完整快照
    ///
    /// # 返回
    /// - Ok(key): 实际写入使用的密钥
    async fn save(&self, key: Option<&SyncKey>, snapshot: &CloudSnapshot) -> SyncResult<SyncKey>;

    /// 拉取快照
    ///
    /// # 返回
    /// - Ok(None): 该密钥下尚无数据
    async fn fetch(&self, key: &SyncKey) -> SyncResult<Option<CloudSnapshot>>;
}
