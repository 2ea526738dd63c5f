// ==========================================
// SIGLAB Aviário - 云同步层
// ==========================================
// 职责: 同步密钥 / 云端存储实现 / 合并策略 / 防抖推送
// 说明: 尽力而为，无鉴权、无版本、无冲突消解
// ==========================================

pub mod error;
pub mod jsonblob;
pub mod key;
pub mod kvdb;
pub mod local;
pub mod merge;
pub mod service;
pub mod store;

pub use error::{SyncError, SyncResult};
pub use jsonblob::JsonBlobStore;
pub use key::SyncKey;
pub use kvdb::KvdbStore;
pub use local::LocalMirrorStore;
pub use merge::{merge_by_updated_at, merge_snapshot, MergeOutcome};
pub use service::{SyncService, DEFAULT_DEBOUNCE_MS};
pub use store::CloudStore;
