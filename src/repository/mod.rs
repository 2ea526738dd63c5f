// ==========================================
// SIGLAB Aviário - 数据仓储层
// ==========================================
// 约束: Repository 不含业务逻辑
// 职责: 本地键值存储 + 日产/批次数组的整体读写
// ==========================================

pub mod batch_repo;
pub mod error;
pub mod local_store;
pub mod production_repo;

// 重导出核心仓储
pub use batch_repo::BatchRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use local_store::{LocalStore, BATCH_RECORDS_KEY, RECORDS_KEY, SYNC_KEY};
pub use production_repo::ProductionRepository;
