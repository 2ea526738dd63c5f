// ==========================================
// SIGLAB Aviário - 领域层
// ==========================================
// 职责: 记录实体与基础类型，不含任何 I/O
// ==========================================

pub mod batch;
pub mod production;
pub mod snapshot;
pub mod types;

// 重导出核心实体
pub use batch::{BatchFormData, BatchRecord};
pub use production::{EggCounts, ProductionFormData, ProductionMetrics, ProductionRecord};
pub use snapshot::{CloudSnapshot, Syncable};
pub use types::{AviaryId, Feathering, FortnightHalf, MergeStrategy, SyncProvider, SyncStatus};
