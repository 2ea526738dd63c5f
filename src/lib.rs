// ==========================================
// SIGLAB Aviário - 核心库
// ==========================================
// 系统定位: 蛋鸡日产记录、鸡群批次特征、看板与云同步
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 本地存储
pub mod repository;

// 引擎层 - 指标、批次关联、筛选、看板
pub mod engine;

// 导入层 - CSV 导入导出
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// 国际化
pub mod i18n;

// 云同步
pub mod sync;

// 快速报告
pub mod report;

// API 层 - 业务接口
pub mod api;

// 应用层 - 命令行集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    AviaryId, BatchRecord, CloudSnapshot, Feathering, ProductionFormData, ProductionRecord,
};

pub use api::{ApiError, ApiResult, BatchApi, DashboardApi, ProductionApi, SyncApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "SIGLAB Aviário";
