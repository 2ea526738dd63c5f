// ==========================================
// SIGLAB Aviário - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户可读的消息
// 说明: 面向用户的消息经 i18n 本地化，技术错误保留原因
// ==========================================

use crate::config::config_manager::ConfigError;
use crate::i18n::{t, t_with_args};
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use crate::sync::error::SyncError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("{0}")]
    InvalidInput(String),

    /// 日产日期之前该鸡舍没有批次记录
    #[error("{0}")]
    BatchNotRegistered(String),

    #[error("{0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入 / 同步 / 配置
    // ==========================================
    #[error("{0}")]
    ImportError(String),

    #[error("同步失败: {0}")]
    SyncError(String),

    #[error("{0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定的错误代码（供命令行 JSON 输出）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::BatchNotRegistered(_) => "BATCH_NOT_REGISTERED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::SyncError(_) => "SYNC_ERROR",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

/// 错误响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            e @ RepositoryError::SerializationError { .. } => ApiError::DatabaseError(e.to_string()),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => {
                ApiError::ImportError(t_with_args("import.file_not_found", &[("path", &path)]))
            }
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(t_with_args(
                "import.read_failed",
                &[("reason", &other.to_string())],
            )),
        }
    }
}

// ==========================================
// 从 SyncError 转换
// ==========================================
impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::MissingKey => ApiError::InvalidInput(t("sync.no_key")),
            SyncError::InvalidKey(key) => {
                ApiError::InvalidInput(t_with_args("sync.key_too_short", &[("key", &key)]))
            }
            SyncError::Repository(e) => e.into(),
            SyncError::Other(err) => ApiError::Other(err),
            other => ApiError::SyncError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ConfigError 转换
// ==========================================
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidValue { key, value } => ApiError::ConfigError(t_with_args(
                "config.invalid_value",
                &[("key", &key), ("value", &value)],
            )),
            e @ ConfigError::UnknownKey(_) => ApiError::ConfigError(e.to_string()),
            ConfigError::Repository(e) => e.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
