// ==========================================
// SIGLAB Aviário - 同步层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 同步失败只反映到同步状态，不回滚本地数据
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    // ===== 密钥错误 =====
    #[error("未设置同步密钥")]
    MissingKey,

    #[error("同步密钥无效 (至少 3 个字符): {0}")]
    InvalidKey(String),

    // ===== 传输错误 =====
    #[error("HTTP 请求失败: {0}")]
    Transport(String),

    #[error("远端返回错误状态 {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("远端响应缺少 Location 头")]
    MissingLocation,

    // ===== 数据错误 =====
    #[error("快照编解码失败: {0}")]
    Codec(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Codec(err.to_string())
        } else {
            SyncError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Codec(err.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
