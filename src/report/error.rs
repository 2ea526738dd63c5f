// ==========================================
// SIGLAB Aviário - 报告层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("未配置 GEMINI_API_KEY")]
    MissingApiKey,

    #[error("HTTP 请求失败: {0}")]
    Transport(String),

    #[error("模型服务返回错误状态 {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("模型调用额度已用尽")]
    QuotaExceeded,

    #[error("模型未返回文本")]
    EmptyResponse,

    #[error("提示词构建失败: {0}")]
    PromptError(String),
}

impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        ReportError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::PromptError(err.to_string())
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
