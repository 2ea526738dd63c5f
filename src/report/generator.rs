// ==========================================
// SIGLAB Aviário - 文本生成服务
// ==========================================
// GeminiClient: POST {base}/{version}/models/{model}:generateContent?key=...
// 请求体: {"contents":[{"parts":[{"text": prompt}]}]}
// 响应: candidates[0].content.parts[0].text
// ==========================================

use crate::report::error::{ReportError, ReportResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_API_VERSION: &str = "v1beta";
pub const DEFAULT_REPORT_MODEL: &str = "gemini-3-flash-preview";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> ReportResult<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> ReportResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ReportError::MissingApiKey);
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent?key={}",
            self.base_url, DEFAULT_GEMINI_API_VERSION, self.model, self.api_key
        )
    }
}

/// 提取首个候选文本
pub fn extract_text(json: &serde_json::Value) -> Option<String> {
    json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> ReportResult<String> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        tracing::info!(model = %self.model, prompt_len = prompt.len(), "请求 Gemini 生成快报");
        let resp = self.client.post(self.endpoint()).json(&body).send().await?;
        let status = resp.status();

        if status.is_success() {
            let json: serde_json::Value = resp.json().await?;
            return extract_text(&json).ok_or(ReportError::EmptyResponse);
        }

        let message = resp.text().await.unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN
                && (message.contains("quota") || message.contains("exceeded")))
        {
            return Err(ReportError::QuotaExceeded);
        }
        Err(ReportError::HttpStatus {
            status: status.as_u16(),
            message,
        })
    }
}
