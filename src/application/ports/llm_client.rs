use async_trait::async_trait;
use serde_json::Value;

/// Generates one structured (JSON) answer for a prompt.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate_json(&self, prompt: &str) -> Result<Value, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("server error: HTTP {0}")]
    ServerError(u16),
    #[error("input too large: {0}")]
    InputTooLarge(String),
    #[error("content blocked: {0}")]
    ContentBlocked(String),
    #[error("request rejected: HTTP {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
    #[error("no credentials configured")]
    NoCredentials,
}

impl LlmClientError {
    /// Network failures, 5xx and 429 are worth another attempt; everything
    /// else is permanent.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmClientError::ApiRequestFailed(_)
                | LlmClientError::RateLimited
                | LlmClientError::ServerError(_)
        )
    }
}
