use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::infrastructure::observability::sanitize_prompt;

use super::backoff::Backoff;
use super::credential_rotation::CredentialRotation;
use super::response_parser::parse_json_response;

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o".to_string(),
            max_tokens: 4096,
            temperature: 0.0,
            timeout: Duration::from_secs(60),
            max_retries: 5,
            backoff: Backoff::default(),
        }
    }
}

/// Chat-completions client for OpenRouter and other OpenAI-compatible
/// endpoints. Retries transient failures and rotates keys on 429.
pub struct OpenRouterClient {
    client: Client,
    credentials: Arc<CredentialRotation>,
    config: OpenRouterConfig,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterClient {
    pub fn new(
        credentials: Arc<CredentialRotation>,
        config: OpenRouterConfig,
    ) -> Result<Self, LlmClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            credentials,
            config,
        })
    }

    pub fn credentials(&self) -> &CredentialRotation {
        &self.credentials
    }

    async fn send_once(&self, api_key: &str, prompt: &str) -> Result<Value, LlmClientError> {
        let request_body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }
        if status.is_server_error() {
            return Err(LlmClientError::ServerError(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_client_error(status, body));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmClientError::InvalidResponse("empty choices".to_string()))?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(LlmClientError::ContentBlocked(
                "response stopped by content filter".to_string(),
            ));
        }

        parse_json_response(choice.message.content.as_deref().unwrap_or_default())
    }
}

fn classify_client_error(status: StatusCode, body: String) -> LlmClientError {
    let lowered = body.to_lowercase();
    if status == StatusCode::BAD_REQUEST
        && (lowered.contains("context") || lowered.contains("length"))
    {
        LlmClientError::InputTooLarge(body)
    } else {
        LlmClientError::Rejected {
            status: status.as_u16(),
            message: body,
        }
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.config.model, prompt = %sanitize_prompt(prompt)))]
    async fn generate_json(&self, prompt: &str) -> Result<Value, LlmClientError> {
        let mut last_error = LlmClientError::NoCredentials;

        for attempt in 0..=self.config.max_retries {
            let (key_index, api_key) = self.credentials.current();

            match self.send_once(api_key, prompt).await {
                Ok(value) => return Ok(value),
                Err(LlmClientError::RateLimited) => {
                    let next = self.credentials.advance_from(key_index);
                    tracing::warn!(attempt, key_index, next, "Rate limited, rotating credential");
                    last_error = LlmClientError::RateLimited;
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(attempt, error = %e, "Transient provider failure");
                    last_error = e;
                }
                Err(e) => return Err(e),
            }

            if attempt < self.config.max_retries {
                tokio::time::sleep(self.config.backoff.delay(attempt)).await;
            }
        }

        Err(LlmClientError::RetriesExhausted {
            attempts: self.config.max_retries + 1,
            last: last_error.to_string(),
        })
    }
}
