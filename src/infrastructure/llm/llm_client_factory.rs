use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::LlmClient;
use crate::presentation::config::{LlmProviderSetting, LlmSettings};

use super::backoff::Backoff;
use super::credential_rotation::CredentialRotation;
use super::mock_llm_client::MockLlmClient;
use super::openrouter_client::{OpenRouterClient, OpenRouterConfig};

#[derive(Debug, thiserror::Error)]
pub enum LlmFactoryError {
    #[error("llm.api_keys must contain at least one key for the {0} provider")]
    MissingApiKeys(&'static str),
    #[error("llm client initialization failed: {0}")]
    InitializationFailed(String),
}

pub struct LlmClientFactory;

impl LlmClientFactory {
    pub fn create(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, LlmFactoryError> {
        match settings.provider {
            LlmProviderSetting::OpenRouter => {
                let credentials = CredentialRotation::from_csv(&settings.api_keys)
                    .ok_or(LlmFactoryError::MissingApiKeys("openrouter"))?;
                tracing::info!(
                    model = %settings.model,
                    base_url = %settings.base_url,
                    keys = credentials.len(),
                    "Using OpenRouter-compatible LLM client"
                );

                let config = OpenRouterConfig {
                    base_url: settings.base_url.clone(),
                    model: settings.model.clone(),
                    max_tokens: settings.max_tokens,
                    temperature: settings.temperature,
                    timeout: Duration::from_millis(settings.timeout_ms),
                    max_retries: settings.max_retries,
                    backoff: Backoff::new(
                        Duration::from_millis(settings.backoff_base_ms),
                        Duration::from_millis(settings.backoff_max_ms),
                    ),
                };
                let client = OpenRouterClient::new(Arc::new(credentials), config)
                    .map_err(|e| LlmFactoryError::InitializationFailed(e.to_string()))?;
                Ok(Arc::new(client))
            }
            LlmProviderSetting::Mock => {
                tracing::warn!("Using mock LLM client; results are placeholders");
                Ok(Arc::new(MockLlmClient))
            }
        }
    }
}
