mod backoff;
mod credential_rotation;
mod llm_client_factory;
mod mock_llm_client;
mod openrouter_client;
mod response_parser;

pub use backoff::Backoff;
pub use credential_rotation::CredentialRotation;
pub use llm_client_factory::{LlmClientFactory, LlmFactoryError};
pub use mock_llm_client::MockLlmClient;
pub use openrouter_client::{OpenRouterClient, OpenRouterConfig};
pub use response_parser::parse_json_response;
