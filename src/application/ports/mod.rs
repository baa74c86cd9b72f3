mod blob_store;
mod document_repository;
mod document_template;
mod job_store;
mod llm_client;
mod message_queue;
mod render_engine;
mod repository_error;
mod result_repository;
mod text_extractor;

pub use blob_store::{BlobStore, BlobStoreError};
pub use document_repository::SourceDocumentRepository;
pub use document_template::DocumentTemplate;
pub use job_store::JobStore;
pub use llm_client::{LlmClient, LlmClientError};
pub use message_queue::{MessageQueue, QueueError};
pub use render_engine::{RenderContext, RenderEngine, RenderEngineLauncher, RenderError};
pub use repository_error::RepositoryError;
pub use result_repository::ResultRepository;
pub use text_extractor::{TextExtractor, TextExtractorError};
