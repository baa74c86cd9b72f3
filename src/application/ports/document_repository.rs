use async_trait::async_trait;

use crate::domain::{RunId, SourceDocument};

use super::RepositoryError;

#[async_trait]
pub trait SourceDocumentRepository: Send + Sync {
    async fn create(&self, document: &SourceDocument) -> Result<(), RepositoryError>;

    async fn get(&self, run_id: &RunId) -> Result<Option<SourceDocument>, RepositoryError>;

    /// Writes the derived text. Only the first write sticks.
    async fn set_extracted_text(&self, run_id: &RunId, text: &str) -> Result<(), RepositoryError>;
}
