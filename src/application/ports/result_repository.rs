use async_trait::async_trait;

use crate::domain::{PipelineResult, RunId};

use super::RepositoryError;

/// Read side of pipeline results. Writes go through
/// [`JobStore::complete_phase`](super::JobStore::complete_phase) so they are
/// fenced by the same lease as the job transition.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn get(&self, run_id: &RunId) -> Result<Option<PipelineResult>, RepositoryError>;
}
