use crate::application::ports::{
    BlobStoreError, QueueError, RenderError, RepositoryError, TextExtractorError,
};
use crate::domain::{JobStatus, Phase, RunId};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("blob store: {0}")]
    BlobStore(#[from] BlobStoreError),
    #[error("text extraction: {0}")]
    Extraction(#[from] TextExtractorError),
    #[error("queue: {0}")]
    Queue(#[from] QueueError),
    #[error("render: {0}")]
    Render(#[from] RenderError),
    #[error("source document missing for {0}")]
    SourceMissing(RunId),
    #[error("extracted text missing for {0}")]
    ExtractedTextMissing(RunId),
    #[error("result missing for {0}")]
    ResultMissing(RunId),
    #[error("{phase} phase failed for {run_id} (now {status}): {message}")]
    PhaseFailed {
        run_id: RunId,
        phase: Phase,
        status: JobStatus,
        message: String,
    },
}
