use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{
    BlobStore, JobStore, MessageQueue, ResultRepository, SourceDocumentRepository,
};
use crate::domain::{
    ContentType, Job, PipelineResult, QueueMessage, RunId, SourceDocument, StorageLocator,
    chunk_count,
};

use super::pipeline_error::PipelineError;

pub struct Submission {
    pub filename: String,
    pub content_type: ContentType,
    pub data: Bytes,
    pub instruction_text: Option<String>,
    pub job_description: Option<String>,
}

/// Accepts documents into the pipeline and answers questions about runs.
pub struct RunService {
    blob_store: Arc<dyn BlobStore>,
    documents: Arc<dyn SourceDocumentRepository>,
    job_store: Arc<dyn JobStore>,
    results: Arc<dyn ResultRepository>,
    queue: Arc<dyn MessageQueue>,
    retention: chrono::Duration,
}

impl RunService {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        documents: Arc<dyn SourceDocumentRepository>,
        job_store: Arc<dyn JobStore>,
        results: Arc<dyn ResultRepository>,
        queue: Arc<dyn MessageQueue>,
        retention: chrono::Duration,
    ) -> Self {
        Self {
            blob_store,
            documents,
            job_store,
            results,
            queue,
            retention,
        }
    }

    /// Stores the upload, records the run and enqueues it. The message is sent
    /// last so a worker never sees a run whose records are not written yet.
    #[tracing::instrument(skip(self, submission), fields(filename = %submission.filename, bytes = submission.data.len()))]
    pub async fn submit(&self, submission: Submission) -> Result<Job, PipelineError> {
        let run_id = RunId::new();
        let key = StorageLocator::upload_key(&run_id, &submission.filename);
        let locator = self.blob_store.put(&key, submission.data).await?;

        let document = SourceDocument::new(
            run_id.clone(),
            submission.filename,
            submission.content_type,
            locator,
            submission.instruction_text,
            submission.job_description,
            self.retention,
        );
        self.documents.create(&document).await?;

        let job = self.job_store.ensure_for_run(&run_id, chunk_count()).await?;
        self.queue.send(&QueueMessage::new(run_id.clone())).await?;

        tracing::info!(run_id = %run_id, "Run submitted");
        Ok(job)
    }

    pub async fn status(&self, run_id: &RunId) -> Result<Option<Job>, PipelineError> {
        Ok(self.job_store.find_by_run(run_id).await?)
    }

    pub async fn result(&self, run_id: &RunId) -> Result<Option<PipelineResult>, PipelineError> {
        Ok(self.results.get(run_id).await?)
    }
}
