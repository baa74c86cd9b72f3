use std::sync::Arc;
use std::time::Duration;

use docpipe::application::ports::{BlobStore, MessageQueue, SourceDocumentRepository};
use docpipe::domain::{JobStatus, QueueMessage};

use crate::helpers::fakes::ScriptedLlmClient;
use crate::helpers::pipeline::{SAMPLE_JOB_DESCRIPTION, SAMPLE_RESUME, TestPipeline};

#[tokio::test]
async fn given_upload_when_submitted_then_blob_document_job_and_message_exist() {
    let pipeline = TestPipeline::new(Arc::new(ScriptedLlmClient::new()));

    let run_id = pipeline
        .submit_text(SAMPLE_RESUME, Some(SAMPLE_JOB_DESCRIPTION))
        .await;

    let document = pipeline.documents.get(&run_id).await.unwrap().unwrap();
    assert_eq!(
        document.locator.as_str(),
        format!("runs/{}/resume.txt", run_id)
    );
    assert_eq!(document.job_description.as_deref(), Some(SAMPLE_JOB_DESCRIPTION));
    assert!(document.retention_until > document.created_at);

    let stored = pipeline.blob_store.get(&document.locator).await.unwrap();
    assert_eq!(stored, SAMPLE_RESUME.as_bytes());

    let job = pipeline.run_service.status(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.progress.chunks_total, 5);

    let messages = pipeline
        .queue
        .receive(10, Duration::from_millis(10))
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        QueueMessage::from_body(&messages[0].body).unwrap().run_id,
        run_id
    );
}

#[tokio::test]
async fn given_unknown_run_when_querying_then_none() {
    let pipeline = TestPipeline::new(Arc::new(ScriptedLlmClient::new()));
    let run_id = docpipe::domain::RunId::new();

    assert!(pipeline.run_service.status(&run_id).await.unwrap().is_none());
    assert!(pipeline.run_service.result(&run_id).await.unwrap().is_none());
}
