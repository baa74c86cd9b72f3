use std::sync::Arc;

use docpipe::application::ports::{JobStore, ResultRepository, SourceDocumentRepository};
use docpipe::application::services::{PhaseOutcome, PipelineError, RunHandler};
use docpipe::domain::{
    ContentType, JobStatus, LeaseScope, Phase, RunId, SourceDocument, StorageLocator,
};

use crate::helpers::fakes::ScriptedLlmClient;
use crate::helpers::pipeline::{
    MAX_ATTEMPTS, SAMPLE_JOB_DESCRIPTION, SAMPLE_RESUME, TestPipeline,
};

#[tokio::test]
async fn given_submitted_run_when_processed_then_completed_with_result_and_score() {
    let pipeline = TestPipeline::new(Arc::new(ScriptedLlmClient::new()));
    let run_id = pipeline
        .submit_text(SAMPLE_RESUME, Some(SAMPLE_JOB_DESCRIPTION))
        .await;

    pipeline.executor.handle_run(&run_id).await.unwrap();

    let job = pipeline.jobs.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.attempt, 2);
    assert_eq!(job.progress.chunks_completed, 5);
    assert!(job.progress.chunk_errors.is_empty());

    let result = pipeline.results.get(&run_id).await.unwrap().unwrap();
    assert_eq!(result.original["name"], "Ada Lovelace");
    assert!(result.is_complete());
    assert!(result.score.is_some());

    let document = pipeline.documents.get(&run_id).await.unwrap().unwrap();
    assert!(document.extracted_text.unwrap().contains("Ada Lovelace"));
}

#[tokio::test]
async fn given_projects_chunk_fails_when_processed_then_run_completes_with_chunk_error() {
    let pipeline = TestPipeline::new(Arc::new(ScriptedLlmClient::new().failing("projects")));
    let run_id = pipeline.submit_text(SAMPLE_RESUME, None).await;

    pipeline.executor.handle_run(&run_id).await.unwrap();

    let job = pipeline.jobs.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress.chunks_completed, 4);
    assert_eq!(job.progress.chunk_errors.len(), 1);
    assert!(job.progress.chunk_errors[0].starts_with("projects: "));

    let result = pipeline.results.get(&run_id).await.unwrap().unwrap();
    let final_json = result.final_representation.unwrap();
    assert!(final_json.get("projects").is_none());
    assert!(final_json.get("experience").is_some());
}

#[tokio::test]
async fn given_completed_run_when_message_redelivered_then_nothing_changes() {
    let llm = Arc::new(ScriptedLlmClient::new());
    let pipeline = TestPipeline::new(Arc::clone(&llm) as _);
    let run_id = pipeline.submit_text(SAMPLE_RESUME, None).await;
    pipeline.executor.handle_run(&run_id).await.unwrap();
    let calls_after_first = llm.calls();

    pipeline.executor.handle_run(&run_id).await.unwrap();

    assert_eq!(llm.calls(), calls_after_first);
    let job = pipeline.jobs.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.attempt, 2);
}

#[tokio::test]
async fn given_missing_source_document_when_processed_then_attempt_consumed_until_failed() {
    let pipeline = TestPipeline::new(Arc::new(ScriptedLlmClient::new()));
    let run_id = RunId::new();
    pipeline.jobs.ensure_for_run(&run_id, 5).await.unwrap();

    for attempt in 1..=MAX_ATTEMPTS {
        let err = pipeline.executor.handle_run(&run_id).await.unwrap_err();
        match err {
            PipelineError::PhaseFailed { phase, status, .. } => {
                assert_eq!(phase, Phase::Parse);
                let expected = if attempt == MAX_ATTEMPTS {
                    JobStatus::Failed
                } else {
                    JobStatus::Parsing
                };
                assert_eq!(status, expected);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    let job = pipeline.jobs.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.attempt, MAX_ATTEMPTS);
    assert!(job.last_error.unwrap().contains("source document missing"));

    let outcome = pipeline
        .executor
        .run_phase(Phase::Parse, LeaseScope::Run(run_id.clone()))
        .await
        .unwrap();
    assert_eq!(outcome, PhaseOutcome::NotEligible);
}

#[tokio::test]
async fn given_parse_lease_abandoned_when_reclaim_sweep_runs_then_run_advances() {
    let pipeline = TestPipeline::new(Arc::new(ScriptedLlmClient::new()));
    let run_id = pipeline.submit_text(SAMPLE_RESUME, None).await;

    let request = docpipe::domain::LeaseRequest {
        phase: Phase::Parse,
        scope: LeaseScope::Run(run_id.clone()),
        ttl: std::time::Duration::from_secs(60),
        max_attempts: MAX_ATTEMPTS,
        worker_id: "crashed-worker".to_string(),
    };
    pipeline.jobs.acquire_lease(&request).await.unwrap().unwrap();

    assert_eq!(pipeline.executor.reclaim().await.unwrap(), 0);

    pipeline.jobs.expire_leases();
    let reclaimed = pipeline.executor.reclaim().await.unwrap();

    assert_eq!(reclaimed, 2);
    let job = pipeline.jobs.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.assigned_worker.as_deref(), Some("test-worker"));
}

#[tokio::test]
async fn given_text_already_extracted_when_parsing_then_stored_text_is_reused() {
    let pipeline = TestPipeline::new(Arc::new(ScriptedLlmClient::new()));
    let run_id = RunId::new();
    let document = SourceDocument::new(
        run_id.clone(),
        "resume.txt".to_string(),
        ContentType::Text,
        StorageLocator::from_raw("runs/missing/resume.txt"),
        None,
        None,
        chrono::Duration::hours(1),
    );
    pipeline.documents.create(&document).await.unwrap();
    pipeline
        .documents
        .set_extracted_text(&run_id, "already extracted")
        .await
        .unwrap();
    pipeline.jobs.ensure_for_run(&run_id, 5).await.unwrap();

    pipeline.executor.handle_run(&run_id).await.unwrap();

    let job = pipeline.jobs.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}
