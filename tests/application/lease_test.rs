use std::sync::Arc;
use std::time::Duration;

use docpipe::application::ports::{JobStore, RepositoryError, ResultRepository};
use docpipe::domain::{JobStatus, LeaseRequest, LeaseScope, Phase, PhaseOutput, RunId};
use docpipe::infrastructure::persistence::{InMemoryJobStore, InMemoryResultRepository};
use serde_json::json;

fn parsed(name: &str) -> PhaseOutput {
    PhaseOutput::Parsed {
        original: json!({"header": {"name": name}}),
    }
}

fn parse_request(scope: LeaseScope, worker: &str) -> LeaseRequest {
    LeaseRequest {
        phase: Phase::Parse,
        scope,
        ttl: Duration::from_secs(60),
        max_attempts: 3,
        worker_id: worker.to_string(),
    }
}

#[tokio::test]
async fn given_concurrent_workers_when_acquiring_same_job_then_exactly_one_wins() {
    let store = Arc::new(InMemoryJobStore::new());
    let run_id = RunId::new();
    store.ensure_for_run(&run_id, 5).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        let request = parse_request(LeaseScope::Run(run_id.clone()), &format!("worker-{i}"));
        handles.push(tokio::spawn(async move {
            store.acquire_lease(&request).await.unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    let job = store.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Parsing);
    assert_eq!(job.attempt, 1);
}

#[tokio::test]
async fn given_live_lease_when_another_worker_tries_then_nothing_until_expiry() {
    let store = InMemoryJobStore::new();
    let run_id = RunId::new();
    store.ensure_for_run(&run_id, 5).await.unwrap();

    let first = store
        .acquire_lease(&parse_request(LeaseScope::Any, "a"))
        .await
        .unwrap();
    assert!(first.is_some());

    let second = store
        .acquire_lease(&parse_request(LeaseScope::Any, "b"))
        .await
        .unwrap();
    assert!(second.is_none());

    store.expire_leases();

    let reclaimed = store
        .acquire_lease(&parse_request(LeaseScope::Any, "b"))
        .await
        .unwrap()
        .expect("expired lease should be reclaimable");
    assert_eq!(reclaimed.attempt, 2);
    assert_eq!(reclaimed.assigned_worker.as_deref(), Some("b"));
}

#[tokio::test]
async fn given_reclaimed_job_when_stale_holder_completes_then_lease_lost() {
    let store = InMemoryJobStore::new();
    let run_id = RunId::new();
    store.ensure_for_run(&run_id, 5).await.unwrap();

    let stale = store
        .acquire_lease(&parse_request(LeaseScope::Any, "a"))
        .await
        .unwrap()
        .unwrap()
        .lease();
    store.expire_leases();
    let fresh = store
        .acquire_lease(&parse_request(LeaseScope::Any, "b"))
        .await
        .unwrap()
        .unwrap()
        .lease();

    let result = store.complete_phase(&stale, &parsed("stale")).await;
    assert!(matches!(result, Err(RepositoryError::LeaseLost(_))));

    store.complete_phase(&fresh, &parsed("fresh")).await.unwrap();
    let job = store.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Parsed);
    assert_eq!(job.step, Phase::Generate);
}

#[tokio::test]
async fn given_parse_completed_when_leasing_generate_then_immediately_eligible() {
    let store = InMemoryJobStore::new();
    let run_id = RunId::new();
    store.ensure_for_run(&run_id, 5).await.unwrap();

    let lease = store
        .acquire_lease(&parse_request(LeaseScope::Any, "a"))
        .await
        .unwrap()
        .unwrap()
        .lease();
    store.complete_phase(&lease, &parsed("Ada")).await.unwrap();

    let generate = LeaseRequest {
        phase: Phase::Generate,
        ..parse_request(LeaseScope::Run(run_id.clone()), "a")
    };
    let job = store.acquire_lease(&generate).await.unwrap().unwrap();

    assert_eq!(job.status, JobStatus::Generating);
    assert_eq!(job.attempt, 2);
}

#[tokio::test]
async fn given_failing_attempts_when_max_reached_then_failed_after_exactly_three_leases() {
    let store = InMemoryJobStore::new();
    let run_id = RunId::new();
    store.ensure_for_run(&run_id, 5).await.unwrap();

    let mut leases = 0;
    let mut last_status = JobStatus::Pending;
    while let Some(job) = store
        .acquire_lease(&parse_request(LeaseScope::Run(run_id.clone()), "a"))
        .await
        .unwrap()
    {
        leases += 1;
        last_status = store
            .fail_attempt(&job.lease(), "source document missing", 3)
            .await
            .unwrap();
        assert!(leases <= 3, "job leased more than max_attempts times");
    }

    assert_eq!(leases, 3);
    assert_eq!(last_status, JobStatus::Failed);
    let job = store.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.last_error.as_deref(), Some("source document missing"));
}

#[tokio::test]
async fn given_final_attempt_abandoned_when_sweeping_then_job_failed() {
    let store = InMemoryJobStore::new();
    let run_id = RunId::new();
    store.ensure_for_run(&run_id, 5).await.unwrap();

    for _ in 0..3 {
        store
            .acquire_lease(&parse_request(LeaseScope::Any, "a"))
            .await
            .unwrap()
            .expect("attempt available");
        store.expire_leases();
    }

    assert_eq!(store.fail_abandoned(3).await.unwrap(), 1);
    let job = store.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.last_error.is_some());
}

#[tokio::test]
async fn given_stale_lease_when_completing_then_result_not_written() {
    let results = Arc::new(InMemoryResultRepository::new());
    let store = InMemoryJobStore::with_results(Arc::clone(&results));
    let run_id = RunId::new();
    store.ensure_for_run(&run_id, 5).await.unwrap();

    let stale = store
        .acquire_lease(&parse_request(LeaseScope::Any, "a"))
        .await
        .unwrap()
        .unwrap()
        .lease();
    store.expire_leases();
    let fresh = store
        .acquire_lease(&parse_request(LeaseScope::Any, "b"))
        .await
        .unwrap()
        .unwrap()
        .lease();

    store.complete_phase(&fresh, &parsed("fresh")).await.unwrap();
    let result = store.complete_phase(&stale, &parsed("stale")).await;
    assert!(matches!(result, Err(RepositoryError::LeaseLost(_))));

    let stored = results.get(&run_id).await.unwrap().unwrap();
    assert_eq!(stored.original["header"]["name"], "fresh");
}

#[tokio::test]
async fn given_stale_lease_when_recording_chunks_then_lease_lost_and_progress_untouched() {
    let store = InMemoryJobStore::new();
    let run_id = RunId::new();
    store.ensure_for_run(&run_id, 5).await.unwrap();

    let stale = store
        .acquire_lease(&parse_request(LeaseScope::Any, "a"))
        .await
        .unwrap()
        .unwrap()
        .lease();
    store.expire_leases();
    let fresh = store
        .acquire_lease(&parse_request(LeaseScope::Any, "b"))
        .await
        .unwrap()
        .unwrap()
        .lease();
    store.reset_progress(&fresh, 5).await.unwrap();
    store.record_chunk_success(&fresh).await.unwrap();

    let success = store.record_chunk_success(&stale).await;
    let error = store.record_chunk_error(&stale, "skills: timed out").await;
    assert!(matches!(success, Err(RepositoryError::LeaseLost(_))));
    assert!(matches!(error, Err(RepositoryError::LeaseLost(_))));

    let job = store.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.progress.chunks_completed, 1);
    assert!(job.progress.chunk_errors.is_empty());
}

#[tokio::test]
async fn given_failed_attempt_when_retry_completes_then_last_error_cleared() {
    let store = InMemoryJobStore::new();
    let run_id = RunId::new();
    store.ensure_for_run(&run_id, 5).await.unwrap();

    let first = store
        .acquire_lease(&parse_request(LeaseScope::Any, "a"))
        .await
        .unwrap()
        .unwrap()
        .lease();
    let status = store
        .fail_attempt(&first, "llm unavailable", 3)
        .await
        .unwrap();
    assert_eq!(status, JobStatus::Parsing);
    let failed = store.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(failed.last_error.as_deref(), Some("llm unavailable"));

    let retry = store
        .acquire_lease(&parse_request(LeaseScope::Any, "a"))
        .await
        .unwrap()
        .expect("released lease should be reacquirable")
        .lease();
    store.complete_phase(&retry, &parsed("Ada")).await.unwrap();

    let job = store.find_by_run(&run_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Parsed);
    assert!(job.last_error.is_none());
}
