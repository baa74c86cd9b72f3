//! In-process stores for tests and single-process local runs. Each
//! operation runs under the jobs lock, which gives the same atomicity as the
//! conditional updates of the Postgres stores. Completion takes the results
//! lock while still holding it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::ports::{
    JobStore, RepositoryError, ResultRepository, SourceDocumentRepository,
};
use crate::domain::{
    Job, JobId, JobProgress, JobStatus, Lease, LeaseRequest, LeaseScope, Phase, PhaseOutput,
    PipelineResult, RunId, SourceDocument,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::ConnectionFailed("store lock poisoned".to_string()))
}

fn lease_lost(lease: &Lease) -> RepositoryError {
    RepositoryError::LeaseLost(format!(
        "job {} attempt {} no longer holds the {} lease",
        lease.job_id, lease.attempt, lease.phase
    ))
}

/// Job records plus the results they complete into. Completion writes both
/// while the jobs lock is held.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<HashMap<JobId, Job>>,
    results: Arc<InMemoryResultRepository>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completes phases into a result repository shared with readers.
    pub fn with_results(results: Arc<InMemoryResultRepository>) -> Self {
        Self {
            jobs: Mutex::default(),
            results,
        }
    }

    /// Moves every lease expiry into the past, as if the TTL had elapsed.
    pub fn expire_leases(&self) {
        if let Ok(mut jobs) = self.jobs.lock() {
            let past = Utc::now() - chrono::Duration::milliseconds(1);
            for job in jobs.values_mut() {
                if job.lease_expires_at > past {
                    job.lease_expires_at = past;
                }
            }
        }
    }

    fn with_leased<R>(
        &self,
        lease: &Lease,
        f: impl FnOnce(&mut Job) -> R,
    ) -> Result<R, RepositoryError> {
        let mut jobs = lock(&self.jobs)?;
        match jobs.get_mut(&lease.job_id) {
            Some(job) if job.holds_lease(lease) => {
                let out = f(job);
                job.updated_at = Utc::now();
                Ok(out)
            }
            _ => Err(lease_lost(lease)),
        }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn ensure_for_run(
        &self,
        run_id: &RunId,
        chunks_total: u32,
    ) -> Result<Job, RepositoryError> {
        let mut jobs = lock(&self.jobs)?;
        if let Some(existing) = jobs.values().find(|j| &j.run_id == run_id) {
            return Ok(existing.clone());
        }
        let job = Job::new(run_id.clone(), chunks_total);
        jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(lock(&self.jobs)?.get(&id).cloned())
    }

    async fn find_by_run(&self, run_id: &RunId) -> Result<Option<Job>, RepositoryError> {
        Ok(lock(&self.jobs)?
            .values()
            .find(|j| &j.run_id == run_id)
            .cloned())
    }

    async fn acquire_lease(&self, request: &LeaseRequest) -> Result<Option<Job>, RepositoryError> {
        let now = Utc::now();
        let mut jobs = lock(&self.jobs)?;

        let candidate = jobs
            .values()
            .filter(|j| j.is_leasable_for(request.phase, now, request.max_attempts))
            .filter(|j| match &request.scope {
                LeaseScope::Run(run_id) => &j.run_id == run_id,
                LeaseScope::Any => true,
            })
            .min_by_key(|j| (j.lease_expires_at, j.created_at))
            .map(|j| j.id);

        let Some(id) = candidate else {
            return Ok(None);
        };
        let ttl = chrono::Duration::from_std(request.ttl)
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("job {id}")))?;
        job.status = request.phase.running_status();
        job.lease_expires_at = now + ttl;
        job.attempt += 1;
        job.assigned_worker = Some(request.worker_id.clone());
        job.updated_at = now;
        Ok(Some(job.clone()))
    }

    async fn reset_progress(&self, lease: &Lease, chunks_total: u32) -> Result<(), RepositoryError> {
        self.with_leased(lease, |job| job.progress = JobProgress::new(chunks_total))
    }

    async fn record_chunk_success(&self, lease: &Lease) -> Result<(), RepositoryError> {
        self.with_leased(lease, |job| job.progress.chunks_completed += 1)
    }

    async fn record_chunk_error(&self, lease: &Lease, error: &str) -> Result<(), RepositoryError> {
        self.with_leased(lease, |job| job.progress.chunk_errors.push(error.to_string()))
    }

    async fn complete_phase(
        &self,
        lease: &Lease,
        output: &PhaseOutput,
    ) -> Result<(), RepositoryError> {
        let mut jobs = lock(&self.jobs)?;
        let job = jobs
            .get_mut(&lease.job_id)
            .filter(|job| job.holds_lease(lease) && output.phase() == lease.phase)
            .ok_or_else(|| lease_lost(lease))?;

        self.results.apply(&job.run_id, output)?;

        job.status = lease.phase.completed_status();
        job.last_error = None;
        if lease.phase == Phase::Parse {
            job.step = Phase::Generate;
            job.lease_expires_at = DateTime::<Utc>::UNIX_EPOCH;
        }
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn fail_attempt(
        &self,
        lease: &Lease,
        error: &str,
        max_attempts: u32,
    ) -> Result<JobStatus, RepositoryError> {
        self.with_leased(lease, |job| {
            job.last_error = Some(error.to_string());
            job.lease_expires_at = DateTime::<Utc>::UNIX_EPOCH;
            if job.attempt >= max_attempts {
                job.status = JobStatus::Failed;
            }
            job.status
        })
    }

    async fn fail_abandoned(&self, max_attempts: u32) -> Result<u64, RepositoryError> {
        let now = Utc::now();
        let mut jobs = lock(&self.jobs)?;
        let mut failed = 0;
        for job in jobs.values_mut() {
            let running = matches!(job.status, JobStatus::Parsing | JobStatus::Generating);
            if running && job.lease_expires_at < now && job.attempt >= max_attempts {
                job.status = JobStatus::Failed;
                job.last_error
                    .get_or_insert_with(|| "lease expired on final attempt".to_string());
                job.updated_at = now;
                failed += 1;
            }
        }
        Ok(failed)
    }
}

#[derive(Default)]
pub struct InMemorySourceDocumentRepository {
    documents: Mutex<HashMap<RunId, SourceDocument>>,
}

impl InMemorySourceDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SourceDocumentRepository for InMemorySourceDocumentRepository {
    async fn create(&self, document: &SourceDocument) -> Result<(), RepositoryError> {
        let mut documents = lock(&self.documents)?;
        if documents.contains_key(&document.run_id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "source document for {} already exists",
                document.run_id
            )));
        }
        documents.insert(document.run_id.clone(), document.clone());
        Ok(())
    }

    async fn get(&self, run_id: &RunId) -> Result<Option<SourceDocument>, RepositoryError> {
        Ok(lock(&self.documents)?.get(run_id).cloned())
    }

    async fn set_extracted_text(&self, run_id: &RunId, text: &str) -> Result<(), RepositoryError> {
        let mut documents = lock(&self.documents)?;
        if let Some(document) = documents.get_mut(run_id) {
            document
                .extracted_text
                .get_or_insert_with(|| text.to_string());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryResultRepository {
    results: Mutex<HashMap<RunId, PipelineResult>>,
}

impl InMemoryResultRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(&self, run_id: &RunId, output: &PhaseOutput) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let mut results = lock(&self.results)?;
        match output {
            PhaseOutput::Parsed { original } => {
                results
                    .entry(run_id.clone())
                    .and_modify(|r| {
                        r.original = original.clone();
                        r.updated_at = now;
                    })
                    .or_insert_with(|| PipelineResult {
                        run_id: run_id.clone(),
                        original: original.clone(),
                        final_representation: None,
                        score: None,
                        created_at: now,
                        updated_at: now,
                    });
            }
            PhaseOutput::Generated {
                final_representation,
                score,
            } => {
                let result = results
                    .get_mut(run_id)
                    .ok_or_else(|| RepositoryError::NotFound(format!("result for run {run_id}")))?;
                result.final_representation = Some(final_representation.clone());
                result.score = Some(score.clone());
                result.updated_at = now;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for InMemoryResultRepository {
    async fn get(&self, run_id: &RunId) -> Result<Option<PipelineResult>, RepositoryError> {
        Ok(lock(&self.results)?.get(run_id).cloned())
    }
}
