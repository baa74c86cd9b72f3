use async_trait::async_trait;

use crate::domain::{Job, JobId, JobStatus, Lease, LeaseRequest, PhaseOutput, RunId};

use super::RepositoryError;

/// Durable job records plus the lease protocol that arbitrates who may
/// mutate them. Every mutating method is a single conditional update against
/// the backing store.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Returns the job for `run_id`, creating a `Pending` one if none exists.
    async fn ensure_for_run(&self, run_id: &RunId, chunks_total: u32)
    -> Result<Job, RepositoryError>;

    async fn get(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    async fn find_by_run(&self, run_id: &RunId) -> Result<Option<Job>, RepositoryError>;

    /// Atomically picks one eligible job, moves it to the phase's running
    /// status, extends its lease and increments its attempt. Returns `None`
    /// when nothing is eligible.
    async fn acquire_lease(&self, request: &LeaseRequest) -> Result<Option<Job>, RepositoryError>;

    /// Clears progress counters at the start of a phase attempt.
    async fn reset_progress(&self, lease: &Lease, chunks_total: u32)
    -> Result<(), RepositoryError>;

    /// Counts one finished chunk. Fails with `LeaseLost` once a newer
    /// attempt owns the job.
    async fn record_chunk_success(&self, lease: &Lease) -> Result<(), RepositoryError>;

    async fn record_chunk_error(&self, lease: &Lease, error: &str) -> Result<(), RepositoryError>;

    /// Persists the phase output and moves the leased job to the phase's
    /// completed status in one atomic step, clearing any error left by an
    /// earlier attempt. Parse completion also expires the lease so the job is
    /// immediately eligible for generate. Fails with `LeaseLost`, writing
    /// nothing, if the lease is no longer held.
    async fn complete_phase(
        &self,
        lease: &Lease,
        output: &PhaseOutput,
    ) -> Result<(), RepositoryError>;

    /// Records `error` on a leased job. Releases the lease for a retry while
    /// attempts remain, otherwise marks the job failed. Returns the new status.
    async fn fail_attempt(
        &self,
        lease: &Lease,
        error: &str,
        max_attempts: u32,
    ) -> Result<JobStatus, RepositoryError>;

    /// Fails jobs whose last permitted attempt was abandoned: running, lease
    /// expired, attempt budget spent. Returns how many were failed.
    async fn fail_abandoned(&self, max_attempts: u32) -> Result<u64, RepositoryError>;
}
