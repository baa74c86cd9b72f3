use chrono::{DateTime, Utc};

use super::{JobId, JobStatus, Lease, Phase, RunId};

/// Chunk-level progress of the phase currently running on a job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobProgress {
    pub chunks_total: u32,
    pub chunks_completed: u32,
    pub chunk_errors: Vec<String>,
}

impl JobProgress {
    pub fn new(chunks_total: u32) -> Self {
        Self {
            chunks_total,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub run_id: RunId,
    pub status: JobStatus,
    pub step: Phase,
    pub attempt: u32,
    pub last_error: Option<String>,
    pub lease_expires_at: DateTime<Utc>,
    pub assigned_worker: Option<String>,
    pub progress: JobProgress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// A new job starts `Pending` with a lease that is already expired, so it
    /// is immediately eligible for the parse phase.
    pub fn new(run_id: RunId, chunks_total: u32) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            run_id,
            status: JobStatus::Pending,
            step: Phase::Parse,
            attempt: 0,
            last_error: None,
            lease_expires_at: DateTime::<Utc>::UNIX_EPOCH,
            assigned_worker: None,
            progress: JobProgress::new(chunks_total),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_leasable_for(&self, phase: Phase, now: DateTime<Utc>, max_attempts: u32) -> bool {
        self.step == phase
            && phase.eligible_statuses().contains(&self.status)
            && self.lease_expires_at < now
            && self.attempt < max_attempts
    }

    pub fn holds_lease(&self, lease: &Lease) -> bool {
        self.id == lease.job_id
            && self.attempt == lease.attempt
            && self.status == lease.phase.running_status()
    }

    pub fn lease(&self) -> Lease {
        Lease {
            job_id: self.id,
            run_id: self.run_id.clone(),
            phase: self.step,
            attempt: self.attempt,
            expires_at: self.lease_expires_at,
        }
    }
}
