use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{JobId, Phase, RunId};

/// Which jobs a lease acquisition may pick from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaseScope {
    /// Only the job belonging to this run.
    Run(RunId),
    /// Any eligible job; used by the reclaim sweep.
    Any,
}

#[derive(Debug, Clone)]
pub struct LeaseRequest {
    pub phase: Phase,
    pub scope: LeaseScope,
    pub ttl: Duration,
    pub max_attempts: u32,
    pub worker_id: String,
}

/// Proof of a held lease. `attempt` doubles as the fencing token: a completion
/// is only accepted while the job still carries the same attempt number and
/// the phase's running status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    pub job_id: JobId,
    pub run_id: RunId,
    pub phase: Phase,
    pub attempt: u32,
    pub expires_at: DateTime<Utc>,
}
