use chrono::{Duration, Utc};
use docpipe::domain::{Job, JobStatus, Phase, RunId};

#[test]
fn given_new_job_when_created_then_pending_with_expired_lease() {
    let job = Job::new(RunId::new(), 5);

    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.step, Phase::Parse);
    assert_eq!(job.attempt, 0);
    assert_eq!(job.progress.chunks_total, 5);
    assert!(job.lease_expires_at < Utc::now());
}

#[test]
fn given_new_job_when_checking_parse_eligibility_then_leasable() {
    let job = Job::new(RunId::new(), 5);

    assert!(job.is_leasable_for(Phase::Parse, Utc::now(), 3));
    assert!(!job.is_leasable_for(Phase::Generate, Utc::now(), 3));
}

#[test]
fn given_live_lease_when_checking_eligibility_then_not_leasable() {
    let mut job = Job::new(RunId::new(), 5);
    job.status = JobStatus::Parsing;
    job.attempt = 1;
    job.lease_expires_at = Utc::now() + Duration::seconds(60);

    assert!(!job.is_leasable_for(Phase::Parse, Utc::now(), 3));
}

#[test]
fn given_exhausted_attempts_when_checking_eligibility_then_not_leasable() {
    let mut job = Job::new(RunId::new(), 5);
    job.status = JobStatus::Parsing;
    job.attempt = 3;

    assert!(!job.is_leasable_for(Phase::Parse, Utc::now(), 3));
}

#[test]
fn given_leased_job_when_attempt_moves_on_then_old_lease_no_longer_held() {
    let mut job = Job::new(RunId::new(), 5);
    job.status = JobStatus::Parsing;
    job.attempt = 1;
    let lease = job.lease();

    assert!(job.holds_lease(&lease));

    job.attempt = 2;
    assert!(!job.holds_lease(&lease));
}
