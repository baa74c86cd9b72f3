use docpipe::domain::{JobStatus, Phase};

#[test]
fn given_pending_job_when_skipping_to_generating_then_transition_is_rejected() {
    assert!(!JobStatus::Pending.can_transition_to(JobStatus::Generating));
    assert!(!JobStatus::Pending.can_transition_to(JobStatus::Parsed));
    assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
}

#[test]
fn given_happy_path_statuses_when_walking_in_order_then_every_step_is_allowed() {
    let path = [
        JobStatus::Pending,
        JobStatus::Parsing,
        JobStatus::Parsed,
        JobStatus::Generating,
        JobStatus::Completed,
    ];
    for pair in path.windows(2) {
        assert!(
            pair[0].can_transition_to(pair[1]),
            "{} -> {} should be allowed",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn given_terminal_status_when_transitioning_then_nothing_is_allowed() {
    for next in [JobStatus::Pending, JobStatus::Parsing, JobStatus::Failed] {
        assert!(!JobStatus::Completed.can_transition_to(next));
        assert!(!JobStatus::Failed.can_transition_to(next));
    }
}

#[test]
fn given_non_terminal_status_when_failing_then_transition_is_allowed() {
    for status in [
        JobStatus::Pending,
        JobStatus::Parsing,
        JobStatus::Parsed,
        JobStatus::Generating,
    ] {
        assert!(status.can_transition_to(JobStatus::Failed));
    }
}

#[test]
fn given_running_status_when_reclaimed_then_reentry_is_allowed() {
    assert!(JobStatus::Parsing.can_transition_to(JobStatus::Parsing));
    assert!(JobStatus::Generating.can_transition_to(JobStatus::Generating));
}

#[test]
fn given_status_strings_when_parsing_then_round_trip_through_as_str() {
    assert_eq!("generating".parse::<JobStatus>(), Ok(JobStatus::Generating));
    assert_eq!(JobStatus::Parsed.as_str(), "parsed");
    assert!("queued".parse::<JobStatus>().is_err());
}

#[test]
fn given_phases_when_asking_for_eligibility_then_entry_and_running_statuses_qualify() {
    assert_eq!(
        Phase::Parse.eligible_statuses(),
        [JobStatus::Pending, JobStatus::Parsing]
    );
    assert_eq!(
        Phase::Generate.eligible_statuses(),
        [JobStatus::Parsed, JobStatus::Generating]
    );
    assert_eq!(Phase::Generate.completed_status(), JobStatus::Completed);
}
