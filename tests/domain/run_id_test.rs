use docpipe::domain::RunId;

#[test]
fn given_new_run_id_when_generated_then_prefixed_with_ten_char_suffix() {
    let id = RunId::new();

    let suffix = id.as_str().strip_prefix("run_").expect("run_ prefix");
    assert_eq!(suffix.len(), 10);
    assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn given_two_run_ids_when_generated_then_distinct() {
    assert_ne!(RunId::new(), RunId::new());
}

#[test]
fn given_well_formed_string_when_parsing_then_accepted() {
    let parsed = RunId::parse("run_ab12cd34ef").expect("valid run id");
    assert_eq!(parsed.as_str(), "run_ab12cd34ef");
}

#[test]
fn given_malformed_string_when_parsing_then_rejected() {
    assert!(RunId::parse("job_ab12cd34ef").is_none());
    assert!(RunId::parse("run_").is_none());
    assert!(RunId::parse("run_../etc").is_none());
}
