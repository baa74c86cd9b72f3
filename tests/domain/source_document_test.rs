use chrono::Duration;
use docpipe::domain::{ContentType, RunId, SourceDocument, StorageLocator};

#[test]
fn given_supported_mime_types_when_parsing_then_content_type_resolved() {
    assert_eq!(ContentType::from_mime("application/pdf"), Some(ContentType::Pdf));
    assert_eq!(ContentType::from_mime("text/plain"), Some(ContentType::Text));
    assert_eq!(ContentType::from_mime("image/png"), None);
}

#[test]
fn given_filename_extension_when_parsing_then_content_type_resolved() {
    assert_eq!(ContentType::from_filename("CV.PDF"), Some(ContentType::Pdf));
    assert_eq!(ContentType::from_filename("notes.txt"), Some(ContentType::Text));
    assert_eq!(ContentType::from_filename("no_extension"), None);
}

#[test]
fn given_run_and_filename_when_building_upload_key_then_key_is_under_runs_prefix() {
    let run_id = RunId::from_raw("run_abcdefghij");

    let key = StorageLocator::upload_key(&run_id, "resume.pdf");

    assert_eq!(key, "runs/run_abcdefghij/resume.pdf");
}

#[test]
fn given_retention_when_creating_document_then_deadline_is_in_the_future() {
    let document = SourceDocument::new(
        RunId::new(),
        "resume.pdf".to_string(),
        ContentType::Pdf,
        StorageLocator::from_raw("runs/x/resume.pdf"),
        None,
        None,
        Duration::hours(72),
    );

    assert!(document.extracted_text.is_none());
    assert_eq!(document.retention_until - document.created_at, Duration::hours(72));
}
