use std::sync::Arc;

use docpipe::application::ports::{TextExtractor, TextExtractorError};
use docpipe::domain::{ContentType, RunId, SourceDocument, StorageLocator};
use docpipe::infrastructure::text_processing::{
    CompositeExtractor, LINKS_SECTION_HEADER, PlainTextAdapter,
};

fn document(content_type: ContentType) -> SourceDocument {
    SourceDocument::new(
        RunId::new(),
        "resume".to_string(),
        content_type,
        StorageLocator::from_raw("runs/x/resume"),
        None,
        None,
        chrono::Duration::hours(1),
    )
}

fn text_only() -> CompositeExtractor {
    CompositeExtractor::new(vec![(ContentType::Text, Arc::new(PlainTextAdapter))])
}

#[tokio::test]
async fn given_text_with_links_when_extracting_then_links_section_appended() {
    let raw = b"Ada Lovelace\nPortfolio: https://ada.dev\nCode: https://github.com/ada";

    let text = text_only()
        .extract_text(raw, &document(ContentType::Text))
        .await
        .unwrap();

    let expected_tail = format!("{LINKS_SECTION_HEADER}\nhttps://ada.dev\nhttps://github.com/ada");
    assert!(text.starts_with("Ada Lovelace"));
    assert!(text.ends_with(&expected_tail));
}

#[tokio::test]
async fn given_text_without_links_when_extracting_then_no_links_section() {
    let text = text_only()
        .extract_text(b"Ada Lovelace", &document(ContentType::Text))
        .await
        .unwrap();

    assert_eq!(text, "Ada Lovelace");
}

#[tokio::test]
async fn given_unregistered_content_type_when_extracting_then_unsupported() {
    let result = text_only()
        .extract_text(b"%PDF-1.7", &document(ContentType::Pdf))
        .await;

    assert!(matches!(
        result,
        Err(TextExtractorError::UnsupportedContentType(_))
    ));
}
