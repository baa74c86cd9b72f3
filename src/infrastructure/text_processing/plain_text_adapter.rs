use async_trait::async_trait;

use crate::application::ports::{TextExtractor, TextExtractorError};
use crate::domain::{ContentType, SourceDocument};

use super::text_sanitizer::sanitize_extracted_text;

pub struct PlainTextAdapter;

#[async_trait]
impl TextExtractor for PlainTextAdapter {
    async fn extract_text(
        &self,
        data: &[u8],
        document: &SourceDocument,
    ) -> Result<String, TextExtractorError> {
        if document.content_type != ContentType::Text {
            return Err(TextExtractorError::UnsupportedContentType(
                document.content_type.as_mime().to_string(),
            ));
        }

        let raw = String::from_utf8(data.to_vec())
            .map_err(|e| TextExtractorError::ExtractionFailed(e.to_string()))?;
        let text = sanitize_extracted_text(&raw);
        if text.is_empty() {
            return Err(TextExtractorError::NoTextFound(
                document.original_filename.clone(),
            ));
        }
        Ok(text)
    }
}
