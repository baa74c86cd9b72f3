use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{TextExtractor, TextExtractorError};
use crate::domain::{ContentType, SourceDocument};

use super::link_extractor::append_links_section;

/// Routes each document to the extractor registered for its content type and
/// appends the links found in the result.
pub struct CompositeExtractor {
    adapters: HashMap<ContentType, Arc<dyn TextExtractor>>,
}

impl CompositeExtractor {
    pub fn new(adapters: Vec<(ContentType, Arc<dyn TextExtractor>)>) -> Self {
        Self {
            adapters: adapters.into_iter().collect(),
        }
    }
}

#[async_trait]
impl TextExtractor for CompositeExtractor {
    async fn extract_text(
        &self,
        data: &[u8],
        document: &SourceDocument,
    ) -> Result<String, TextExtractorError> {
        let adapter = self.adapters.get(&document.content_type).ok_or_else(|| {
            TextExtractorError::UnsupportedContentType(document.content_type.as_mime().to_string())
        })?;

        let text = adapter.extract_text(data, document).await?;
        Ok(append_links_section(&text))
    }
}
