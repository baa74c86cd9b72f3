use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use pdfium_render::prelude::*;

use crate::application::ports::{TextExtractor, TextExtractorError};
use crate::domain::{ContentType, SourceDocument};

use super::text_sanitizer::sanitize_extracted_text;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Extracts the text layer of a PDF through pdfium.
#[derive(Default)]
pub struct PdfAdapter {
    library_dir: Option<PathBuf>,
}

impl PdfAdapter {
    /// With no directory the system library is used.
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }

    fn bind(library_dir: Option<&PathBuf>) -> Result<Pdfium, TextExtractorError> {
        let bindings = match library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| TextExtractorError::ExtractionFailed(format!("pdfium bind failed: {e}")))?;
        Ok(Pdfium::new(bindings))
    }

    fn extract_pages(
        data: &[u8],
        library_dir: Option<&PathBuf>,
    ) -> Result<Vec<String>, TextExtractorError> {
        let pdfium = Self::bind(library_dir)?;
        let doc = pdfium.load_pdf_from_byte_slice(data, None).map_err(|e| {
            TextExtractorError::ExtractionFailed(format!("failed to parse PDF: {e}"))
        })?;

        let mut pages = Vec::new();
        for (index, page) in doc.pages().iter().enumerate() {
            match page.text() {
                Ok(text) => {
                    let text = text.all();
                    if !text.trim().is_empty() {
                        pages.push(text);
                    }
                }
                Err(e) => tracing::debug!(page = index + 1, error = %e, "Skipping unreadable page"),
            }
        }
        Ok(pages)
    }
}

#[async_trait]
impl TextExtractor for PdfAdapter {
    #[tracing::instrument(
        skip(self, data, document),
        fields(run_id = %document.run_id, filename = %document.original_filename)
    )]
    async fn extract_text(
        &self,
        data: &[u8],
        document: &SourceDocument,
    ) -> Result<String, TextExtractorError> {
        if document.content_type != ContentType::Pdf {
            return Err(TextExtractorError::UnsupportedContentType(
                document.content_type.as_mime().to_string(),
            ));
        }

        let data = data.to_vec();
        let library_dir = self.library_dir.clone();
        let filename = document.original_filename.clone();

        let pages = tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || Self::extract_pages(&data, library_dir.as_ref())),
        )
        .await
        .map_err(|_| TextExtractorError::ExtractionFailed("PDF extraction timed out".to_string()))?
        .map_err(|e| TextExtractorError::ExtractionFailed(format!("task join error: {e}")))??;

        tracing::info!(page_count = pages.len(), "PDF text extraction complete");

        let sanitized: Vec<String> = pages
            .iter()
            .map(|p| sanitize_extracted_text(p))
            .filter(|t| !t.is_empty())
            .collect();

        if sanitized.is_empty() {
            return Err(TextExtractorError::NoTextFound(filename));
        }

        Ok(sanitized.join("\n\n"))
    }
}
