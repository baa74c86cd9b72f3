use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::TextExtractor;
use crate::domain::ContentType;
use crate::presentation::config::ExtractionSettings;

use super::composite_extractor::CompositeExtractor;
use super::pdf_adapter::PdfAdapter;
use super::plain_text_adapter::PlainTextAdapter;

pub struct ExtractorFactory;

impl ExtractorFactory {
    pub fn create(settings: &ExtractionSettings) -> Arc<dyn TextExtractor> {
        let library_dir = settings.pdfium_library_dir.as_deref().map(PathBuf::from);
        tracing::info!(library_dir = ?library_dir, "Loading pdfium PDF adapter");

        Arc::new(CompositeExtractor::new(vec![
            (ContentType::Pdf, Arc::new(PdfAdapter::new(library_dir))),
            (ContentType::Text, Arc::new(PlainTextAdapter)),
        ]))
    }
}
