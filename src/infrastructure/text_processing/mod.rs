mod composite_extractor;
mod extractor_factory;
mod link_extractor;
mod pdf_adapter;
mod plain_text_adapter;
mod text_sanitizer;

pub use composite_extractor::CompositeExtractor;
pub use extractor_factory::ExtractorFactory;
pub use link_extractor::{LINKS_SECTION_HEADER, append_links_section};
pub use pdf_adapter::PdfAdapter;
pub use plain_text_adapter::PlainTextAdapter;
pub use text_sanitizer::sanitize_extracted_text;
