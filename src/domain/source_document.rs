use chrono::{DateTime, Duration, Utc};

use super::{RunId, StorageLocator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Pdf,
    Text,
}

impl ContentType {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            "text/plain" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Text => "text/plain",
        }
    }
}

/// The uploaded artifact plus the user's instructions. The pipeline only ever
/// writes `extracted_text`, once, during the parse phase.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub run_id: RunId,
    pub original_filename: String,
    pub content_type: ContentType,
    pub locator: StorageLocator,
    pub extracted_text: Option<String>,
    pub instruction_text: Option<String>,
    pub job_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub retention_until: DateTime<Utc>,
}

impl SourceDocument {
    pub fn new(
        run_id: RunId,
        original_filename: String,
        content_type: ContentType,
        locator: StorageLocator,
        instruction_text: Option<String>,
        job_description: Option<String>,
        retention: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            original_filename,
            content_type,
            locator,
            extracted_text: None,
            instruction_text,
            job_description,
            created_at: now,
            retention_until: now + retention,
        }
    }
}
