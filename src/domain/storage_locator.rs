use std::fmt;

use super::RunId;

/// Opaque address of a stored blob, as returned by `BlobStore::put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocator(String);

impl StorageLocator {
    pub fn upload_key(run_id: &RunId, filename: &str) -> String {
        let safe_name: String = filename
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("runs/{}/{}", run_id.as_str(), safe_name)
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
