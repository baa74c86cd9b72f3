use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const RUN_ID_PREFIX: &str = "run_";
const RUN_ID_SUFFIX_LEN: usize = 10;

/// Public identifier of one submitted document, shared by its job, source
/// document, result and queue message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", RUN_ID_PREFIX, &suffix[..RUN_ID_SUFFIX_LEN]))
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Accepts only ids shaped like the ones `new` produces.
    pub fn parse(raw: &str) -> Option<Self> {
        let suffix = raw.strip_prefix(RUN_ID_PREFIX)?;
        let valid = !suffix.is_empty()
            && suffix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
