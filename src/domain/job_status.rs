use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of a pipeline job.
///
/// Jobs advance `Pending -> Parsing -> Parsed -> Generating -> Completed`; any
/// non-terminal status may drop to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Parsing,
    Parsed,
    Generating,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Parsing => "parsing",
            JobStatus::Parsed => "parsed",
            JobStatus::Generating => "generating",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Pending, or a parse attempt whose lease may have lapsed.
    pub fn is_pre_parse(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Parsing)
    }

    /// Parsed, or a generate attempt whose lease may have lapsed.
    pub fn is_pre_generate(&self) -> bool {
        matches!(self, JobStatus::Parsed | JobStatus::Generating)
    }

    /// Running markers may be re-entered when an expired lease is reclaimed.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobStatus::Failed {
            return true;
        }
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Parsing)
                | (JobStatus::Parsing, JobStatus::Parsing)
                | (JobStatus::Parsing, JobStatus::Parsed)
                | (JobStatus::Parsed, JobStatus::Generating)
                | (JobStatus::Generating, JobStatus::Generating)
                | (JobStatus::Generating, JobStatus::Completed)
        )
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "parsing" => Ok(JobStatus::Parsing),
            "parsed" => Ok(JobStatus::Parsed),
            "generating" => Ok(JobStatus::Generating),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
