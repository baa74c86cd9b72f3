use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::JobStatus;

/// One of the two top-level stages a job passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Parse,
    Generate,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Parse => "parse",
            Phase::Generate => "generate",
        }
    }

    pub fn entry_status(&self) -> JobStatus {
        match self {
            Phase::Parse => JobStatus::Pending,
            Phase::Generate => JobStatus::Parsed,
        }
    }

    pub fn running_status(&self) -> JobStatus {
        match self {
            Phase::Parse => JobStatus::Parsing,
            Phase::Generate => JobStatus::Generating,
        }
    }

    pub fn completed_status(&self) -> JobStatus {
        match self {
            Phase::Parse => JobStatus::Parsed,
            Phase::Generate => JobStatus::Completed,
        }
    }

    /// Statuses from which a lease for this phase may be taken. The running
    /// marker is included so an abandoned attempt is reclaimed once its lease
    /// has expired.
    pub fn eligible_statuses(&self) -> [JobStatus; 2] {
        [self.entry_status(), self.running_status()]
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parse" => Ok(Phase::Parse),
            "generate" => Ok(Phase::Generate),
            _ => Err(format!("Invalid phase: {}", s)),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
