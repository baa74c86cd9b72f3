use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Phase, RunId};

/// Keyword match of a representation against the job description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub pre: u8,
    pub post: u8,
    pub missing_keywords: Vec<String>,
}

/// Output of a run: the parsed original, and once generation finishes, the
/// optimized representation with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub run_id: RunId,
    pub original: Value,
    pub final_representation: Option<Value>,
    pub score: Option<ScoreCard>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PipelineResult {
    pub fn is_complete(&self) -> bool {
        self.final_representation.is_some()
    }
}

/// What a phase hands to the job store when it completes. It is persisted in
/// the same step that advances the job, so only the lease holder's output is
/// ever kept.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseOutput {
    Parsed {
        original: Value,
    },
    Generated {
        final_representation: Value,
        score: ScoreCard,
    },
}

impl PhaseOutput {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseOutput::Parsed { .. } => Phase::Parse,
            PhaseOutput::Generated { .. } => Phase::Generate,
        }
    }
}
