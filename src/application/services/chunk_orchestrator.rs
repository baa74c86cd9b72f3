use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};

use crate::application::ports::{JobStore, LlmClient};
use crate::domain::{CHUNK_SPECS, ChunkSpec, Lease};

use super::prompt_builder::{build_generate_prompt, build_parse_prompt};

pub const DEFAULT_CHUNK_CONCURRENCY: usize = 3;

/// What the chunks of one phase are asked to do.
#[derive(Debug, Clone, Copy)]
pub enum ChunkTask<'a> {
    Parse {
        source_text: &'a str,
    },
    Generate {
        source_text: &'a str,
        instruction: &'a str,
        job_description: Option<&'a str>,
    },
}

impl ChunkTask<'_> {
    pub fn prompt_for(&self, spec: &ChunkSpec) -> String {
        match *self {
            ChunkTask::Parse { source_text } => build_parse_prompt(source_text, spec),
            ChunkTask::Generate {
                source_text,
                instruction,
                job_description,
            } => build_generate_prompt(source_text, instruction, job_description, spec),
        }
    }
}

/// Receives per-chunk results as they complete.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn chunk_succeeded(&self, chunk: &str);
    async fn chunk_failed(&self, chunk: &str, error: &str);
}

/// Records chunk progress on the job under the caller's lease. Write
/// failures are logged, never surfaced: progress is advisory, and a lost
/// lease is caught again when the phase tries to complete.
pub struct JobProgressSink {
    job_store: Arc<dyn JobStore>,
    lease: Lease,
}

impl JobProgressSink {
    pub fn new(job_store: Arc<dyn JobStore>, lease: Lease) -> Self {
        Self { job_store, lease }
    }
}

#[async_trait]
impl ProgressSink for JobProgressSink {
    async fn chunk_succeeded(&self, chunk: &str) {
        if let Err(e) = self.job_store.record_chunk_success(&self.lease).await {
            tracing::warn!(error = %e, chunk, "Failed to record chunk progress");
        }
    }

    async fn chunk_failed(&self, chunk: &str, error: &str) {
        let entry = format!("{chunk}: {error}");
        if let Err(e) = self.job_store.record_chunk_error(&self.lease, &entry).await {
            tracing::warn!(error = %e, chunk, "Failed to record chunk error");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFailure {
    pub chunk: String,
    pub message: String,
}

impl std::fmt::Display for ChunkFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.chunk, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRunOutcome {
    pub merged: Map<String, Value>,
    pub succeeded: Vec<String>,
    pub failures: Vec<ChunkFailure>,
}

impl ChunkRunOutcome {
    pub fn into_value(self) -> Value {
        Value::Object(self.merged)
    }
}

/// Fans a phase out into independent per-chunk model calls, at most
/// `concurrency` in flight, and merges whatever succeeds.
pub struct ChunkOrchestrator {
    llm: Arc<dyn LlmClient>,
    specs: Vec<ChunkSpec>,
    concurrency: usize,
}

impl ChunkOrchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, concurrency: usize) -> Self {
        Self::with_specs(llm, CHUNK_SPECS.to_vec(), concurrency)
    }

    pub fn with_specs(llm: Arc<dyn LlmClient>, specs: Vec<ChunkSpec>, concurrency: usize) -> Self {
        Self {
            llm,
            specs,
            concurrency: concurrency.max(1),
        }
    }

    pub fn chunk_count(&self) -> u32 {
        self.specs.len() as u32
    }

    #[tracing::instrument(skip(self, task, progress), fields(chunks = self.specs.len()))]
    pub async fn run(&self, task: &ChunkTask<'_>, progress: &dyn ProgressSink) -> ChunkRunOutcome {
        let outputs: Vec<(ChunkSpec, Result<Map<String, Value>, String>)> =
            stream::iter(self.specs.iter().copied())
                .map(|spec| async move {
                    let result = self.run_chunk(&spec, &task.prompt_for(&spec)).await;
                    match &result {
                        Ok(_) => progress.chunk_succeeded(spec.name).await,
                        Err(e) => {
                            tracing::warn!(chunk = spec.name, error = %e, "Chunk failed");
                            progress.chunk_failed(spec.name, e).await
                        }
                    }
                    (spec, result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let outcome = merge_chunk_outputs(outputs);
        tracing::debug!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failures.len(),
            "Chunks finished"
        );
        outcome
    }

    async fn run_chunk(&self, spec: &ChunkSpec, prompt: &str) -> Result<Map<String, Value>, String> {
        tracing::debug!(chunk = spec.name, "Requesting chunk");
        match self.llm.generate_json(prompt).await {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Merges chunk outputs into one object. Each chunk contributes only the keys
/// it owns, so the result does not depend on completion order.
pub fn merge_chunk_outputs(
    outputs: impl IntoIterator<Item = (ChunkSpec, Result<Map<String, Value>, String>)>,
) -> ChunkRunOutcome {
    let mut merged = Map::new();
    let mut succeeded = Vec::new();
    let mut failures = Vec::new();

    for (spec, result) in outputs {
        match result {
            Ok(map) => {
                for (key, value) in map {
                    if spec.owns(&key) {
                        merged.insert(key, value);
                    } else {
                        tracing::debug!(chunk = spec.name, key = %key, "Dropping unowned key");
                    }
                }
                succeeded.push(spec.name.to_string());
            }
            Err(message) => failures.push(ChunkFailure {
                chunk: spec.name.to_string(),
                message,
            }),
        }
    }

    succeeded.sort();
    failures.sort_by(|a, b| a.chunk.cmp(&b.chunk));

    ChunkRunOutcome {
        merged,
        succeeded,
        failures,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
