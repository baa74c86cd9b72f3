use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::Instrument;

use crate::application::ports::{
    BlobStore, JobStore, RepositoryError, SourceDocumentRepository, TextExtractor,
};
use crate::domain::{Lease, LeaseRequest, LeaseScope, Phase, PhaseOutput, RunId, SourceDocument};

use super::chunk_orchestrator::{ChunkOrchestrator, ChunkTask, JobProgressSink};
use super::keyword_scorer::score_card;
use super::pipeline_error::PipelineError;
use super::prompt_builder::DEFAULT_INSTRUCTION;

/// Handles the work behind one queue message. The dispatcher only knows this
/// trait.
#[async_trait]
pub trait RunHandler: Send + Sync {
    async fn handle_run(&self, run_id: &RunId) -> Result<(), PipelineError>;

    /// Picks up one abandoned job per phase, if any. Called when the queue is
    /// idle so that runs whose message was lost still make progress.
    async fn reclaim(&self) -> Result<usize, PipelineError>;
}

#[derive(Debug, Clone)]
pub struct PhaseExecutorConfig {
    pub lease_ttl: Duration,
    pub max_attempts: u32,
    pub worker_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    Completed(RunId),
    NotEligible,
}

/// Runs the parse and generate phases of a run under a lease.
pub struct PhaseExecutor {
    job_store: Arc<dyn JobStore>,
    documents: Arc<dyn SourceDocumentRepository>,
    blob_store: Arc<dyn BlobStore>,
    extractor: Arc<dyn TextExtractor>,
    orchestrator: Arc<ChunkOrchestrator>,
    config: PhaseExecutorConfig,
}

impl PhaseExecutor {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        documents: Arc<dyn SourceDocumentRepository>,
        blob_store: Arc<dyn BlobStore>,
        extractor: Arc<dyn TextExtractor>,
        orchestrator: Arc<ChunkOrchestrator>,
        config: PhaseExecutorConfig,
    ) -> Self {
        Self {
            job_store,
            documents,
            blob_store,
            extractor,
            orchestrator,
            config,
        }
    }

    /// Advances a run as far as it can go in one pass: parse if it has not
    /// been parsed, then generate if it is ready for it.
    pub async fn process_run(&self, run_id: &RunId) -> Result<(), PipelineError> {
        let job = self
            .job_store
            .ensure_for_run(run_id, self.orchestrator.chunk_count())
            .await?;

        if job.status.is_pre_parse() {
            self.run_phase(Phase::Parse, LeaseScope::Run(run_id.clone()))
                .await?;
        }

        let Some(job) = self.job_store.find_by_run(run_id).await? else {
            return Ok(());
        };

        if job.status.is_pre_generate() {
            self.run_phase(Phase::Generate, LeaseScope::Run(run_id.clone()))
                .await?;
        }

        Ok(())
    }

    /// Leases one job for `phase` and executes it. A failed attempt is
    /// recorded on the job before the error is returned. If the lease was
    /// taken over by another worker, the output is discarded and the job is
    /// left to its new holder.
    pub async fn run_phase(
        &self,
        phase: Phase,
        scope: LeaseScope,
    ) -> Result<PhaseOutcome, PipelineError> {
        let request = LeaseRequest {
            phase,
            scope,
            ttl: self.config.lease_ttl,
            max_attempts: self.config.max_attempts,
            worker_id: self.config.worker_id.clone(),
        };

        let Some(job) = self.job_store.acquire_lease(&request).await? else {
            tracing::debug!(phase = %phase, scope = ?request.scope, "No eligible job");
            return Ok(PhaseOutcome::NotEligible);
        };

        let lease = job.lease();
        let span = tracing::info_span!(
            "phase",
            run_id = %lease.run_id,
            phase = %phase,
            attempt = lease.attempt,
        );

        async {
            tracing::info!("Lease acquired");
            let completed = match self.execute(&lease).await {
                Ok(output) => self
                    .job_store
                    .complete_phase(&lease, &output)
                    .await
                    .map_err(PipelineError::from),
                Err(e) => Err(e),
            };

            match completed {
                Ok(()) => {
                    tracing::info!("Phase completed");
                    Ok(PhaseOutcome::Completed(lease.run_id.clone()))
                }
                Err(PipelineError::Repository(RepositoryError::LeaseLost(message))) => {
                    tracing::warn!(error = %message, "Lease lost, discarding phase output");
                    Err(RepositoryError::LeaseLost(message).into())
                }
                Err(e) => {
                    let message = e.to_string();
                    let status = self
                        .job_store
                        .fail_attempt(&lease, &message, self.config.max_attempts)
                        .await?;
                    tracing::warn!(error = %message, status = %status, "Phase attempt failed");
                    Err(PipelineError::PhaseFailed {
                        run_id: lease.run_id.clone(),
                        phase,
                        status,
                        message,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, lease: &Lease) -> Result<PhaseOutput, PipelineError> {
        match lease.phase {
            Phase::Parse => self.parse(lease).await,
            Phase::Generate => self.generate(lease).await,
        }
    }

    async fn parse(&self, lease: &Lease) -> Result<PhaseOutput, PipelineError> {
        let document = self.load_document(&lease.run_id).await?;
        let text = self.source_text(&document).await?;

        self.job_store
            .reset_progress(lease, self.orchestrator.chunk_count())
            .await?;
        let progress = JobProgressSink::new(Arc::clone(&self.job_store), lease.clone());
        let outcome = self
            .orchestrator
            .run(&ChunkTask::Parse { source_text: &text }, &progress)
            .await;

        if !outcome.failures.is_empty() {
            tracing::warn!(failed = outcome.failures.len(), "Parse finished with failed chunks");
        }

        Ok(PhaseOutput::Parsed {
            original: outcome.into_value(),
        })
    }

    async fn generate(&self, lease: &Lease) -> Result<PhaseOutput, PipelineError> {
        let document = self.load_document(&lease.run_id).await?;
        let text = document
            .extracted_text
            .as_deref()
            .ok_or_else(|| PipelineError::ExtractedTextMissing(lease.run_id.clone()))?;
        let instruction = document
            .instruction_text
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_INSTRUCTION);
        let job_description = document.job_description.as_deref();

        self.job_store
            .reset_progress(lease, self.orchestrator.chunk_count())
            .await?;
        let progress = JobProgressSink::new(Arc::clone(&self.job_store), lease.clone());
        let task = ChunkTask::Generate {
            source_text: text,
            instruction,
            job_description,
        };
        let outcome = self.orchestrator.run(&task, &progress).await;

        if !outcome.failures.is_empty() {
            tracing::warn!(failed = outcome.failures.len(), "Generate finished with failed chunks");
        }

        let generated = outcome.into_value();
        let score = score_card(text, &generated, job_description);
        tracing::debug!(pre = score.pre, post = score.post, "Scored representation");

        Ok(PhaseOutput::Generated {
            final_representation: generated,
            score,
        })
    }

    async fn load_document(&self, run_id: &RunId) -> Result<SourceDocument, PipelineError> {
        self.documents
            .get(run_id)
            .await?
            .ok_or_else(|| PipelineError::SourceMissing(run_id.clone()))
    }

    /// Extracted text is derived once and stored; later attempts reuse it.
    async fn source_text(&self, document: &SourceDocument) -> Result<String, PipelineError> {
        if let Some(text) = &document.extracted_text {
            return Ok(text.clone());
        }

        let data = self.blob_store.get(&document.locator).await?;
        let text = self.extractor.extract_text(&data, document).await?;
        tracing::debug!(chars = text.len(), "Extracted source text");
        self.documents
            .set_extracted_text(&document.run_id, &text)
            .await?;
        Ok(text)
    }
}

#[async_trait]
impl RunHandler for PhaseExecutor {
    async fn handle_run(&self, run_id: &RunId) -> Result<(), PipelineError> {
        self.process_run(run_id).await
    }

    async fn reclaim(&self) -> Result<usize, PipelineError> {
        let abandoned = self
            .job_store
            .fail_abandoned(self.config.max_attempts)
            .await?;
        if abandoned > 0 {
            tracing::warn!(count = abandoned, "Failed jobs abandoned on their last attempt");
        }

        let mut reclaimed = 0;
        for phase in [Phase::Parse, Phase::Generate] {
            match self.run_phase(phase, LeaseScope::Any).await? {
                PhaseOutcome::Completed(run_id) => {
                    tracing::info!(run_id = %run_id, phase = %phase, "Reclaimed abandoned job");
                    reclaimed += 1;
                }
                PhaseOutcome::NotEligible => {}
            }
        }
        Ok(reclaimed)
    }
}
