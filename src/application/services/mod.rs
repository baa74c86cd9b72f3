mod chunk_orchestrator;
mod dispatcher;
mod keyword_scorer;
mod phase_executor;
mod pipeline_error;
mod prompt_builder;
mod render_pool;
mod render_service;
mod run_service;

pub use chunk_orchestrator::{
    ChunkFailure, ChunkOrchestrator, ChunkRunOutcome, ChunkTask, DEFAULT_CHUNK_CONCURRENCY,
    JobProgressSink, ProgressSink, merge_chunk_outputs,
};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use keyword_scorer::{KeywordMatch, keyword_match, score_card};
pub use phase_executor::{PhaseExecutor, PhaseExecutorConfig, PhaseOutcome, RunHandler};
pub use pipeline_error::PipelineError;
pub use prompt_builder::{DEFAULT_INSTRUCTION, build_generate_prompt, build_parse_prompt};
pub use render_pool::{ContextStats, RenderEngineManager, RenderPool};
pub use render_service::RenderService;
pub use run_service::{RunService, Submission};
