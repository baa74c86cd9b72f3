mod chunk;
mod job;
mod job_id;
mod job_status;
mod lease;
mod phase;
mod pipeline_result;
mod queue_message;
mod run_id;
mod source_document;
mod storage_locator;

pub use chunk::{CHUNK_SPECS, ChunkSpec, chunk_count};
pub use job::{Job, JobProgress};
pub use job_id::JobId;
pub use job_status::JobStatus;
pub use lease::{Lease, LeaseRequest, LeaseScope};
pub use phase::Phase;
pub use pipeline_result::{PhaseOutput, PipelineResult, ScoreCard};
pub use queue_message::{QueueMessage, ReceiptHandle, ReceivedMessage};
pub use run_id::RunId;
pub use source_document::{ContentType, SourceDocument};
pub use storage_locator::StorageLocator;
