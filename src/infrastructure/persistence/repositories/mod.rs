mod in_memory;
mod pg_job_store;
mod pg_result_repository;
mod pg_source_document_repository;

pub use in_memory::{InMemoryJobStore, InMemoryResultRepository, InMemorySourceDocumentRepository};
pub use pg_job_store::PgJobStore;
pub use pg_result_repository::PgResultRepository;
pub use pg_source_document_repository::PgSourceDocumentRepository;
