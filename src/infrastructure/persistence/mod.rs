mod pg_pool;
mod repositories;

pub use repositories::{
    InMemoryJobStore, InMemoryResultRepository, InMemorySourceDocumentRepository, PgJobStore,
    PgResultRepository, PgSourceDocumentRepository,
};

pub use pg_pool::{create_pool, run_migrations};
