use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use docpipe::application::ports::{JobStore, ResultRepository, SourceDocumentRepository};
use docpipe::application::services::{
    ChunkOrchestrator, Dispatcher, DispatcherConfig, PhaseExecutor, PhaseExecutorConfig,
    RenderEngineManager, RenderPool, RenderService, RunService,
};
use docpipe::infrastructure::llm::LlmClientFactory;
use docpipe::infrastructure::observability::{TracingConfig, init_tracing};
use docpipe::infrastructure::persistence::{
    InMemoryJobStore, InMemoryResultRepository, InMemorySourceDocumentRepository, PgJobStore,
    PgResultRepository, PgSourceDocumentRepository, create_pool, run_migrations,
};
use docpipe::infrastructure::queue::MessageQueueFactory;
use docpipe::infrastructure::rendering::{ChromiumLauncher, HtmlResumeTemplate};
use docpipe::infrastructure::storage::BlobStoreFactory;
use docpipe::infrastructure::text_processing::ExtractorFactory;
use docpipe::presentation::config::PersistenceProviderSetting;
use docpipe::presentation::{AppState, Environment, Settings, create_router};

struct Stores {
    jobs: Arc<dyn JobStore>,
    documents: Arc<dyn SourceDocumentRepository>,
    results: Arc<dyn ResultRepository>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        TracingConfig::new(
            environment.as_str(),
            settings.logging.enable_json,
            settings.logging.level.as_deref(),
        ),
        settings.role.as_str(),
    );

    let pool = if settings.needs_database() {
        let pool = create_pool(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.connect_retries,
        )
        .await?;
        run_migrations(&pool).await?;
        Some(pool)
    } else {
        None
    };

    let stores = build_stores(&settings, pool.as_ref())?;
    let queue = MessageQueueFactory::create(&settings.queue, pool.as_ref())?;
    let blob_store = BlobStoreFactory::create(&settings.storage)?;

    let shutdown = CancellationToken::new();
    let mut tasks: JoinSet<anyhow::Result<()>> = JoinSet::new();

    if settings.role.runs_dispatcher() {
        let llm = LlmClientFactory::create(&settings.llm)?;
        let orchestrator = Arc::new(ChunkOrchestrator::new(
            llm,
            settings.worker.chunk_concurrency,
        ));
        let executor = Arc::new(PhaseExecutor::new(
            Arc::clone(&stores.jobs),
            Arc::clone(&stores.documents),
            Arc::clone(&blob_store),
            ExtractorFactory::create(&settings.extraction),
            orchestrator,
            PhaseExecutorConfig {
                lease_ttl: Duration::from_millis(settings.worker.lease_ttl_ms),
                max_attempts: settings.worker.max_attempts,
                worker_id: settings.worker.resolved_worker_id(),
            },
        ));
        let dispatcher = Dispatcher::new(
            Arc::clone(&queue),
            executor,
            DispatcherConfig {
                concurrency: settings.worker.concurrency,
                max_batch: settings.queue.max_batch,
                wait_time: Duration::from_millis(settings.queue.wait_time_ms),
                error_backoff: Duration::from_millis(settings.worker.error_backoff_ms),
                reclaim_when_idle: settings.worker.reclaim_when_idle,
            },
        );

        let token = shutdown.clone();
        tasks.spawn(async move {
            dispatcher.run(token).await;
            Ok(())
        });
    }

    if settings.role.serves_http() {
        let manager = Arc::new(RenderEngineManager::new(Arc::new(ChromiumLauncher::new(
            &settings.render.chromium_path,
            Duration::from_millis(settings.render.launch_timeout_ms),
        ))));
        let render_pool = Arc::new(RenderPool::new(
            manager,
            settings.render.concurrency,
            Duration::from_millis(settings.render.timeout_ms),
        ));

        let state = AppState {
            run_service: Arc::new(RunService::new(
                Arc::clone(&blob_store),
                Arc::clone(&stores.documents),
                Arc::clone(&stores.jobs),
                Arc::clone(&stores.results),
                Arc::clone(&queue),
                chrono::Duration::hours(settings.retention_hours),
            )),
            render_service: Arc::new(RenderService::new(
                Arc::clone(&stores.results),
                Arc::new(HtmlResumeTemplate),
                Arc::clone(&render_pool),
            )),
            max_upload_bytes: settings.server.max_upload_bytes,
        };

        let host: std::net::IpAddr = settings
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid server.host: {}", settings.server.host))?;
        let addr = SocketAddr::new(host, settings.server.port);
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        let router = create_router(state);
        let token = shutdown.clone();
        tasks.spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await?;
            if let Err(e) = render_pool.shutdown().await {
                tracing::warn!(error = %e, "Render engine did not shut down cleanly");
            }
            Ok(())
        });
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    tracing::info!("Shutdown signal received");
    shutdown.cancel();

    while let Some(joined) = tasks.join_next().await {
        joined??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_stores(settings: &Settings, pool: Option<&PgPool>) -> anyhow::Result<Stores> {
    match (settings.database.provider, pool) {
        (PersistenceProviderSetting::Postgres, Some(pool)) => Ok(Stores {
            jobs: Arc::new(PgJobStore::new(pool.clone())),
            documents: Arc::new(PgSourceDocumentRepository::new(pool.clone())),
            results: Arc::new(PgResultRepository::new(pool.clone())),
        }),
        (PersistenceProviderSetting::Postgres, None) => {
            anyhow::bail!("database.provider = postgres requires a connection pool")
        }
        (PersistenceProviderSetting::Memory, _) => {
            tracing::warn!("Using in-memory stores; state is lost on restart");
            let results = Arc::new(InMemoryResultRepository::new());
            Ok(Stores {
                jobs: Arc::new(InMemoryJobStore::with_results(Arc::clone(&results))),
                documents: Arc::new(InMemorySourceDocumentRepository::new()),
                results,
            })
        }
    }
}
