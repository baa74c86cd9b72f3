use async_trait::async_trait;

/// A launched, expensive rendering engine (e.g. a headless browser).
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Opens an isolated execution context for one render.
    async fn open_context(&self) -> Result<Box<dyn RenderContext>, RenderError>;

    async fn shutdown(&self) -> Result<(), RenderError>;
}

#[async_trait]
pub trait RenderContext: Send {
    async fn render(&mut self, document: &str) -> Result<Vec<u8>, RenderError>;

    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}

/// Starts the engine. Called at most once per `RenderEngineManager`.
#[async_trait]
pub trait RenderEngineLauncher: Send + Sync {
    async fn launch(&self) -> Result<std::sync::Arc<dyn RenderEngine>, RenderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("engine launch failed: {0}")]
    LaunchFailed(String),
    #[error("context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("render failed: {0}")]
    RenderFailed(String),
    #[error("render timed out")]
    Timeout,
    #[error("render pool is shut down")]
    ShutDown,
}
