use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};

use crate::application::ports::{RenderContext, RenderEngine, RenderEngineLauncher, RenderError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextStats {
    pub acquired: u64,
    pub released: u64,
}

/// Owns the single render engine instance. The engine is launched on first
/// use and shared by every context after that.
pub struct RenderEngineManager {
    launcher: Arc<dyn RenderEngineLauncher>,
    engine: Mutex<Option<Arc<dyn RenderEngine>>>,
    shut_down: AtomicBool,
    acquired: AtomicU64,
    released: AtomicU64,
}

impl RenderEngineManager {
    pub fn new(launcher: Arc<dyn RenderEngineLauncher>) -> Self {
        Self {
            launcher,
            engine: Mutex::new(None),
            shut_down: AtomicBool::new(false),
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }

    async fn engine(&self) -> Result<Arc<dyn RenderEngine>, RenderError> {
        let mut slot = self.engine.lock().await;
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }
        if self.shut_down.load(Ordering::Acquire) {
            return Err(RenderError::ShutDown);
        }

        tracing::info!("Launching render engine");
        let engine = self.launcher.launch().await?;
        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }

    pub async fn acquire(&self) -> Result<Box<dyn RenderContext>, RenderError> {
        let engine = self.engine().await?;
        let context = engine.open_context().await?;
        self.acquired.fetch_add(1, Ordering::Relaxed);
        Ok(context)
    }

    pub async fn release(&self, context: Box<dyn RenderContext>) {
        self.released.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = context.close().await {
            tracing::warn!(error = %e, "Failed to close render context");
        }
    }

    pub async fn shutdown(&self) -> Result<(), RenderError> {
        self.shut_down.store(true, Ordering::Release);
        let engine = self.engine.lock().await.take();
        if let Some(engine) = engine {
            engine.shutdown().await?;
            tracing::info!("Render engine shut down");
        }
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.engine.lock().await.is_some()
    }

    pub fn stats(&self) -> ContextStats {
        ContextStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }
}

/// Counts a caller as queued until it is dropped, whether it got a slot or
/// its future was cancelled while waiting.
struct WaitingGuard(Arc<AtomicUsize>);

impl WaitingGuard {
    fn enter(waiting: &Arc<AtomicUsize>) -> Self {
        waiting.fetch_add(1, Ordering::Relaxed);
        Self(Arc::clone(waiting))
    }
}

impl Drop for WaitingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Bounds concurrent renders. Callers beyond the bound wait in arrival order.
pub struct RenderPool {
    manager: Arc<RenderEngineManager>,
    slots: Arc<Semaphore>,
    concurrency: usize,
    waiting: Arc<AtomicUsize>,
    render_timeout: Duration,
}

impl RenderPool {
    pub fn new(manager: Arc<RenderEngineManager>, concurrency: usize, render_timeout: Duration) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            manager,
            slots: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            waiting: Arc::new(AtomicUsize::new(0)),
            render_timeout,
        }
    }

    /// Renders `document` in a fresh context. The render runs on its own task
    /// so the context is released even if the caller goes away.
    pub async fn render(&self, document: &str) -> Result<Vec<u8>, RenderError> {
        let permit = {
            let _waiting = WaitingGuard::enter(&self.waiting);
            Arc::clone(&self.slots).acquire_owned().await
        };
        let permit = permit.map_err(|_| RenderError::ShutDown)?;

        let manager = Arc::clone(&self.manager);
        let document = document.to_owned();
        let render_timeout = self.render_timeout;

        let task = tokio::spawn(async move {
            let _permit = permit;
            let mut context = manager.acquire().await?;
            let result = match tokio::time::timeout(render_timeout, context.render(&document)).await
            {
                Ok(result) => result,
                Err(_) => Err(RenderError::Timeout),
            };
            manager.release(context).await;
            result
        });

        task.await
            .map_err(|e| RenderError::RenderFailed(format!("render task aborted: {e}")))?
    }

    pub fn active(&self) -> usize {
        self.concurrency - self.slots.available_permits()
    }

    pub fn queued(&self) -> usize {
        self.waiting.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> ContextStats {
        self.manager.stats()
    }

    /// Rejects new renders and stops the engine.
    pub async fn shutdown(&self) -> Result<(), RenderError> {
        self.slots.close();
        self.manager.shutdown().await
    }
}
