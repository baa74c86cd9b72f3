use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;

use crate::application::ports::{RenderContext, RenderEngine, RenderEngineLauncher, RenderError};

/// Launches headless Chromium as the render engine. The engine owns one
/// scratch root; every context is an isolated profile directory below it.
pub struct ChromiumLauncher {
    binary: PathBuf,
    launch_timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(binary: impl Into<PathBuf>, launch_timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            launch_timeout,
        }
    }
}

#[async_trait]
impl RenderEngineLauncher for ChromiumLauncher {
    #[tracing::instrument(skip(self), fields(binary = %self.binary.display()))]
    async fn launch(&self) -> Result<Arc<dyn RenderEngine>, RenderError> {
        let version_check = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.launch_timeout, version_check)
            .await
            .map_err(|_| RenderError::LaunchFailed("chromium did not answer --version".into()))?
            .map_err(|e| RenderError::LaunchFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(RenderError::LaunchFailed(format!(
                "chromium exited with {}",
                output.status
            )));
        }

        let root = tempfile::Builder::new()
            .prefix("docpipe-render-")
            .tempdir()
            .map_err(|e| RenderError::LaunchFailed(e.to_string()))?;

        tracing::info!(
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            root = %root.path().display(),
            "Chromium render engine ready"
        );

        Ok(Arc::new(ChromiumEngine {
            binary: self.binary.clone(),
            root: Mutex::new(Some(root)),
        }))
    }
}

pub struct ChromiumEngine {
    binary: PathBuf,
    root: Mutex<Option<TempDir>>,
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn open_context(&self) -> Result<Box<dyn RenderContext>, RenderError> {
        let root = self
            .root
            .lock()
            .map_err(|_| RenderError::ContextUnavailable("engine lock poisoned".into()))?;
        let root = root.as_ref().ok_or(RenderError::ShutDown)?;

        let dir = tempfile::Builder::new()
            .prefix("ctx-")
            .tempdir_in(root.path())
            .map_err(|e| RenderError::ContextUnavailable(e.to_string()))?;

        Ok(Box::new(ChromiumContext {
            binary: self.binary.clone(),
            dir,
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        let root = self
            .root
            .lock()
            .map_err(|_| RenderError::RenderFailed("engine lock poisoned".into()))?
            .take();
        if let Some(root) = root {
            root.close()
                .map_err(|e| RenderError::RenderFailed(format!("failed to remove scratch root: {e}")))?;
        }
        Ok(())
    }
}

struct ChromiumContext {
    binary: PathBuf,
    dir: TempDir,
}

impl ChromiumContext {
    fn print_args(dir: &Path, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--no-pdf-header-footer".to_string(),
            format!("--user-data-dir={}", dir.join("profile").display()),
            format!("--print-to-pdf={}", output.display()),
            format!("file://{}", input.display()),
        ]
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn render(&mut self, document: &str) -> Result<Vec<u8>, RenderError> {
        let input = self.dir.path().join("document.html");
        let output = self.dir.path().join("document.pdf");

        tokio::fs::write(&input, document)
            .await
            .map_err(|e| RenderError::RenderFailed(format!("failed to stage document: {e}")))?;

        let status = Command::new(&self.binary)
            .args(Self::print_args(self.dir.path(), &input, &output))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| RenderError::RenderFailed(e.to_string()))?;

        if !status.success() {
            return Err(RenderError::RenderFailed(format!("chromium exited with {status}")));
        }

        tokio::fs::read(&output)
            .await
            .map_err(|e| RenderError::RenderFailed(format!("no PDF produced: {e}")))
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        self.dir
            .close()
            .map_err(|e| RenderError::RenderFailed(format!("failed to remove context: {e}")))
    }
}
