use std::time::Duration;

use docpipe::application::ports::{RenderEngineLauncher, RenderError};
use docpipe::infrastructure::rendering::ChromiumLauncher;

#[tokio::test]
async fn given_missing_binary_when_launching_then_launch_failed() {
    let launcher = ChromiumLauncher::new(
        "/nonexistent/docpipe-chromium",
        Duration::from_secs(2),
    );

    let result = launcher.launch().await;

    assert!(matches!(result, Err(RenderError::LaunchFailed(_))));
}
