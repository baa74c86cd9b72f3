use std::sync::Arc;

use crate::application::services::{RenderService, RunService};

#[derive(Clone)]
pub struct AppState {
    pub run_service: Arc<RunService>,
    pub render_service: Arc<RenderService>,
    pub max_upload_bytes: usize,
}
