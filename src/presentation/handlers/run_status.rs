use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::domain::Job;
use crate::presentation::state::AppState;

use super::error_response::{error_response, parse_run_id, pipeline_error_response};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatusResponse {
    pub run_id: String,
    pub status: String,
    pub step: String,
    pub progress: ProgressResponse,
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub total_chunks: u32,
    pub completed_chunks: u32,
    pub chunk_errors: Vec<String>,
}

impl From<Job> for RunStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            run_id: job.run_id.to_string(),
            status: job.status.as_str().to_string(),
            step: job.step.as_str().to_string(),
            progress: ProgressResponse {
                total_chunks: job.progress.chunks_total,
                completed_chunks: job.progress.chunks_completed,
                chunk_errors: job.progress.chunk_errors,
            },
            error: job.last_error,
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn run_status_handler(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> impl IntoResponse {
    let run_id = match parse_run_id(&run_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.run_service.status(&run_id).await {
        Ok(Some(job)) => (StatusCode::OK, Json(RunStatusResponse::from(job))).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("Run not found: {}", run_id),
        ),
        Err(e) => pipeline_error_response(&e),
    }
}
