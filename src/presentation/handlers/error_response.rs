use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::RenderError;
use crate::application::services::PipelineError;
use crate::domain::RunId;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Rejects path segments that cannot be run ids before touching any store.
pub fn parse_run_id(raw: &str) -> Result<RunId, Response> {
    RunId::parse(raw).ok_or_else(|| {
        error_response(StatusCode::BAD_REQUEST, format!("Invalid run ID: {}", raw))
    })
}

/// Internal details stay in the logs; callers only see a short message.
pub fn pipeline_error_response(error: &PipelineError) -> Response {
    match error {
        PipelineError::ResultMissing(run_id) | PipelineError::SourceMissing(run_id) => {
            error_response(
                StatusCode::NOT_FOUND,
                format!("Result not found: {}", run_id),
            )
        }
        PipelineError::Render(RenderError::Timeout) => {
            error_response(StatusCode::GATEWAY_TIMEOUT, "Render timed out")
        }
        PipelineError::Render(RenderError::ShutDown) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Renderer is shutting down")
        }
        other => {
            tracing::error!(error = %other, "Request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
