use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::Value;

use crate::domain::{PipelineResult, ScoreCard};
use crate::presentation::state::AppState;

use super::error_response::{error_response, parse_run_id, pipeline_error_response};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResultResponse {
    pub run_id: String,
    pub complete: bool,
    pub original: Value,
    #[serde(rename = "final")]
    pub final_representation: Option<Value>,
    pub score: Option<ScoreCard>,
    pub updated_at: String,
}

impl From<PipelineResult> for RunResultResponse {
    fn from(result: PipelineResult) -> Self {
        Self {
            run_id: result.run_id.to_string(),
            complete: result.is_complete(),
            original: result.original,
            final_representation: result.final_representation,
            score: result.score,
            updated_at: result.updated_at.to_rfc3339(),
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn run_result_handler(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> impl IntoResponse {
    let run_id = match parse_run_id(&run_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.run_service.result(&run_id).await {
        Ok(Some(result)) => {
            (StatusCode::OK, Json(RunResultResponse::from(result))).into_response()
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("Result not found: {}", run_id),
        ),
        Err(e) => pipeline_error_response(&e),
    }
}
