use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub renders_active: usize,
    pub renders_queued: usize,
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let pool = state.render_service.pool();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            renders_active: pool.active(),
            renders_queued: pool.queued(),
        }),
    )
}
