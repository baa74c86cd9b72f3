use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    create_run_handler, health_handler, preview_html_handler, render_pdf_handler,
    run_result_handler, run_status_handler,
};
use crate::presentation::state::AppState;

/// Multipart framing on top of the file itself.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes + BODY_LIMIT_SLACK);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/runs", post(create_run_handler))
        .route("/api/v1/runs/{run_id}/status", get(run_status_handler))
        .route("/api/v1/runs/{run_id}/result", get(run_result_handler))
        .route("/api/v1/runs/{run_id}/preview-html", get(preview_html_handler))
        .route("/api/v1/runs/{run_id}/render-pdf", post(render_pdf_handler))
        .layer(body_limit)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
