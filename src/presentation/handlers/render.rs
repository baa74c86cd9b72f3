use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

use crate::presentation::state::AppState;

use super::error_response::{parse_run_id, pipeline_error_response};

const PDF_FILENAME: &str = "optimized-resume.pdf";

#[tracing::instrument(skip(state))]
pub async fn preview_html_handler(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> impl IntoResponse {
    let run_id = match parse_run_id(&run_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.render_service.preview_html(&run_id).await {
        Ok(html) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response(),
        Err(e) => pipeline_error_response(&e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn render_pdf_handler(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> impl IntoResponse {
    let run_id = match parse_run_id(&run_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.render_service.render_run(&run_id).await {
        Ok(pdf) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", PDF_FILENAME),
                ),
            ],
            pdf,
        )
            .into_response(),
        Err(e) => pipeline_error_response(&e),
    }
}
