use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use serde::Serialize;

use crate::application::services::Submission;
use crate::domain::ContentType;
use crate::presentation::state::AppState;

use super::error_response::{error_response, pipeline_error_response};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRunResponse {
    pub run_id: String,
    pub status: String,
    pub message: String,
}

struct UploadedFile {
    filename: String,
    content_type: ContentType,
    data: Bytes,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn create_run_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut file = None;
    let mut instruction_text = None;
    let mut job_description = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {}", e),
                );
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let Some(content_type) = ContentType::from_mime(&mime)
                    .or_else(|| ContentType::from_filename(&filename))
                else {
                    tracing::warn!(content_type = %mime, "Unsupported content type");
                    return error_response(
                        StatusCode::UNSUPPORTED_MEDIA_TYPE,
                        format!("Unsupported content type: {}", mime),
                    );
                };
                let data = match field.bytes().await {
                    Ok(d) => d,
                    Err(e) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read file: {}", e),
                        );
                    }
                };
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            Some("instruction_text") => instruction_text = read_text(field).await,
            Some("job_description") => job_description = read_text(field).await,
            other => tracing::debug!(field = ?other, "Ignoring multipart field"),
        }
    }

    let Some(file) = file else {
        return error_response(StatusCode::BAD_REQUEST, "A file is required");
    };
    if file.data.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Uploaded file is empty");
    }
    if file.data.len() > state.max_upload_bytes {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("File exceeds {} bytes", state.max_upload_bytes),
        );
    }

    let submission = Submission {
        filename: file.filename,
        content_type: file.content_type,
        data: file.data,
        instruction_text,
        job_description,
    };

    match state.run_service.submit(submission).await {
        Ok(job) => (
            StatusCode::ACCEPTED,
            Json(CreateRunResponse {
                run_id: job.run_id.to_string(),
                status: job.status.as_str().to_string(),
                message: "Your document is being processed".to_string(),
            }),
        )
            .into_response(),
        Err(e) => pipeline_error_response(&e),
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Option<String> {
    match field.text().await {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read text field");
            None
        }
    }
}
