mod create_run;
mod error_response;
mod health;
mod render;
mod run_result;
mod run_status;

pub use create_run::{CreateRunResponse, create_run_handler};
pub use error_response::ErrorResponse;
pub use health::health_handler;
pub use render::{preview_html_handler, render_pdf_handler};
pub use run_result::{RunResultResponse, run_result_handler};
pub use run_status::{ProgressResponse, RunStatusResponse, run_status_handler};
