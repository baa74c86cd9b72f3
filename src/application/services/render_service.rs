use std::sync::Arc;

use crate::application::ports::{DocumentTemplate, ResultRepository};
use crate::domain::RunId;

use super::pipeline_error::PipelineError;
use super::render_pool::RenderPool;

/// Turns a run's structured result into a PDF.
pub struct RenderService {
    results: Arc<dyn ResultRepository>,
    template: Arc<dyn DocumentTemplate>,
    pool: Arc<RenderPool>,
}

impl RenderService {
    pub fn new(
        results: Arc<dyn ResultRepository>,
        template: Arc<dyn DocumentTemplate>,
        pool: Arc<RenderPool>,
    ) -> Self {
        Self {
            results,
            template,
            pool,
        }
    }

    /// HTML for the optimized representation, or the parsed original if
    /// generation has not finished.
    pub async fn preview_html(&self, run_id: &RunId) -> Result<String, PipelineError> {
        let result = self
            .results
            .get(run_id)
            .await?
            .ok_or_else(|| PipelineError::ResultMissing(run_id.clone()))?;

        let data = result
            .final_representation
            .as_ref()
            .unwrap_or(&result.original);
        Ok(self.template.render(run_id.as_str(), data))
    }

    #[tracing::instrument(skip(self), fields(run_id = %run_id))]
    pub async fn render_run(&self, run_id: &RunId) -> Result<Vec<u8>, PipelineError> {
        let html = self.preview_html(run_id).await?;
        let pdf = self.pool.render(&html).await?;

        tracing::info!(bytes = pdf.len(), "Rendered PDF");
        Ok(pdf)
    }

    pub fn pool(&self) -> &RenderPool {
        &self.pool
    }
}
