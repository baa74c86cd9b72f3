use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use crate::application::ports::{RepositoryError, ResultRepository};
use crate::domain::{PipelineResult, RunId, ScoreCard};

/// Reads results. `PgJobStore::complete_phase` is the only writer.
pub struct PgResultRepository {
    pool: PgPool,
}

impl PgResultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ResultRow {
    run_id: String,
    original: Json<Value>,
    final_representation: Option<Json<Value>>,
    score: Option<Json<ScoreCard>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ResultRow> for PipelineResult {
    fn from(r: ResultRow) -> Self {
        PipelineResult {
            run_id: RunId::from_raw(r.run_id),
            original: r.original.0,
            final_representation: r.final_representation.map(|j| j.0),
            score: r.score.map(|j| j.0),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[async_trait]
impl ResultRepository for PgResultRepository {
    #[instrument(skip(self), fields(run_id = %run_id))]
    async fn get(&self, run_id: &RunId) -> Result<Option<PipelineResult>, RepositoryError> {
        let row: Option<ResultRow> = sqlx::query_as(
            r#"
            SELECT run_id, original, final_representation, score, created_at, updated_at
            FROM results
            WHERE run_id = $1
            "#,
        )
        .bind(run_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(row.map(PipelineResult::from))
    }
}
