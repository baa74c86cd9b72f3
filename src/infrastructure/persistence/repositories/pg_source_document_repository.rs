use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use crate::application::ports::{RepositoryError, SourceDocumentRepository};
use crate::domain::{ContentType, RunId, SourceDocument, StorageLocator};

pub struct PgSourceDocumentRepository {
    pool: PgPool,
}

impl PgSourceDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SourceDocumentRow {
    run_id: String,
    original_filename: String,
    content_type: String,
    locator: String,
    extracted_text: Option<String>,
    instruction_text: Option<String>,
    job_description: Option<String>,
    created_at: DateTime<Utc>,
    retention_until: DateTime<Utc>,
}

impl TryFrom<SourceDocumentRow> for SourceDocument {
    type Error = RepositoryError;

    fn try_from(r: SourceDocumentRow) -> Result<Self, Self::Error> {
        let content_type = ContentType::from_mime(&r.content_type).ok_or_else(|| {
            RepositoryError::QueryFailed(format!("unknown content type: {}", r.content_type))
        })?;

        Ok(SourceDocument {
            run_id: RunId::from_raw(r.run_id),
            original_filename: r.original_filename,
            content_type,
            locator: StorageLocator::from_raw(r.locator),
            extracted_text: r.extracted_text,
            instruction_text: r.instruction_text,
            job_description: r.job_description,
            created_at: r.created_at,
            retention_until: r.retention_until,
        })
    }
}

#[async_trait]
impl SourceDocumentRepository for PgSourceDocumentRepository {
    #[instrument(skip(self, document), fields(run_id = %document.run_id))]
    async fn create(&self, document: &SourceDocument) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO source_documents (run_id, original_filename, content_type, locator,
                                          extracted_text, instruction_text, job_description,
                                          created_at, retention_until)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(document.run_id.as_str())
        .bind(&document.original_filename)
        .bind(document.content_type.as_mime())
        .bind(document.locator.as_str())
        .bind(&document.extracted_text)
        .bind(&document.instruction_text)
        .bind(&document.job_description)
        .bind(document.created_at)
        .bind(document.retention_until)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::ConstraintViolation(format!(
                    "source document for {} already exists",
                    document.run_id
                ))
            }
            _ => RepositoryError::QueryFailed(e.to_string()),
        })?;

        Ok(())
    }

    #[instrument(skip(self), fields(run_id = %run_id))]
    async fn get(&self, run_id: &RunId) -> Result<Option<SourceDocument>, RepositoryError> {
        let row: Option<SourceDocumentRow> = sqlx::query_as(
            r#"
            SELECT run_id, original_filename, content_type, locator, extracted_text,
                   instruction_text, job_description, created_at, retention_until
            FROM source_documents
            WHERE run_id = $1
            "#,
        )
        .bind(run_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(SourceDocument::try_from).transpose()
    }

    #[instrument(skip(self, text), fields(run_id = %run_id, chars = text.len()))]
    async fn set_extracted_text(&self, run_id: &RunId, text: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE source_documents SET extracted_text = $2 WHERE run_id = $1 AND extracted_text IS NULL",
        )
        .bind(run_id.as_str())
        .bind(text)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
