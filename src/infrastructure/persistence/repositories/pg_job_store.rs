use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobStore, RepositoryError};
use crate::domain::{
    Job, JobId, JobProgress, JobStatus, Lease, LeaseRequest, LeaseScope, Phase, PhaseOutput,
    RunId,
};

const JOB_COLUMNS: &str = "id, run_id, status, step, attempt, last_error, lease_expires_at, \
     assigned_worker, chunks_total, chunks_completed, chunk_errors, created_at, updated_at";

/// `JobStore` on Postgres. Every lease-protocol step is one conditional
/// `UPDATE` fenced on `(id, attempt, running status)`; acquisition claims its
/// row with `FOR UPDATE SKIP LOCKED` so concurrent pollers never contend for
/// the same job. Completion locks the fenced row and writes the result in the
/// same transaction.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    run_id: String,
    status: String,
    step: String,
    attempt: i32,
    last_error: Option<String>,
    lease_expires_at: DateTime<Utc>,
    assigned_worker: Option<String>,
    chunks_total: i32,
    chunks_completed: i32,
    chunk_errors: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = RepositoryError;

    fn try_from(r: JobRow) -> Result<Self, Self::Error> {
        let status = r
            .status
            .parse::<JobStatus>()
            .map_err(RepositoryError::QueryFailed)?;
        let step = r.step.parse::<Phase>().map_err(RepositoryError::QueryFailed)?;

        Ok(Job {
            id: JobId::from_uuid(r.id),
            run_id: RunId::from_raw(r.run_id),
            status,
            step,
            attempt: r.attempt.max(0) as u32,
            last_error: r.last_error,
            lease_expires_at: r.lease_expires_at,
            assigned_worker: r.assigned_worker,
            progress: JobProgress {
                chunks_total: r.chunks_total.max(0) as u32,
                chunks_completed: r.chunks_completed.max(0) as u32,
                chunk_errors: r.chunk_errors,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

fn lease_lost(lease: &Lease) -> RepositoryError {
    RepositoryError::LeaseLost(format!(
        "job {} attempt {} no longer holds the {} lease",
        lease.job_id, lease.attempt, lease.phase
    ))
}

async fn write_result(
    tx: &mut Transaction<'_, Postgres>,
    run_id: &str,
    output: &PhaseOutput,
) -> Result<(), RepositoryError> {
    match output {
        PhaseOutput::Parsed { original } => {
            sqlx::query(
                r#"
                INSERT INTO results (run_id, original, created_at, updated_at)
                VALUES ($1, $2, now(), now())
                ON CONFLICT (run_id) DO UPDATE
                SET original = EXCLUDED.original, updated_at = now()
                "#,
            )
            .bind(run_id)
            .bind(Json(original))
            .execute(&mut **tx)
            .await
            .map_err(query_failed)?;
        }
        PhaseOutput::Generated {
            final_representation,
            score,
        } => {
            let result = sqlx::query(
                r#"
                UPDATE results
                SET final_representation = $2, score = $3, updated_at = now()
                WHERE run_id = $1
                "#,
            )
            .bind(run_id)
            .bind(Json(final_representation))
            .bind(Json(score))
            .execute(&mut **tx)
            .await
            .map_err(query_failed)?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound(format!("result for run {run_id}")));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl JobStore for PgJobStore {
    #[instrument(skip(self), fields(run_id = %run_id))]
    async fn ensure_for_run(
        &self,
        run_id: &RunId,
        chunks_total: u32,
    ) -> Result<Job, RepositoryError> {
        let job = Job::new(run_id.clone(), chunks_total);

        sqlx::query(
            r#"
            INSERT INTO jobs (id, run_id, status, step, attempt, lease_expires_at,
                              chunks_total, chunks_completed, chunk_errors, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, $5, $6, 0, '{}', $7, $7)
            ON CONFLICT (run_id) DO NOTHING
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(run_id.as_str())
        .bind(job.status.as_str())
        .bind(job.step.as_str())
        .bind(job.lease_expires_at)
        .bind(chunks_total as i32)
        .bind(job.created_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        self.find_by_run(run_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("job for run {run_id}")))
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let row: Option<JobRow> =
            sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(query_failed)?;

        row.map(Job::try_from).transpose()
    }

    #[instrument(skip(self), fields(run_id = %run_id))]
    async fn find_by_run(&self, run_id: &RunId) -> Result<Option<Job>, RepositoryError> {
        let row: Option<JobRow> =
            sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE run_id = $1"))
                .bind(run_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(query_failed)?;

        row.map(Job::try_from).transpose()
    }

    #[instrument(skip(self, request), fields(phase = %request.phase, worker = %request.worker_id))]
    async fn acquire_lease(&self, request: &LeaseRequest) -> Result<Option<Job>, RepositoryError> {
        let eligible: Vec<&str> = request
            .phase
            .eligible_statuses()
            .iter()
            .map(JobStatus::as_str)
            .collect();
        let scoped_run = match &request.scope {
            LeaseScope::Run(run_id) => Some(run_id.as_str()),
            LeaseScope::Any => None,
        };
        let ttl_ms = i64::try_from(request.ttl.as_millis()).unwrap_or(i64::MAX);

        let row: Option<JobRow> = sqlx::query_as(&format!(
            r#"
            UPDATE jobs
            SET status = $1,
                lease_expires_at = now() + ($2::bigint * interval '1 millisecond'),
                attempt = attempt + 1,
                assigned_worker = $3,
                updated_at = now()
            WHERE id = (
                SELECT id FROM jobs
                WHERE step = $4
                  AND status = ANY($5)
                  AND lease_expires_at < now()
                  AND attempt < $6
                  AND ($7::text IS NULL OR run_id = $7)
                ORDER BY lease_expires_at, created_at
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(request.phase.running_status().as_str())
        .bind(ttl_ms)
        .bind(&request.worker_id)
        .bind(request.phase.as_str())
        .bind(&eligible)
        .bind(request.max_attempts as i32)
        .bind(scoped_run)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        row.map(Job::try_from).transpose()
    }

    #[instrument(skip(self, lease), fields(job_id = %lease.job_id, attempt = lease.attempt))]
    async fn reset_progress(&self, lease: &Lease, chunks_total: u32) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET chunks_total = $4, chunks_completed = 0, chunk_errors = '{}', updated_at = now()
            WHERE id = $1 AND attempt = $2 AND status = $3
            "#,
        )
        .bind(lease.job_id.as_uuid())
        .bind(lease.attempt as i32)
        .bind(lease.phase.running_status().as_str())
        .bind(chunks_total as i32)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(lease_lost(lease));
        }
        Ok(())
    }

    #[instrument(skip(self, lease), fields(job_id = %lease.job_id, attempt = lease.attempt))]
    async fn record_chunk_success(&self, lease: &Lease) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET chunks_completed = chunks_completed + 1, updated_at = now()
            WHERE id = $1 AND attempt = $2 AND status = $3
            "#,
        )
        .bind(lease.job_id.as_uuid())
        .bind(lease.attempt as i32)
        .bind(lease.phase.running_status().as_str())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(lease_lost(lease));
        }
        Ok(())
    }

    #[instrument(skip(self, lease, error), fields(job_id = %lease.job_id, attempt = lease.attempt))]
    async fn record_chunk_error(&self, lease: &Lease, error: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET chunk_errors = array_append(chunk_errors, $4), updated_at = now()
            WHERE id = $1 AND attempt = $2 AND status = $3
            "#,
        )
        .bind(lease.job_id.as_uuid())
        .bind(lease.attempt as i32)
        .bind(lease.phase.running_status().as_str())
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(lease_lost(lease));
        }
        Ok(())
    }

    #[instrument(skip(self, lease, output), fields(job_id = %lease.job_id, phase = %lease.phase))]
    async fn complete_phase(
        &self,
        lease: &Lease,
        output: &PhaseOutput,
    ) -> Result<(), RepositoryError> {
        if output.phase() != lease.phase {
            return Err(lease_lost(lease));
        }

        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        let run_id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT run_id FROM jobs
            WHERE id = $1 AND attempt = $2 AND status = $3
            FOR UPDATE
            "#,
        )
        .bind(lease.job_id.as_uuid())
        .bind(lease.attempt as i32)
        .bind(lease.phase.running_status().as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_failed)?;
        let run_id = run_id.ok_or_else(|| lease_lost(lease))?;

        write_result(&mut tx, &run_id, output).await?;

        let sql = match lease.phase {
            Phase::Parse => {
                r#"
                UPDATE jobs
                SET status = $2, step = $3, last_error = NULL,
                    lease_expires_at = to_timestamp(0), updated_at = now()
                WHERE id = $1
                "#
            }
            Phase::Generate => {
                r#"
                UPDATE jobs
                SET status = $2, step = $3, last_error = NULL, updated_at = now()
                WHERE id = $1
                "#
            }
        };
        sqlx::query(sql)
            .bind(lease.job_id.as_uuid())
            .bind(lease.phase.completed_status().as_str())
            .bind(Phase::Generate.as_str())
            .execute(&mut *tx)
            .await
            .map_err(query_failed)?;

        tx.commit().await.map_err(query_failed)
    }

    #[instrument(skip(self, lease, error), fields(job_id = %lease.job_id, attempt = lease.attempt))]
    async fn fail_attempt(
        &self,
        lease: &Lease,
        error: &str,
        max_attempts: u32,
    ) -> Result<JobStatus, RepositoryError> {
        let status: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE jobs
            SET last_error = $4,
                status = CASE WHEN attempt >= $5 THEN $6 ELSE status END,
                lease_expires_at = to_timestamp(0),
                updated_at = now()
            WHERE id = $1 AND attempt = $2 AND status = $3
            RETURNING status
            "#,
        )
        .bind(lease.job_id.as_uuid())
        .bind(lease.attempt as i32)
        .bind(lease.phase.running_status().as_str())
        .bind(error)
        .bind(max_attempts as i32)
        .bind(JobStatus::Failed.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        status
            .ok_or_else(|| lease_lost(lease))?
            .parse::<JobStatus>()
            .map_err(RepositoryError::QueryFailed)
    }

    #[instrument(skip(self))]
    async fn fail_abandoned(&self, max_attempts: u32) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $1,
                last_error = COALESCE(last_error, 'lease expired on final attempt'),
                updated_at = now()
            WHERE status = ANY($2)
              AND lease_expires_at < now()
              AND attempt >= $3
            "#,
        )
        .bind(JobStatus::Failed.as_str())
        .bind(vec![
            JobStatus::Parsing.as_str(),
            JobStatus::Generating.as_str(),
        ])
        .bind(max_attempts as i32)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(result.rows_affected())
    }
}
