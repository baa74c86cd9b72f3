use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{MessageQueue, QueueError};
use crate::domain::{QueueMessage, ReceiptHandle, ReceivedMessage};

const NOTIFY_CHANNEL: &str = "queue_messages";

/// Message queue on a Postgres table. A received row is hidden for the
/// visibility timeout and comes back if not deleted by then. Receivers park on
/// `LISTEN` between polls so a send wakes them immediately.
pub struct PgMessageQueue {
    pool: PgPool,
    listener: Mutex<Option<PgListener>>,
    visibility_timeout: Duration,
    poll_interval: Duration,
}

impl PgMessageQueue {
    pub fn new(pool: PgPool, visibility_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            pool,
            listener: Mutex::new(None),
            visibility_timeout,
            poll_interval,
        }
    }

    async fn claim(&self, max_messages: usize) -> Result<Vec<ReceivedMessage>, QueueError> {
        let visibility_ms = i64::try_from(self.visibility_timeout.as_millis()).unwrap_or(i64::MAX);
        let limit = i64::try_from(max_messages).unwrap_or(i64::MAX);

        let rows: Vec<(Uuid, String, Uuid, i32)> = sqlx::query_as(
            r#"
            WITH next AS (
                SELECT id FROM queue_messages
                WHERE visible_at <= now()
                ORDER BY created_at
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE queue_messages q
            SET receipt = gen_random_uuid(),
                receive_count = q.receive_count + 1,
                visible_at = now() + ($2::bigint * interval '1 millisecond')
            FROM next
            WHERE q.id = next.id
            RETURNING q.id, q.body, q.receipt, q.receive_count
            "#,
        )
        .bind(limit)
        .bind(visibility_ms)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueueError::ReceiveFailed(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, body, receipt, receive_count)| ReceivedMessage {
                message_id: id.to_string(),
                receipt: ReceiptHandle::new(receipt.to_string()),
                body,
                receive_count: receive_count.max(0) as u32,
            })
            .collect())
    }

    /// Parks until a notification arrives or `nap` elapses. Listener failures
    /// degrade to plain polling.
    async fn wait_for_send(&self, nap: Duration) {
        let mut guard = self.listener.lock().await;

        if guard.is_none() {
            match PgListener::connect_with(&self.pool).await {
                Ok(mut listener) => match listener.listen(NOTIFY_CHANNEL).await {
                    Ok(()) => *guard = Some(listener),
                    Err(e) => tracing::warn!(error = %e, "LISTEN failed, falling back to polling"),
                },
                Err(e) => tracing::warn!(error = %e, "Queue listener unavailable, falling back to polling"),
            }
        }

        let Some(listener) = guard.as_mut() else {
            drop(guard);
            tokio::time::sleep(nap).await;
            return;
        };

        let outcome = tokio::time::timeout(nap, listener.recv()).await;
        if let Ok(Err(e)) = outcome {
            tracing::warn!(error = %e, "Queue listener dropped");
            *guard = None;
        }
    }
}

#[async_trait]
impl MessageQueue for PgMessageQueue {
    #[instrument(skip(self, message), fields(run_id = %message.run_id))]
    async fn send(&self, message: &QueueMessage) -> Result<String, QueueError> {
        let id = Uuid::new_v4();
        let body = message.to_body()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| QueueError::SendFailed(e.to_string()))?;

        sqlx::query("INSERT INTO queue_messages (id, body) VALUES ($1, $2)")
            .bind(id)
            .bind(&body)
            .execute(&mut *tx)
            .await
            .map_err(|e| QueueError::SendFailed(e.to_string()))?;

        sqlx::query("SELECT pg_notify($1, '')")
            .bind(NOTIFY_CHANNEL)
            .execute(&mut *tx)
            .await
            .map_err(|e| QueueError::SendFailed(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| QueueError::SendFailed(e.to_string()))?;

        Ok(id.to_string())
    }

    async fn receive(
        &self,
        max_messages: usize,
        wait: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        let deadline = Instant::now() + wait;

        loop {
            let claimed = self.claim(max_messages).await?;
            let now = Instant::now();
            if !claimed.is_empty() || now >= deadline {
                return Ok(claimed);
            }
            self.wait_for_send((deadline - now).min(self.poll_interval))
                .await;
        }
    }

    #[instrument(skip(self), fields(receipt = %receipt.as_str()))]
    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let receipt_id = Uuid::parse_str(receipt.as_str())
            .map_err(|e| QueueError::DeleteFailed(format!("malformed receipt: {e}")))?;

        sqlx::query("DELETE FROM queue_messages WHERE receipt = $1")
            .bind(receipt_id)
            .execute(&self.pool)
            .await
            .map_err(|e| QueueError::DeleteFailed(e.to_string()))?;

        Ok(())
    }
}
