use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::application::ports::{MessageQueue, QueueError};
use crate::presentation::config::{QueueProviderSetting, QueueSettings};

use super::in_memory_queue::InMemoryMessageQueue;
use super::pg_message_queue::PgMessageQueue;

pub struct MessageQueueFactory;

impl MessageQueueFactory {
    pub fn create(
        settings: &QueueSettings,
        pool: Option<&PgPool>,
    ) -> Result<Arc<dyn MessageQueue>, QueueError> {
        let visibility_timeout = Duration::from_millis(settings.visibility_timeout_ms);
        match settings.provider {
            QueueProviderSetting::Postgres => {
                let pool = pool.ok_or_else(|| {
                    QueueError::ReceiveFailed("postgres queue requires a database pool".into())
                })?;
                Ok(Arc::new(PgMessageQueue::new(
                    pool.clone(),
                    visibility_timeout,
                    Duration::from_millis(settings.poll_interval_ms),
                )))
            }
            QueueProviderSetting::Memory => {
                Ok(Arc::new(InMemoryMessageQueue::new(visibility_timeout)))
            }
        }
    }
}
