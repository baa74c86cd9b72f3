use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{QueueMessage, ReceiptHandle, ReceivedMessage};

/// At-least-once message queue with long-poll receive and explicit delete.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn send(&self, message: &QueueMessage) -> Result<String, QueueError>;

    /// Blocks until at least one message is available or `wait` elapses,
    /// then returns up to `max_messages`.
    async fn receive(
        &self,
        max_messages: usize,
        wait: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError>;

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError>;
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
