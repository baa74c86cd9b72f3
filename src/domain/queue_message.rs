use serde::{Deserialize, Serialize};

use super::RunId;

/// Body of a pipeline queue message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    pub run_id: RunId,
}

impl QueueMessage {
    pub fn new(run_id: RunId) -> Self {
        Self { run_id }
    }

    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn to_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A message handed out by `MessageQueue::receive`. It stays invisible to
/// other receivers until deleted through its receipt or until the queue's
/// visibility timeout lapses.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub message_id: String,
    pub receipt: ReceiptHandle,
    pub body: String,
    pub receive_count: u32,
}
