use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;
use uuid::Uuid;

use crate::application::ports::{MessageQueue, QueueError};
use crate::domain::{QueueMessage, ReceiptHandle, ReceivedMessage};

struct Entry {
    id: String,
    body: String,
    receive_count: u32,
}

#[derive(Default)]
struct State {
    ready: VecDeque<Entry>,
    in_flight: HashMap<String, (Entry, Instant)>,
}

/// Process-local queue with the same visibility semantics as the Postgres
/// one.
pub struct InMemoryMessageQueue {
    state: Mutex<State>,
    notify: Notify,
    visibility_timeout: Duration,
}

impl InMemoryMessageQueue {
    pub fn new(visibility_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(State::default()),
            notify: Notify::new(),
            visibility_timeout,
        }
    }

    /// Messages waiting to be received.
    pub fn ready_len(&self) -> usize {
        self.state.lock().map(|s| s.ready.len()).unwrap_or(0)
    }

    /// Messages received but not yet deleted.
    pub fn in_flight_len(&self) -> usize {
        self.state.lock().map(|s| s.in_flight.len()).unwrap_or(0)
    }

    /// Enqueues a body as-is, bypassing serialization.
    pub fn send_raw(&self, body: impl Into<String>) -> Result<String, QueueError> {
        let id = Uuid::new_v4().to_string();
        self.lock()?.ready.push_back(Entry {
            id: id.clone(),
            body: body.into(),
            receive_count: 0,
        });
        self.notify.notify_one();
        Ok(id)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, QueueError> {
        self.state
            .lock()
            .map_err(|_| QueueError::ReceiveFailed("queue lock poisoned".to_string()))
    }

    fn take_ready(&self, max_messages: usize) -> Result<Vec<ReceivedMessage>, QueueError> {
        let now = Instant::now();
        let mut state = self.lock()?;

        let expired: Vec<String> = state
            .in_flight
            .iter()
            .filter(|(_, (_, visible_at))| *visible_at <= now)
            .map(|(receipt, _)| receipt.clone())
            .collect();
        for receipt in expired {
            if let Some((entry, _)) = state.in_flight.remove(&receipt) {
                state.ready.push_back(entry);
            }
        }

        let mut received = Vec::new();
        while received.len() < max_messages {
            let Some(mut entry) = state.ready.pop_front() else {
                break;
            };
            entry.receive_count += 1;
            let receipt = Uuid::new_v4().to_string();
            received.push(ReceivedMessage {
                message_id: entry.id.clone(),
                receipt: ReceiptHandle::new(receipt.clone()),
                body: entry.body.clone(),
                receive_count: entry.receive_count,
            });
            state
                .in_flight
                .insert(receipt, (entry, now + self.visibility_timeout));
        }
        Ok(received)
    }
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn send(&self, message: &QueueMessage) -> Result<String, QueueError> {
        let id = Uuid::new_v4().to_string();
        let body = message.to_body()?;
        self.lock()?.ready.push_back(Entry {
            id: id.clone(),
            body,
            receive_count: 0,
        });
        self.notify.notify_one();
        Ok(id)
    }

    async fn receive(
        &self,
        max_messages: usize,
        wait: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        let deadline = Instant::now() + wait;

        loop {
            let received = self.take_ready(max_messages)?;
            if !received.is_empty() || Instant::now() >= deadline {
                return Ok(received);
            }
            let _ = tokio::time::timeout_at(deadline, self.notify.notified()).await;
        }
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| QueueError::DeleteFailed("queue lock poisoned".to_string()))?;
        state.in_flight.remove(receipt.as_str());
        Ok(())
    }
}
