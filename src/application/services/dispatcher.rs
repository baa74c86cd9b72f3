use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::MessageQueue;
use crate::domain::{QueueMessage, ReceivedMessage};

use super::phase_executor::RunHandler;

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Upper bound on messages being handled at once.
    pub concurrency: usize,
    /// Upper bound on messages fetched per receive.
    pub max_batch: usize,
    pub wait_time: Duration,
    pub error_backoff: Duration,
    /// Run the reclaim sweep when a receive comes back empty.
    pub reclaim_when_idle: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_batch: 10,
            wait_time: Duration::from_secs(20),
            error_backoff: Duration::from_secs(5),
            reclaim_when_idle: true,
        }
    }
}

/// Pulls run messages off the queue and hands each to a `RunHandler`, never
/// holding more than `concurrency` in flight. Only as many messages as there
/// are free slots are fetched, so nothing sits received but unprocessed.
pub struct Dispatcher {
    queue: Arc<dyn MessageQueue>,
    handler: Arc<dyn RunHandler>,
    slots: Arc<Semaphore>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        handler: Arc<dyn RunHandler>,
        config: DispatcherConfig,
    ) -> Self {
        let config = DispatcherConfig {
            concurrency: config.concurrency.max(1),
            max_batch: config.max_batch.max(1),
            ..config
        };
        Self {
            queue,
            handler,
            slots: Arc::new(Semaphore::new(config.concurrency)),
            config,
        }
    }

    /// Number of messages currently being handled.
    pub fn active(&self) -> usize {
        self.config.concurrency - self.slots.available_permits()
    }

    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!(
            concurrency = self.config.concurrency,
            max_batch = self.config.max_batch,
            "Dispatcher started"
        );
        let mut tasks = JoinSet::new();

        loop {
            while let Some(joined) = tasks.try_join_next() {
                log_join_error(joined);
            }

            let first = tokio::select! {
                _ = shutdown.cancelled() => break,
                permit = Arc::clone(&self.slots).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            let mut permits = vec![first];
            while permits.len() < self.config.max_batch {
                match Arc::clone(&self.slots).try_acquire_owned() {
                    Ok(permit) => permits.push(permit),
                    Err(_) => break,
                }
            }

            let received = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.queue.receive(permits.len(), self.config.wait_time) => received,
            };

            match received {
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to receive messages");
                    drop(permits);
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.config.error_backoff) => {}
                    }
                }
                Ok(messages) if messages.is_empty() => {
                    if self.config.reclaim_when_idle {
                        if let Some(permit) = permits.pop() {
                            self.spawn_reclaim(&mut tasks, permit);
                        }
                    }
                }
                Ok(messages) => {
                    tracing::debug!(count = messages.len(), "Received messages");
                    let mut permits = permits.into_iter();
                    for message in messages {
                        match permits.next() {
                            Some(permit) => self.spawn_message(&mut tasks, message, permit),
                            None => tracing::warn!(
                                message_id = %message.message_id,
                                "Queue returned more messages than requested"
                            ),
                        }
                    }
                }
            }
        }

        if !tasks.is_empty() {
            tracing::info!(count = tasks.len(), "Waiting for in-flight messages");
        }
        while let Some(joined) = tasks.join_next().await {
            log_join_error(joined);
        }
        tracing::info!("Dispatcher stopped");
    }

    fn spawn_message(
        &self,
        tasks: &mut JoinSet<()>,
        message: ReceivedMessage,
        permit: OwnedSemaphorePermit,
    ) {
        let queue = Arc::clone(&self.queue);
        let handler = Arc::clone(&self.handler);
        tasks.spawn(async move {
            let _permit = permit;
            handle_message(queue.as_ref(), handler.as_ref(), message).await;
        });
    }

    fn spawn_reclaim(&self, tasks: &mut JoinSet<()>, permit: OwnedSemaphorePermit) {
        let handler = Arc::clone(&self.handler);
        tasks.spawn(
            async move {
                let _permit = permit;
                match handler.reclaim().await {
                    Ok(0) => {}
                    Ok(count) => tracing::info!(count, "Reclaim sweep advanced jobs"),
                    Err(e) => tracing::warn!(error = %e, "Reclaim sweep failed"),
                }
            }
            .instrument(tracing::debug_span!("reclaim_sweep")),
        );
    }
}

/// Processes one message and acknowledges it whatever the outcome. Retries
/// come from job leases, not redelivery.
async fn handle_message(queue: &dyn MessageQueue, handler: &dyn RunHandler, message: ReceivedMessage) {
    match QueueMessage::from_body(&message.body) {
        Ok(body) => {
            let span = tracing::info_span!(
                "pipeline_run",
                run_id = %body.run_id,
                message_id = %message.message_id,
                receive_count = message.receive_count,
            );
            if let Err(e) = handler.handle_run(&body.run_id).instrument(span).await {
                tracing::error!(run_id = %body.run_id, error = %e, "Pipeline run failed");
            }
        }
        Err(e) => {
            tracing::warn!(
                message_id = %message.message_id,
                error = %e,
                "Discarding malformed message"
            );
        }
    }

    if let Err(e) = queue.delete(&message.receipt).await {
        tracing::warn!(message_id = %message.message_id, error = %e, "Failed to acknowledge message");
    }
}

fn log_join_error(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Dispatcher task panicked");
    }
}
