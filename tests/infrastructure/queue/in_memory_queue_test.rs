use std::sync::Arc;
use std::time::Duration;

use docpipe::application::ports::MessageQueue;
use docpipe::domain::{QueueMessage, RunId};
use docpipe::infrastructure::queue::InMemoryMessageQueue;

#[tokio::test]
async fn given_received_message_when_not_deleted_then_redelivered_after_timeout() {
    let queue = InMemoryMessageQueue::new(Duration::from_millis(100));
    queue.send(&QueueMessage::new(RunId::new())).await.unwrap();

    let first = queue.receive(10, Duration::from_millis(50)).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].receive_count, 1);
    assert_eq!(queue.in_flight_len(), 1);

    let hidden = queue.receive(10, Duration::from_millis(10)).await.unwrap();
    assert!(hidden.is_empty());

    tokio::time::sleep(Duration::from_millis(150)).await;
    let again = queue.receive(10, Duration::from_millis(50)).await.unwrap();

    assert_eq!(again.len(), 1);
    assert_eq!(again[0].message_id, first[0].message_id);
    assert_eq!(again[0].receive_count, 2);
    assert_ne!(again[0].receipt, first[0].receipt);
}

#[tokio::test]
async fn given_deleted_message_when_timeout_lapses_then_not_redelivered() {
    let queue = InMemoryMessageQueue::new(Duration::from_millis(50));
    queue.send(&QueueMessage::new(RunId::new())).await.unwrap();

    let received = queue.receive(1, Duration::from_millis(50)).await.unwrap();
    queue.delete(&received[0].receipt).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let again = queue.receive(1, Duration::from_millis(20)).await.unwrap();
    assert!(again.is_empty());
    assert_eq!(queue.ready_len(), 0);
    assert_eq!(queue.in_flight_len(), 0);
}

#[tokio::test]
async fn given_batch_limit_when_receiving_then_returns_at_most_limit() {
    let queue = InMemoryMessageQueue::new(Duration::from_secs(30));
    for _ in 0..5 {
        queue.send(&QueueMessage::new(RunId::new())).await.unwrap();
    }

    let batch = queue.receive(3, Duration::from_millis(10)).await.unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(queue.ready_len(), 2);
}

#[tokio::test]
async fn given_waiting_receiver_when_message_sent_then_returns_before_deadline() {
    let queue = Arc::new(InMemoryMessageQueue::new(Duration::from_secs(30)));
    let receiver = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            let received = queue.receive(1, Duration::from_secs(10)).await.unwrap();
            (received, started.elapsed())
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let run_id = RunId::new();
    queue.send(&QueueMessage::new(run_id.clone())).await.unwrap();

    let (received, elapsed) = receiver.await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(
        QueueMessage::from_body(&received[0].body).unwrap().run_id,
        run_id
    );
    assert!(elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn given_empty_queue_when_receiving_then_returns_empty_after_wait() {
    let queue = InMemoryMessageQueue::new(Duration::from_secs(30));

    let received = queue.receive(10, Duration::from_millis(30)).await.unwrap();

    assert!(received.is_empty());
}
