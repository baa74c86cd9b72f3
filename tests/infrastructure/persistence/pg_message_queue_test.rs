use std::time::Duration;

use docpipe::application::ports::MessageQueue;
use docpipe::domain::{QueueMessage, RunId};

use crate::helpers::test_postgres::TestPostgres;

#[tokio::test]
async fn given_sent_message_when_received_then_hidden_until_deleted() {
    let pg = TestPostgres::new().await;
    let queue = pg.queue(Duration::from_secs(30));
    let run_id = RunId::new();
    queue.send(&QueueMessage::new(run_id.clone())).await.unwrap();

    let received = queue.receive(10, Duration::from_secs(1)).await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].receive_count, 1);
    assert_eq!(
        QueueMessage::from_body(&received[0].body).unwrap().run_id,
        run_id
    );

    let hidden = queue.receive(10, Duration::from_millis(200)).await.unwrap();
    assert!(hidden.is_empty());

    queue.delete(&received[0].receipt).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM queue_messages")
        .fetch_one(&pg.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn given_undeleted_message_when_visibility_lapses_then_redelivered() {
    let pg = TestPostgres::new().await;
    let queue = pg.queue(Duration::from_millis(300));
    queue.send(&QueueMessage::new(RunId::new())).await.unwrap();

    let first = queue.receive(1, Duration::from_secs(1)).await.unwrap();
    assert_eq!(first.len(), 1);

    tokio::time::sleep(Duration::from_millis(500)).await;
    let again = queue.receive(1, Duration::from_secs(1)).await.unwrap();

    assert_eq!(again.len(), 1);
    assert_eq!(again[0].message_id, first[0].message_id);
    assert_eq!(again[0].receive_count, 2);
}

#[tokio::test]
async fn given_idle_receiver_when_message_sent_then_wakes_before_deadline() {
    let pg = TestPostgres::new().await;
    let queue = std::sync::Arc::new(pg.queue(Duration::from_secs(30)));

    let receiver = {
        let queue = std::sync::Arc::clone(&queue);
        tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            let received = queue.receive(1, Duration::from_secs(10)).await.unwrap();
            (received, started.elapsed())
        })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    queue.send(&QueueMessage::new(RunId::new())).await.unwrap();

    let (received, elapsed) = receiver.await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(elapsed < Duration::from_secs(5));
}
