//! End-to-end checks against a live Redis server.
//!
//! Run with `REDIS_HOST=<host> cargo test -- --ignored`; defaults to
//! 127.0.0.1. Each test uses its own list names so they can run together.
#![cfg(feature = "redis")]

use listmq_connector::adapters::redis::RedisQueueConnector;
use listmq_connector::{Connector, ListTransport};
use listmq_models::{Envelope, Message, Outcome, Pipe, SendableError};
use std::env;
use std::sync::Arc;
use url::Url;

async fn connect() -> (RedisQueueConnector, Arc<dyn ListTransport>) {
    let host = env::var("REDIS_HOST")
        .ok()
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let uri = Url::parse(&format!("redis://{host}")).unwrap();
    let connector = RedisQueueConnector::from_uri(&uri).unwrap();
    let driver = connector.driver().await.unwrap();
    (connector, driver)
}

async fn clear(driver: &Arc<dyn ListTransport>, lists: &[&str]) {
    for list in lists {
        driver.purge(list).await.unwrap();
    }
}

fn rethrow(_: &Envelope, err: SendableError) -> Result<Outcome, SendableError> {
    Err(err)
}

async fn consume_once(connector: &RedisQueueConnector, pipe: &Pipe, outcome: Outcome) -> String {
    let mut body = String::new();
    connector
        .consume(
            pipe,
            &mut |envelope: &Envelope| -> Result<Outcome, SendableError> {
                assert_eq!(envelope.pipe().name(), pipe.name());
                body = envelope.message().body_str().into_owned();
                Ok(outcome | Outcome::EXIT)
            },
            &mut rethrow,
            Some("redis-it"),
        )
        .await
        .unwrap();
    body
}

#[tokio::test]
#[ignore = "needs a running redis server"]
async fn driver_is_reused() {
    let (connector, first) = connect().await;
    let second = connector.driver().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
#[ignore = "needs a running redis server"]
async fn publish_consume_and_requeue() {
    let (connector, driver) = connect().await;
    clear(&driver, &["it_test"]).await;
    let pipe = Pipe::new("it_test");

    connector
        .publish(&Envelope::new(pipe.clone(), Message::new("body")))
        .await
        .unwrap();
    assert_eq!(consume_once(&connector, &pipe, Outcome::ACK).await, "body");

    connector
        .publish(&Envelope::new(pipe.clone(), Message::new("body_requeue")))
        .await
        .unwrap();
    assert_eq!(
        consume_once(&connector, &pipe, Outcome::REQUEUE).await,
        "body_requeue"
    );

    let (other, _) = connect().await;
    assert_eq!(consume_once(&other, &pipe, Outcome::ACK).await, "body_requeue");
    assert_eq!(driver.len("it_test").await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "needs a running redis server"]
async fn nack_feeds_dead_letter() {
    let (connector, driver) = connect().await;
    clear(&driver, &["it_test2", "it_dlq_test2"]).await;
    let dlq = Pipe::new("it_dlq_test2");
    let pipe = Pipe::new("it_test2").with_dead_letter(dlq.clone());

    connector
        .publish(&Envelope::new(pipe.clone(), Message::new("bodydlq_2")))
        .await
        .unwrap();
    assert_eq!(consume_once(&connector, &pipe, Outcome::NACK).await, "bodydlq_2");
    assert_eq!(driver.len("it_dlq_test2").await.unwrap(), 1);

    assert_eq!(consume_once(&connector, &dlq, Outcome::NACK).await, "bodydlq_2");
    assert_eq!(driver.len("it_dlq_test2").await.unwrap(), 0);
}
