//! # Redis Bus Adapter
//!
//! Implements the `Bus` trait on Redis pub/sub using the `redis` crate.
//! Publishing goes through a `ConnectionManager`; receiving uses a dedicated
//! pub/sub connection whose message stream is polled without blocking.

use crate::domain::error::BusError;
use crate::domain::traits::Bus;
use crate::domain::types::Message;
use async_trait::async_trait;
use futures::{FutureExt, Stream, StreamExt};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::pin::Pin;
use tokio::sync::Mutex;

type Inbound = Pin<Box<dyn Stream<Item = redis::Msg> + Send>>;

pub struct RedisBus {
    client: redis::Client,
    publisher: ConnectionManager,
    inbound: Mutex<Option<Inbound>>,
}

impl RedisBus {
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client = redis::Client::open(url).map_err(connection)?;
        let publisher = ConnectionManager::new(client.clone())
            .await
            .map_err(connection)?;
        Ok(Self {
            client,
            publisher,
            inbound: Mutex::new(None),
        })
    }
}

fn connection(err: redis::RedisError) -> BusError {
    BusError::Connection(err.to_string())
}

/// Payloads are UTF-8 text; anything else is decoded lossily rather than dropped.
fn payload_of(msg: &redis::Msg) -> String {
    msg.get_payload::<String>()
        .unwrap_or_else(|_| String::from_utf8_lossy(msg.get_payload_bytes()).into_owned())
}

#[async_trait]
impl Bus for RedisBus {
    async fn subscribe(&self, topics: &[&str]) -> Result<(), BusError> {
        let mut inbound = self.inbound.lock().await;
        if inbound.is_some() {
            return Err(BusError::AlreadySubscribed);
        }
        let mut pubsub = self.client.get_async_pubsub().await.map_err(connection)?;
        for topic in topics {
            pubsub.subscribe(*topic).await.map_err(connection)?;
        }
        *inbound = Some(Box::pin(pubsub.into_on_message()));
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &str) -> Result<(), BusError> {
        let mut conn = self.publisher.clone();
        let receivers: i64 = conn.publish(topic, payload).await.map_err(connection)?;
        tracing::trace!(topic = %topic, receivers, "published");
        Ok(())
    }

    async fn poll(&self) -> Result<Option<Message>, BusError> {
        let mut inbound = self.inbound.lock().await;
        let stream = inbound.as_mut().ok_or(BusError::NotSubscribed)?;
        match stream.next().now_or_never() {
            None => Ok(None),
            // The stream only ends when the pub/sub connection drops.
            Some(None) => Err(BusError::Closed),
            Some(Some(msg)) => Ok(Some(Message::new(msg.get_channel_name(), payload_of(&msg)))),
        }
    }

    async fn close(&self) -> Result<(), BusError> {
        // Dropping the stream drops the pub/sub connection and its subscriptions.
        self.inbound.lock().await.take();
        Ok(())
    }
}
