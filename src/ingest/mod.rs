//! Ingestion: queue abstraction and the worker pool that drives
//! extraction and backend writes.

pub mod consumer;
pub mod writer;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

pub use consumer::{Consumer, ConsumerConfig};

/// Acknowledgment decision returned to the queue client for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Message handled; remove it from the queue.
    Finish,
    /// Message could not be decoded; hand it back for the queue client's
    /// own retry policy.
    Requeue,
}

/// One message pulled off the queue. The acknowledgment channel is
/// consumed exactly once when handling completes.
#[derive(Debug)]
pub struct Delivery {
    pub id: Uuid,
    pub body: Bytes,
    ack: oneshot::Sender<Ack>,
}

impl Delivery {
    pub fn new(body: Bytes) -> (Self, oneshot::Receiver<Ack>) {
        let (ack_tx, ack_rx) = oneshot::channel();
        (
            Self {
                id: Uuid::new_v4(),
                body,
                ack: ack_tx,
            },
            ack_rx,
        )
    }

    pub fn finish(self) {
        // A queue client that went away no longer cares about the ack.
        let _ = self.ack.send(Ack::Finish);
    }

    pub fn requeue(self) {
        let _ = self.ack.send(Ack::Requeue);
    }
}

/// Narrow interface over the inbound queue client. Delivery guarantees,
/// in-flight caps, and redelivery all live behind it.
#[async_trait]
pub trait EventQueue: Send {
    /// Next delivery, or `None` once the queue is closed.
    async fn next(&mut self) -> Option<Delivery>;
}

/// Channel-backed queue. Broker bindings push deliveries into the sender
/// half; tests drive it directly.
pub struct ChannelQueue {
    rx: mpsc::Receiver<Delivery>,
}

impl ChannelQueue {
    pub fn new(capacity: usize) -> (mpsc::Sender<Delivery>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

#[async_trait]
impl EventQueue for ChannelQueue {
    async fn next(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }
}
