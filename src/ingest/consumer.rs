//! Ingestion Consumer: a fixed pool of workers draining the queue, each
//! handling one event end-to-end before taking the next.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::{writer, Delivery, EventQueue};
use crate::backend::TimeSeriesClient;
use crate::extract::extract;
use crate::models::CheckResult;
use crate::telemetry::{EVENTS_CONSUMED, EVENTS_MALFORMED, EVENTS_REJECTED};

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub topic: String,
    pub channel: String,
    /// Number of concurrent handlers.
    pub handler_count: usize,
    /// Capacity of the internal dispatch channel.
    pub queue_depth: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            topic: "_.results".to_string(),
            channel: "metrics-relay-worker".to_string(),
            handler_count: 4,
            queue_depth: 16,
        }
    }
}

pub struct Consumer {
    config: ConsumerConfig,
    client: Arc<dyn TimeSeriesClient>,
    cancel: CancellationToken,
}

impl Consumer {
    pub fn new(config: ConsumerConfig, client: Arc<dyn TimeSeriesClient>) -> Self {
        Self {
            config,
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops intake when cancelled. In-flight and already
    /// dispatched deliveries still drain before `run` returns.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Consumes `queue` until it closes or the token is cancelled, then
    /// drains the workers.
    pub async fn run<Q: EventQueue>(self, mut queue: Q) {
        info!(
            topic = %self.config.topic,
            channel = %self.config.channel,
            handlers = self.config.handler_count,
            "starting ingestion consumer"
        );

        let (tx, rx) = mpsc::channel::<Delivery>(self.config.queue_depth.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let workers: Vec<_> = (0..self.config.handler_count.max(1))
            .map(|worker| {
                let rx = rx.clone();
                let client = self.client.clone();
                tokio::spawn(async move {
                    loop {
                        // Hold the lock only while receiving, not while
                        // handling.
                        let delivery = rx.lock().await.recv().await;
                        let Some(delivery) = delivery else {
                            break;
                        };
                        handle_delivery(delivery, client.as_ref()).await;
                    }
                    debug!(worker, "ingestion worker drained");
                })
            })
            .collect();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("ingestion consumer stopping, draining in-flight handlers");
                    break;
                }
                delivery = queue.next() => {
                    match delivery {
                        Some(delivery) => {
                            if tx.send(delivery).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            info!("event queue closed");
                            break;
                        }
                    }
                }
            }
        }

        // Closing the channel lets workers finish queued deliveries and
        // exit.
        drop(tx);
        join_all(workers).await;
        info!("ingestion consumer stopped");
    }
}

/// Handles one delivery: decode, extract, write, acknowledge.
///
/// Acknowledgment is unconditional after handling; only an undecodable
/// body is handed back for the queue client's retry policy.
async fn handle_delivery(delivery: Delivery, client: &dyn TimeSeriesClient) {
    EVENTS_CONSUMED.inc();

    let event: CheckResult = match serde_json::from_slice(&delivery.body) {
        Ok(event) => event,
        Err(err) => {
            EVENTS_MALFORMED.inc();
            error!(delivery_id = %delivery.id, error = %err, "error decoding message from queue");
            delivery.requeue();
            return;
        }
    };

    let (records, ok) = extract(&event);
    if !ok {
        EVENTS_REJECTED.inc();
        error!(
            customer_id = %event.customer_id,
            check_id = %event.check_id,
            bastion_id = %event.bastion_id,
            "received invalid check result"
        );
    } else {
        writer::write_records(client, records).await;
    }

    delivery.finish();
}
