use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use metrics_relay::api::{self, AppState};
use metrics_relay::backend::{HttpBackend, TimeSeriesClient};
use metrics_relay::config::Config;
use metrics_relay::ingest::{ChannelQueue, Consumer, ConsumerConfig};
use metrics_relay::{logging, telemetry, RelayError, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init_logger(&config.log_level);
    telemetry::init_telemetry();

    info!(
        backend = %config.backend_address,
        topic = %config.topic,
        channel = %config.channel,
        lookupd = ?config.lookupd_addresses,
        "starting metrics relay"
    );

    let backend: Arc<dyn TimeSeriesClient> = Arc::new(HttpBackend::new(&config.backend_address));
    let shutdown = CancellationToken::new();

    // Query API listener.
    let app = api::router(AppState {
        backend: backend.clone(),
    });
    let listener = TcpListener::bind(&config.listen_address)
        .await
        .map_err(|e| RelayError::Internal(format!("failed to bind {}: {}", config.listen_address, e)))?;
    info!(address = %config.listen_address, "query API listening");
    let api_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
            {
                error!(error = %err, "query API server error");
            }
        })
    };

    // Health/telemetry listener.
    let health_listener = TcpListener::bind(&config.health_address)
        .await
        .map_err(|e| RelayError::Internal(format!("failed to bind {}: {}", config.health_address, e)))?;
    info!(address = %config.health_address, "health endpoint listening");
    let health_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(err) = axum::serve(health_listener, api::health::router())
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
            {
                error!(error = %err, "health server error");
            }
        })
    };

    // Ingestion consumer. The queue client binding pushes deliveries into
    // `ingest_tx`; dropping it on shutdown closes the queue.
    let consumer = Consumer::new(
        ConsumerConfig {
            topic: config.topic.clone(),
            channel: config.channel.clone(),
            handler_count: config.handler_count,
            queue_depth: config.handler_count.max(1) * 4,
        },
        backend.clone(),
    );
    let cancel = consumer.cancellation_token();
    let (ingest_tx, queue) = ChannelQueue::new(config.handler_count.max(1) * 4);
    let consumer_task = tokio::spawn(consumer.run(queue));

    shutdown_signal().await;
    info!("shutdown signal received");

    // Stop intake first, then the listeners; in-flight handlers drain.
    cancel.cancel();
    drop(ingest_tx);
    let _ = consumer_task.await;
    shutdown.cancel();
    let _ = api_task.await;
    let _ = health_task.await;

    info!("metrics relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
