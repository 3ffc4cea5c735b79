use axum::{routing::get, Json, Router};
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value};

use crate::error::{RelayError, Result};
use crate::telemetry::REGISTRY;

/// Health/telemetry router, served on its own listener so probes stay up
/// independently of the query API.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(scrape))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn scrape() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| RelayError::Internal(format!("failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| RelayError::Internal(e.to_string()))
}
