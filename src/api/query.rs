use axum::{extract::State, Json};
use tracing::info;

use super::AppState;
use crate::assemble::assemble;
use crate::error::{RelayError, Result};
use crate::models::{GetMetricsRequest, GetMetricsResponse};
use crate::telemetry::QUERY_DURATION;
use crate::translate::translate;

/// Legacy query endpoint: translate, execute, assemble.
///
/// Synchronous per request; a dropped connection drops this future and
/// with it the in-flight backend call.
pub async fn get_metrics(
    State(state): State<AppState>,
    Json(request): Json<GetMetricsRequest>,
) -> Result<Json<GetMetricsResponse>> {
    info!(metrics = request.metrics.len(), "received GetMetrics request");

    let query = translate(&request)?;

    let timer = QUERY_DURATION.start_timer();
    let response = state.backend.query(&query).await?;
    timer.observe_duration();

    Ok(Json(GetMetricsResponse {
        results: assemble(&response),
    }))
}

/// Passthrough query endpoint: the body goes to the backend as-is and the
/// backend's response comes back as-is, except that backend-reported error
/// strings are aggregated into one RPC error.
pub async fn query_metrics(
    State(state): State<AppState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>> {
    info!("received QueryMetrics request");

    let response = state.backend.query_raw(request).await?;

    if let Some(errors) = response.get("errors").and_then(|e| e.as_array()) {
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .filter_map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RelayError::Backend(joined));
        }
    }

    Ok(Json(response))
}
