pub mod health;
pub mod query;

use std::sync::Arc;

use axum::{routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::backend::TimeSeriesClient;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn TimeSeriesClient>,
}

/// Query API router. `/metrics/get` is the legacy translated endpoint;
/// `/metrics/query` passes the body through to the backend.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics/get", post(query::get_metrics))
        .route("/metrics/query", post(query::query_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
