use async_trait::async_trait;
use tracing::debug;

use super::{DatapointsQuery, DatapointsResponse, MetricBatch};
use crate::error::{RelayError, Result};

const WRITE_PATH: &str = "api/v1/datapoints";
const QUERY_PATH: &str = "api/v1/datapoints/query";

/// Narrow interface to the time-series backend. Implementations must be
/// safe for concurrent use; ingestion workers and query handlers share one
/// instance.
#[async_trait]
pub trait TimeSeriesClient: Send + Sync {
    /// Persist a batch of datapoints.
    async fn write(&self, batch: &MetricBatch) -> Result<()>;

    /// Execute a translated datapoints query.
    async fn query(&self, query: &DatapointsQuery) -> Result<DatapointsResponse>;

    /// Submit a caller-shaped query body verbatim and return the raw
    /// response. Used by the passthrough endpoint.
    async fn query_raw(&self, body: serde_json::Value) -> Result<serde_json::Value>;
}

/// HTTP client for the backend, addressed by base URL.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RelayError::Backend(format!("{}: {}", status, detail)));
        }
        Ok(response)
    }
}

#[async_trait]
impl TimeSeriesClient for HttpBackend {
    async fn write(&self, batch: &MetricBatch) -> Result<()> {
        debug!(metrics = batch.len(), "writing datapoint batch");
        self.post_json(WRITE_PATH, batch).await?;
        Ok(())
    }

    async fn query(&self, query: &DatapointsQuery) -> Result<DatapointsResponse> {
        let response = self.post_json(QUERY_PATH, query).await?;
        Ok(response.json().await?)
    }

    async fn query_raw(&self, body: serde_json::Value) -> Result<serde_json::Value> {
        let response = self.post_json(QUERY_PATH, &body).await?;
        Ok(response.json().await?)
    }
}
