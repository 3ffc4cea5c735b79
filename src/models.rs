use serde::{Deserialize, Serialize};

/// One key/value dimension attached to a metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single named, tagged, timestamped numeric sample.
///
/// Timestamps are epoch milliseconds. Tag names are unique by
/// construction; empty tag values are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub timestamp: i64,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Target of a check response (instance, host, etc).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub address: String,
}

/// A named sub-metric inside a check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetric {
    pub name: String,
    pub value: f64,
}

/// Polymorphic reply carried by a check response, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    HttpResponse {
        #[serde(default)]
        code: i32,
        #[serde(default)]
        host: String,
        #[serde(default)]
        metrics: Vec<ResponseMetric>,
    },
    CloudwatchResponse {
        #[serde(default)]
        namespace: String,
    },
}

impl Reply {
    /// Kind label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::HttpResponse { .. } => "http_response",
            Reply::CloudwatchResponse { .. } => "cloudwatch_response",
        }
    }
}

/// One response within a check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub target: Option<Target>,
    #[serde(default)]
    pub reply: Option<Reply>,
}

/// Inbound check-result event, consumed read-only from the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub check_id: String,
    #[serde(default)]
    pub bastion_id: String,
    #[serde(default)]
    pub region: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub responses: Vec<CheckResponse>,
}

/// One requested metric within a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryMetric {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub statistic: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Time-bucket aggregation requested for a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregation {
    pub unit: String,
    #[serde(default)]
    pub period: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetMetricsRequest {
    #[serde(default)]
    pub metrics: Vec<QueryMetric>,
    /// Epoch milliseconds.
    pub absolute_start_time: Option<i64>,
    /// Epoch milliseconds.
    pub absolute_end_time: Option<i64>,
    #[serde(default)]
    pub aggregation: Option<Aggregation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub metrics: Vec<Metric>,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetMetricsResponse {
    pub results: Vec<QueryResult>,
}
