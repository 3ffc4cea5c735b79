//! Wire model for the time-series backend.
//!
//! The backend speaks a KairosDB-shaped HTTP protocol: datapoint writes go
//! to `api/v1/datapoints`, queries to `api/v1/datapoints/query`. Only the
//! shapes the relay produces and consumes are modeled here.

pub mod client;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use client::{HttpBackend, TimeSeriesClient};

/// Sampling granularity understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

/// Backend-side aggregation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorKind {
    Average,
    Sum,
    Min,
    Max,
}

impl AggregatorKind {
    fn as_str(self) -> &'static str {
        match self {
            AggregatorKind::Average => "avg",
            AggregatorKind::Sum => "sum",
            AggregatorKind::Min => "min",
            AggregatorKind::Max => "max",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sampling {
    pub value: i64,
    pub unit: TimeUnit,
}

/// One aggregator entry attached to a queried metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregator {
    pub name: &'static str,
    pub align_sampling: bool,
    pub sampling: Sampling,
}

impl Aggregator {
    pub fn new(kind: AggregatorKind, period: i64, unit: TimeUnit) -> Self {
        Self {
            name: kind.as_str(),
            align_sampling: true,
            sampling: Sampling {
                value: period,
                unit,
            },
        }
    }
}

/// One metric filter within a datapoints query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryMetricSpec {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aggregators: Vec<Aggregator>,
}

impl QueryMetricSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            aggregators: Vec::new(),
        }
    }

    pub fn add_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.entry(name.into()).or_default().push(value.into());
    }

    pub fn add_aggregator(&mut self, aggregator: Aggregator) {
        self.aggregators.push(aggregator);
    }
}

/// A backend read request over an absolute time range.
#[derive(Debug, Clone, Serialize)]
pub struct DatapointsQuery {
    pub start_absolute: i64,
    pub end_absolute: i64,
    pub metrics: Vec<QueryMetricSpec>,
}

impl DatapointsQuery {
    pub fn new(start_absolute: i64, end_absolute: i64) -> Self {
        Self {
            start_absolute,
            end_absolute,
            metrics: Vec::new(),
        }
    }

    pub fn add_metric(&mut self, metric: QueryMetricSpec) {
        self.metrics.push(metric);
    }
}

/// One metric in a write batch. Datapoints are `[timestamp_millis, value]`
/// pairs.
#[derive(Debug, Clone, Serialize)]
pub struct WriteMetric {
    pub name: String,
    pub datapoints: Vec<(i64, f64)>,
    pub tags: BTreeMap<String, String>,
}

/// A backend write request; the wire format is a bare JSON array.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct MetricBatch {
    pub metrics: Vec<WriteMetric>,
}

impl MetricBatch {
    pub fn from_records(records: Vec<crate::models::Metric>) -> Self {
        let metrics = records
            .into_iter()
            .map(|record| WriteMetric {
                name: record.name,
                datapoints: vec![(record.timestamp, record.value)],
                tags: record
                    .tags
                    .into_iter()
                    .map(|tag| (tag.name, tag.value))
                    .collect(),
            })
            .collect();
        Self { metrics }
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Per-series grouping metadata returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupBy {
    #[serde(default)]
    pub name: String,
}

/// One result series in a backend query response. Tag values are
/// list-valued on the wire even when single-valued.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub group_by: Vec<GroupBy>,
    /// Untyped datapoint rows; decoded cell-by-cell during assembly.
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub sample_size: i64,
    #[serde(default)]
    pub results: Vec<SeriesResult>,
}

/// Top-level backend query response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatapointsResponse {
    #[serde(default)]
    pub queries: Vec<QueryResponse>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Metric, Tag};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn query_serializes_to_backend_shape() {
        let mut spec = QueryMetricSpec::new("request_latency");
        spec.add_tag("check", "ch1");
        spec.add_aggregator(Aggregator::new(AggregatorKind::Average, 2, TimeUnit::Hours));

        let mut query = DatapointsQuery::new(100, 200);
        query.add_metric(spec);

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "start_absolute": 100,
                "end_absolute": 200,
                "metrics": [{
                    "name": "request_latency",
                    "tags": {"check": ["ch1"]},
                    "aggregators": [{
                        "name": "avg",
                        "align_sampling": true,
                        "sampling": {"value": 2, "unit": "hours"}
                    }]
                }]
            })
        );
    }

    #[test]
    fn empty_tags_and_aggregators_are_omitted() {
        let mut query = DatapointsQuery::new(0, 1);
        query.add_metric(QueryMetricSpec::new("lat"));

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "start_absolute": 0,
                "end_absolute": 1,
                "metrics": [{"name": "lat"}]
            })
        );
    }

    #[test]
    fn batch_serializes_as_bare_array() {
        let batch = MetricBatch::from_records(vec![Metric {
            name: "request_latency".to_string(),
            value: 42.0,
            timestamp: 1000,
            tags: vec![Tag::new("check", "ch1")],
        }]);

        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!([{
                "name": "request_latency",
                "datapoints": [[1000, 42.0]],
                "tags": {"check": "ch1"}
            }])
        );
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let response: DatapointsResponse = serde_json::from_value(json!({
            "queries": [{"results": [{"name": "lat"}]}]
        }))
        .unwrap();

        assert_eq!(response.queries.len(), 1);
        assert_eq!(response.queries[0].results[0].name, "lat");
        assert!(response.errors.is_empty());
    }
}
