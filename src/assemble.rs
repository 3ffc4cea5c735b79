//! Result Assembler: maps a backend query response into the uniform
//! output schema.

use serde_json::Value;

use crate::backend::DatapointsResponse;
use crate::models::{Group, Metric, QueryResult, Tag};

/// Builds query results from `response`.
///
/// Only the first top-level query is read; additional queries in a batch
/// are ignored (legacy contract). A datapoint whose timestamp or value
/// fails to decode is dropped on its own; the rest of the series
/// survives.
pub fn assemble(response: &DatapointsResponse) -> Vec<QueryResult> {
    let mut results = Vec::new();

    // only support one query right now
    let Some(query) = response.queries.first() else {
        return results;
    };

    for series in &query.results {
        // The backend reports tags as value lists even when single-valued;
        // take the first value and skip keys with none.
        let tags: Vec<Tag> = series
            .tags
            .iter()
            .filter_map(|(name, values)| {
                values.first().map(|value| Tag::new(name.clone(), value.clone()))
            })
            .collect();

        let mut metrics = Vec::new();
        for row in &series.values {
            let Some(timestamp) = decode_timestamp(row) else {
                continue;
            };
            let Some(value) = decode_value(row) else {
                continue;
            };
            metrics.push(Metric {
                name: series.name.clone(),
                value,
                timestamp,
                tags: tags.clone(),
            });
        }

        let groups = series
            .group_by
            .iter()
            .map(|group| Group {
                name: group.name.clone(),
            })
            .collect();

        results.push(QueryResult { metrics, groups });
    }

    results
}

fn decode_timestamp(row: &[Value]) -> Option<i64> {
    row.first()?.as_i64()
}

fn decode_value(row: &[Value]) -> Option<f64> {
    row.get(1)?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn response(body: serde_json::Value) -> DatapointsResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn assembles_series_with_tags_and_datapoint() {
        let results = assemble(&response(json!({
            "queries": [{
                "results": [{
                    "name": "request_latency",
                    "tags": {"check": ["c1"]},
                    "values": [[1000, 42.5]]
                }]
            }]
        })));

        assert_eq!(
            results,
            vec![QueryResult {
                metrics: vec![Metric {
                    name: "request_latency".to_string(),
                    value: 42.5,
                    timestamp: 1000,
                    tags: vec![Tag::new("check", "c1")],
                }],
                groups: vec![],
            }]
        );
    }

    #[test]
    fn only_first_query_is_processed() {
        let results = assemble(&response(json!({
            "queries": [
                {"results": [{"name": "a", "tags": {"check": ["c1"]}, "values": [[1, 1.0]]}]},
                {"results": [{"name": "b", "tags": {"check": ["c2"]}, "values": [[2, 2.0]]}]}
            ]
        })));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metrics[0].name, "a");
    }

    #[test]
    fn empty_tag_value_lists_are_skipped() {
        let results = assemble(&response(json!({
            "queries": [{
                "results": [{
                    "name": "lat",
                    "tags": {"check": [], "customer": ["cu1"]},
                    "values": [[1, 1.0]]
                }]
            }]
        })));

        assert_eq!(results[0].metrics[0].tags, vec![Tag::new("customer", "cu1")]);
    }

    #[test]
    fn undecodable_datapoints_are_dropped_individually() {
        let results = assemble(&response(json!({
            "queries": [{
                "results": [{
                    "name": "lat",
                    "tags": {"check": ["c1"]},
                    "values": [
                        ["not-a-timestamp", 1.0],
                        [2000, "not-a-value"],
                        [3000],
                        [4000, 4.0]
                    ]
                }]
            }]
        })));

        assert_eq!(results[0].metrics.len(), 1);
        assert_eq!(results[0].metrics[0].timestamp, 4000);
        assert_eq!(results[0].metrics[0].value, 4.0);
    }

    #[test]
    fn groups_are_copied_by_name() {
        let results = assemble(&response(json!({
            "queries": [{
                "results": [{
                    "name": "lat",
                    "group_by": [{"name": "tag", "tags": ["check"]}],
                    "values": []
                }]
            }]
        })));

        assert_eq!(results[0].groups.len(), 1);
        assert_eq!(results[0].groups[0].name, "tag");
    }

    #[test]
    fn empty_response_assembles_to_nothing() {
        assert!(assemble(&DatapointsResponse::default()).is_empty());
    }
}
