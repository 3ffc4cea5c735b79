//! Query Translator: validates a metrics query request and builds the
//! corresponding backend datapoints query.

use tracing::{debug, warn};

use crate::backend::{Aggregator, AggregatorKind, DatapointsQuery, QueryMetricSpec, TimeUnit};
use crate::error::{RelayError, Result};
use crate::models::GetMetricsRequest;

/// Legacy aggregation-unit table. Exact, case-sensitive match. "seconds"
/// mapping to millisecond granularity is a long-standing quirk preserved
/// for compatibility with existing callers.
fn map_unit(unit: &str) -> Option<TimeUnit> {
    match unit {
        "milliseconds" => Some(TimeUnit::Milliseconds),
        "seconds" => Some(TimeUnit::Milliseconds),
        "minutes" => Some(TimeUnit::Minutes),
        "hours" => Some(TimeUnit::Hours),
        "days" => Some(TimeUnit::Days),
        "weeks" => Some(TimeUnit::Weeks),
        "months" => Some(TimeUnit::Months),
        "years" => Some(TimeUnit::Years),
        _ => None,
    }
}

fn map_statistic(statistic: &str) -> Option<AggregatorKind> {
    match statistic {
        "avg" => Some(AggregatorKind::Average),
        "sum" => Some(AggregatorKind::Sum),
        "min" => Some(AggregatorKind::Min),
        "max" => Some(AggregatorKind::Max),
        _ => None,
    }
}

/// Translates `request` into a backend query.
///
/// Fails without any backend interaction when a time bound is missing,
/// the range is invalid, or the aggregation unit is unrecognized. When no
/// aggregation block is present the query carries no aggregators and the
/// backend returns raw datapoints.
pub fn translate(request: &GetMetricsRequest) -> Result<DatapointsQuery> {
    let start = request
        .absolute_start_time
        .ok_or(RelayError::MissingField("absolute_start_time"))?;
    let end = request
        .absolute_end_time
        .ok_or(RelayError::MissingField("absolute_end_time"))?;

    if start > end || start < 0 || end < 0 || start == end {
        warn!(start, end, "invalid query time range");
        return Err(RelayError::InvalidRange);
    }

    let aggregation = match &request.aggregation {
        Some(aggregation) => {
            let unit = map_unit(&aggregation.unit)
                .ok_or_else(|| RelayError::InvalidAggregationUnit(aggregation.unit.clone()))?;
            let period = if aggregation.period > 0 {
                aggregation.period
            } else {
                1
            };
            Some((unit, period))
        }
        None => None,
    };

    let mut query = DatapointsQuery::new(start, end);
    for metric in &request.metrics {
        if metric.name.is_empty() {
            warn!("query missing metric name");
            continue;
        }

        let mut spec = QueryMetricSpec::new(&metric.name);
        for tag in &metric.tags {
            if !tag.name.is_empty() && !tag.value.is_empty() {
                spec.add_tag(&tag.name, &tag.value);
            }
        }

        if let Some((unit, period)) = aggregation {
            // Aggregation was requested: a metric whose statistic has no
            // aggregator mapping is skipped entirely rather than queried
            // unaggregated.
            let Some(kind) = map_statistic(&metric.statistic) else {
                debug!(metric = %metric.name, statistic = %metric.statistic, "unsupported statistic");
                continue;
            };
            spec.add_aggregator(Aggregator::new(kind, period, unit));
        }

        query.add_metric(spec);
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Aggregation, QueryMetric, Tag};
    use pretty_assertions::assert_eq;

    fn request(start: Option<i64>, end: Option<i64>) -> GetMetricsRequest {
        GetMetricsRequest {
            metrics: vec![QueryMetric {
                name: "lat".to_string(),
                ..Default::default()
            }],
            absolute_start_time: start,
            absolute_end_time: end,
            aggregation: None,
        }
    }

    #[test]
    fn missing_start_time_fails() {
        let err = translate(&request(None, Some(200))).unwrap_err();
        assert!(matches!(err, RelayError::MissingField("absolute_start_time")));
    }

    #[test]
    fn missing_end_time_fails() {
        let err = translate(&request(Some(100), None)).unwrap_err();
        assert!(matches!(err, RelayError::MissingField("absolute_end_time")));
    }

    #[test]
    fn inverted_equal_or_negative_range_fails() {
        for (start, end) in [(200, 100), (100, 100), (-1, 100), (0, -5)] {
            let err = translate(&request(Some(start), Some(end))).unwrap_err();
            assert!(matches!(err, RelayError::InvalidRange), "{start}..{end}");
        }
    }

    #[test]
    fn valid_range_without_aggregation_has_no_aggregators() {
        let query = translate(&request(Some(100), Some(200))).unwrap();

        assert_eq!(query.start_absolute, 100);
        assert_eq!(query.end_absolute, 200);
        assert_eq!(query.metrics.len(), 1);
        assert_eq!(query.metrics[0].name, "lat");
        assert!(query.metrics[0].aggregators.is_empty());
    }

    #[test]
    fn unknown_aggregation_unit_fails() {
        let mut req = request(Some(100), Some(200));
        req.aggregation = Some(Aggregation {
            unit: "banana".to_string(),
            period: 1,
        });

        let err = translate(&req).unwrap_err();
        match err {
            RelayError::InvalidAggregationUnit(unit) => assert_eq!(unit, "banana"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn hours_unit_with_period_two_builds_two_hour_buckets() {
        let mut req = request(Some(100), Some(200));
        req.metrics[0].statistic = "avg".to_string();
        req.aggregation = Some(Aggregation {
            unit: "hours".to_string(),
            period: 2,
        });

        let query = translate(&req).unwrap();
        let aggregator = &query.metrics[0].aggregators[0];
        assert_eq!(aggregator.name, "avg");
        assert_eq!(aggregator.sampling.value, 2);
        assert_eq!(aggregator.sampling.unit, TimeUnit::Hours);
    }

    #[test]
    fn seconds_unit_keeps_legacy_millisecond_granularity() {
        let mut req = request(Some(100), Some(200));
        req.metrics[0].statistic = "sum".to_string();
        req.aggregation = Some(Aggregation {
            unit: "seconds".to_string(),
            period: 5,
        });

        let query = translate(&req).unwrap();
        assert_eq!(
            query.metrics[0].aggregators[0].sampling.unit,
            TimeUnit::Milliseconds
        );
    }

    #[test]
    fn nonpositive_period_defaults_to_one() {
        let mut req = request(Some(100), Some(200));
        req.metrics[0].statistic = "avg".to_string();
        req.aggregation = Some(Aggregation {
            unit: "minutes".to_string(),
            period: 0,
        });

        let query = translate(&req).unwrap();
        assert_eq!(query.metrics[0].aggregators[0].sampling.value, 1);
    }

    #[test]
    fn min_and_max_statistics_map_to_matching_aggregators() {
        for (statistic, expected) in [("min", "min"), ("max", "max")] {
            let mut req = request(Some(100), Some(200));
            req.metrics[0].statistic = statistic.to_string();
            req.aggregation = Some(Aggregation {
                unit: "minutes".to_string(),
                period: 1,
            });

            let query = translate(&req).unwrap();
            assert_eq!(query.metrics[0].aggregators[0].name, expected);
        }
    }

    #[test]
    fn unknown_statistic_skips_metric_when_aggregating() {
        let mut req = request(Some(100), Some(200));
        req.metrics[0].statistic = "p99".to_string();
        req.aggregation = Some(Aggregation {
            unit: "minutes".to_string(),
            period: 1,
        });

        let query = translate(&req).unwrap();
        assert!(query.metrics.is_empty());
    }

    #[test]
    fn empty_metric_name_is_skipped() {
        let mut req = request(Some(100), Some(200));
        req.metrics.push(QueryMetric::default());

        let query = translate(&req).unwrap();
        assert_eq!(query.metrics.len(), 1);
        assert_eq!(query.metrics[0].name, "lat");
    }

    #[test]
    fn empty_tag_filters_are_dropped() {
        let mut req = request(Some(100), Some(200));
        req.metrics[0].tags = vec![
            Tag::new("check", "ch1"),
            Tag::new("", "orphan-value"),
            Tag::new("orphan-name", ""),
        ];

        let query = translate(&req).unwrap();
        assert_eq!(query.metrics[0].tags.len(), 1);
        assert_eq!(query.metrics[0].tags["check"], vec!["ch1".to_string()]);
    }
}
