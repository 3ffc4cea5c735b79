//! Event Extractor: turns one inbound check result into zero or more
//! tagged metric records.

use tracing::{debug, warn};

use crate::models::{CheckResult, Metric, Reply, ResponseMetric, Tag, Target};
use crate::telemetry::{RECORDS_DISCARDED, RECORDS_EXTRACTED};

type ExtractorFn = fn(&CheckResult, &Target, &ResponseMetric) -> Option<Metric>;

/// Recognized sub-metric names and their extraction functions. New metric
/// kinds register here without touching the dispatch below.
const EXTRACTORS: &[(&str, ExtractorFn)] = &[("request_latency", build_latency_record)];

fn lookup(name: &str) -> Option<ExtractorFn> {
    EXTRACTORS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, f)| *f)
}

/// Extracts metric records from `event`.
///
/// Returns `(records, false)` with no records when the event carries no
/// customer or check id; such events are discarded upstream without error.
/// Unsupported reply variants and metric names stop extraction of the
/// offending response only, never the whole event.
pub fn extract(event: &CheckResult) -> (Vec<Metric>, bool) {
    if event.customer_id.is_empty() || event.check_id.is_empty() {
        return (Vec::new(), false);
    }

    let mut records = Vec::new();
    'responses: for response in &event.responses {
        let metrics = match &response.reply {
            Some(Reply::HttpResponse { metrics, .. }) => metrics,
            Some(other) => {
                debug!(check_id = %event.check_id, kind = other.kind(), "unsupported check type");
                continue;
            }
            None => {
                debug!(check_id = %event.check_id, "response has no reply");
                continue;
            }
        };

        for metric in metrics {
            let Some(extractor) = lookup(&metric.name) else {
                debug!(check_id = %event.check_id, metric = %metric.name, "unsupported metric type");
                continue 'responses;
            };

            let Some(target) = response.target.as_ref() else {
                debug!(check_id = %event.check_id, metric = %metric.name, "response has no target");
                continue 'responses;
            };

            match extractor(event, target, metric) {
                Some(record) => {
                    RECORDS_EXTRACTED.inc();
                    records.push(record);
                }
                None => {
                    RECORDS_DISCARDED.inc();
                    warn!(
                        customer_id = %event.customer_id,
                        check_id = %event.check_id,
                        metric = %metric.name,
                        "no valid tags found for metric, discarding"
                    );
                }
            }
        }
    }

    (records, true)
}

/// Builds a `request_latency` record. Candidate tags are applied in a
/// fixed order; empty values are dropped. A record left with no tags is
/// unattributable and is not produced.
fn build_latency_record(
    event: &CheckResult,
    target: &Target,
    metric: &ResponseMetric,
) -> Option<Metric> {
    let candidates = [
        ("check", event.check_id.as_str()),
        ("customer", event.customer_id.as_str()),
        ("target", target.id.as_str()),
        ("target_name", target.name.as_str()),
        ("target_type", target.kind.as_str()),
        ("target_addr", target.address.as_str()),
        ("region", event.region.as_str()),
    ];

    let tags: Vec<Tag> = candidates
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| Tag::new(*name, *value))
        .collect();

    if tags.is_empty() {
        return None;
    }

    Some(Metric {
        name: metric.name.clone(),
        value: metric.value,
        timestamp: event.timestamp,
        tags,
    })
}
