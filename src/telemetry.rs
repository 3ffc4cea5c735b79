use lazy_static::lazy_static;
use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Ingestion metrics
    pub static ref EVENTS_CONSUMED: IntCounter = IntCounter::new(
        "events_consumed_total",
        "Total number of check-result events received from the queue"
    )
    .unwrap();

    pub static ref EVENTS_REJECTED: IntCounter = IntCounter::new(
        "events_rejected_total",
        "Events discarded for missing customer or check id"
    )
    .unwrap();

    pub static ref EVENTS_MALFORMED: IntCounter = IntCounter::new(
        "events_malformed_total",
        "Queue messages that failed to deserialize"
    )
    .unwrap();

    pub static ref RECORDS_EXTRACTED: IntCounter = IntCounter::new(
        "records_extracted_total",
        "Metric records produced by extraction"
    )
    .unwrap();

    pub static ref RECORDS_DISCARDED: IntCounter = IntCounter::new(
        "records_discarded_total",
        "Metric records discarded for having no valid tags"
    )
    .unwrap();

    pub static ref RECORDS_WRITTEN: IntCounter = IntCounter::new(
        "records_written_total",
        "Metric records submitted to the backend"
    )
    .unwrap();

    pub static ref WRITE_FAILURES: IntCounter = IntCounter::new(
        "write_failures_total",
        "Backend write batches that failed"
    )
    .unwrap();

    // Query metrics
    pub static ref QUERY_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("query_duration_seconds", "Backend query round-trip duration")
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0])
    )
    .unwrap();
}

pub fn init_telemetry() {
    REGISTRY.register(Box::new(EVENTS_CONSUMED.clone())).unwrap();
    REGISTRY.register(Box::new(EVENTS_REJECTED.clone())).unwrap();
    REGISTRY.register(Box::new(EVENTS_MALFORMED.clone())).unwrap();
    REGISTRY.register(Box::new(RECORDS_EXTRACTED.clone())).unwrap();
    REGISTRY.register(Box::new(RECORDS_DISCARDED.clone())).unwrap();
    REGISTRY.register(Box::new(RECORDS_WRITTEN.clone())).unwrap();
    REGISTRY.register(Box::new(WRITE_FAILURES.clone())).unwrap();
    REGISTRY.register(Box::new(QUERY_DURATION.clone())).unwrap();
}
