//! Write Adapter: batches extracted records into one backend write.

use tracing::error;

use crate::backend::{MetricBatch, TimeSeriesClient};
use crate::models::Metric;
use crate::telemetry::{RECORDS_WRITTEN, WRITE_FAILURES};

/// Submits `records` as a single write batch.
///
/// A failed write is logged and swallowed: storage is at-most-once and the
/// inbound message is acknowledged regardless. Chunking, if any, is the
/// backend client's concern.
pub async fn write_records(client: &dyn TimeSeriesClient, records: Vec<Metric>) {
    if records.is_empty() {
        return;
    }

    let count = records.len() as u64;
    let batch = MetricBatch::from_records(records);
    match client.write(&batch).await {
        Ok(()) => RECORDS_WRITTEN.inc_by(count),
        Err(err) => {
            WRITE_FAILURES.inc();
            error!(error = %err, "failed to push metrics to backend");
        }
    }
}
