//! Inserting records into the image set.

use tracing::{error, info, warn};

use crate::feed::FeedEntry;
use crate::store::ImageSetWriter;

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records that were not in the set before
    pub added: usize,
    /// Records already present
    pub existing: usize,
    /// Records that could not be inserted
    pub failed: usize,
}

impl IngestReport {
    /// Total number of records seen.
    pub fn total(&self) -> usize {
        self.added + self.existing + self.failed
    }
}

/// Insert feed entries one by one.
///
/// A failure on one entry is logged and counted; the remaining entries are
/// still processed. Entries with an empty `url` count as failed.
pub async fn ingest_entries<W>(writer: &W, entries: &[FeedEntry]) -> IngestReport
where
    W: ImageSetWriter + ?Sized,
{
    let mut report = IngestReport::default();

    for entry in entries {
        let url = entry.url.trim();
        if url.is_empty() {
            warn!(title = %entry.title, "Skipping entry without url");
            report.failed += 1;
            continue;
        }

        match writer.add(url).await {
            Ok(true) => {
                info!(title = %entry.title, "Added image");
                report.added += 1;
            }
            Ok(false) => {
                info!(title = %entry.title, "Image already present");
                report.existing += 1;
            }
            Err(e) => {
                error!(title = %entry.title, error = %e, "Failed to add image");
                report.failed += 1;
            }
        }
    }

    info!(
        added = report.added,
        existing = report.existing,
        failed = report.failed,
        "Ingestion finished"
    );
    report
}

/// Insert `records` in pipelined batches of `batch_size`.
///
/// A failed batch is logged and counted as failed; later batches still run.
pub async fn insert_batched<W>(writer: &W, records: &[String], batch_size: usize) -> IngestReport
where
    W: ImageSetWriter + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut report = IngestReport::default();
    let mut processed = 0;

    for batch in records.chunks(batch_size) {
        match writer.add_batch(batch).await {
            Ok(added) => {
                report.added += added;
                report.existing += batch.len() - added.min(batch.len());
            }
            Err(e) => {
                error!(error = %e, batch = batch.len(), "Batch insert failed");
                report.failed += batch.len();
            }
        }
        processed += batch.len();
        info!(processed, total = records.len(), "Batch processed");
    }

    report
}
