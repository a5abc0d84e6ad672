use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Counters shared by all ingestion workers of one run
#[derive(Debug, Clone)]
pub struct IngestMetrics {
    files_processed: Arc<AtomicU64>,
    rows_scanned: Arc<AtomicU64>,
    records_accepted: Arc<AtomicU64>,
    tolerated_values: Arc<AtomicU64>,
    non_finite_skipped: Arc<AtomicU64>,
    merges: Arc<AtomicU64>,
}

/// Per-file totals reported by a worker once it finishes its file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileTotals {
    pub rows: u64,
    pub accepted: u64,
    pub tolerated_values: u64,
    pub non_finite_skipped: u64,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self {
            files_processed: Arc::new(AtomicU64::new(0)),
            rows_scanned: Arc::new(AtomicU64::new(0)),
            records_accepted: Arc::new(AtomicU64::new(0)),
            tolerated_values: Arc::new(AtomicU64::new(0)),
            non_finite_skipped: Arc::new(AtomicU64::new(0)),
            merges: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records the totals of one fully processed dataset file
    pub fn record_file(&self, dataset: &str, totals: FileTotals) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.rows_scanned.fetch_add(totals.rows, Ordering::Relaxed);
        self.records_accepted
            .fetch_add(totals.accepted, Ordering::Relaxed);
        self.tolerated_values
            .fetch_add(totals.tolerated_values, Ordering::Relaxed);
        self.non_finite_skipped
            .fetch_add(totals.non_finite_skipped, Ordering::Relaxed);
        debug!(
            "Processed {}: {} rows, {} accepted, {} values read as zero",
            dataset, totals.rows, totals.accepted, totals.tolerated_values
        );
    }

    /// Records one merge of a worker's local records into the shared result set
    pub fn record_merge(&self) {
        self.merges.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> IngestStats {
        IngestStats {
            files_processed: self.files_processed.load(Ordering::Relaxed),
            rows_scanned: self.rows_scanned.load(Ordering::Relaxed),
            records_accepted: self.records_accepted.load(Ordering::Relaxed),
            tolerated_values: self.tolerated_values.load(Ordering::Relaxed),
            non_finite_skipped: self.non_finite_skipped.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
        }
    }

    /// Logs current ingestion statistics
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Ingestion stats:\n\
             Files processed: {}\n\
             Rows scanned: {}\n\
             Records accepted: {}\n\
             Values read as zero: {}\n\
             Non-finite growth skipped: {}\n\
             Result merges: {}",
            stats.files_processed,
            stats.rows_scanned,
            stats.records_accepted,
            stats.tolerated_values,
            stats.non_finite_skipped,
            stats.merges
        );
    }
}

impl Default for IngestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the ingestion counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub files_processed: u64,
    pub rows_scanned: u64,
    pub records_accepted: u64,
    pub tolerated_values: u64,
    pub non_finite_skipped: u64,
    pub merges: u64,
}
