use csv::{ByteRecord, ReaderBuilder};
use std::fs::File;
use std::path::Path;
use tracing::{trace, warn};

use crate::errors::{ZhiError, ZhiResult};
use crate::metrics::{FileTotals, IngestMetrics};
use crate::predicate::Predicate;
use crate::record::Record;
use crate::results::DatasetResult;

const BUFFER_CAPACITY: usize = 65536;

/// Scans dataset files and keeps the records accepted by one compiled predicate
#[derive(Debug)]
pub struct DatasetProcessor {
    predicate: Predicate,
    skip_non_finite: bool,
    metrics: IngestMetrics,
}

impl DatasetProcessor {
    /// Creates a new DatasetProcessor for the given predicate
    pub fn new(predicate: Predicate, skip_non_finite: bool) -> Self {
        Self::with_metrics(predicate, skip_non_finite, IngestMetrics::new())
    }

    /// Creates a new DatasetProcessor reporting into existing metrics
    pub fn with_metrics(predicate: Predicate, skip_non_finite: bool, metrics: IngestMetrics) -> Self {
        Self {
            predicate,
            skip_non_finite,
            metrics,
        }
    }

    /// Gets the ingestion metrics
    pub fn metrics(&self) -> &IngestMetrics {
        &self.metrics
    }

    /// Reads one dataset file and returns the records accepted by the predicate.
    ///
    /// The first line is a header and is skipped, as are empty lines. Fields
    /// are split on every comma; quotes carry no meaning. Any open or read
    /// failure, a non-numeric zip code, or a row without monthly values fails
    /// the whole file.
    pub fn process_file(&self, path: &Path) -> ZhiResult<DatasetResult> {
        trace!("Processing dataset: {}", path.display());

        let file = File::open(path).map_err(|e| ZhiError::from_io(path, e))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .buffer_capacity(BUFFER_CAPACITY)
            .from_reader(file);
        let dataset = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut records = Vec::new();
        let mut totals = FileTotals::default();
        let mut row = ByteRecord::new();
        let mut replaced_invalid_utf8 = false;

        while reader
            .read_byte_record(&mut row)
            .map_err(|e| ZhiError::from_csv(path, e))?
        {
            let line_number = row.position().map_or(0, |pos| pos.line() as usize);
            if std::str::from_utf8(row.as_slice()).is_err() {
                replaced_invalid_utf8 = true;
            }

            totals.rows += 1;
            let parsed = Record::parse_row(&row, &dataset, path, line_number)?;
            if parsed.tolerated_values > 0 {
                trace!(
                    "{} line {}: {} values read as zero",
                    dataset,
                    line_number,
                    parsed.tolerated_values
                );
                totals.tolerated_values += parsed.tolerated_values as u64;
            }

            let record = parsed.record;
            if self.skip_non_finite && !record.growth_rate.is_finite() {
                totals.non_finite_skipped += 1;
                continue;
            }
            if self.predicate.matches(&record) {
                records.push(record);
            }
        }

        if replaced_invalid_utf8 {
            warn!("Invalid UTF-8 replaced in dataset: {}", path.display());
        }

        totals.accepted = records.len() as u64;
        self.metrics.record_file(&dataset, totals);

        Ok(DatasetResult {
            path: path.to_path_buf(),
            records,
            rows_scanned: totals.rows as usize,
        })
    }
}
