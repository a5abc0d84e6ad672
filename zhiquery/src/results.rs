use std::cmp::Ordering;
use std::path::PathBuf;

use crate::record::Record;

/// Accepted records of a single dataset file, built by one worker
#[derive(Debug, Clone, Default)]
pub struct DatasetResult {
    /// The path to the dataset file
    pub path: PathBuf,
    /// Records of this file that passed the filter, in file order
    pub records: Vec<Record>,
    /// Number of data rows read, header excluded
    pub rows_scanned: usize,
}

/// The accepted records of a whole run
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// Accepted records; ascending by growth rate once sorted
    pub records: Vec<Record>,
    /// Number of dataset files merged in
    pub files_scanned: usize,
    /// Number of data rows read across all files
    pub rows_scanned: usize,
}

impl ResultSet {
    /// Creates a new empty result set
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends the records of one dataset file
    pub fn add_dataset_result(&mut self, dataset_result: DatasetResult) {
        self.files_scanned += 1;
        self.rows_scanned += dataset_result.rows_scanned;
        self.records.extend(dataset_result.records);
    }

    /// Orders records by ascending growth rate.
    ///
    /// NaN growth rates sort after every number. Ties are broken by dataset
    /// name and then zip code, so the order never depends on which worker
    /// finished first.
    pub fn sort_by_growth_rate(&mut self) {
        self.records.sort_by(compare_records);
    }

    /// Number of accepted records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}

fn compare_growth(a: f64, b: f64) -> Ordering {
    a.is_nan().cmp(&b.is_nan()).then_with(|| a.total_cmp(&b))
}

fn compare_records(a: &Record, b: &Record) -> Ordering {
    compare_growth(a.growth_rate, b.growth_rate)
        .then_with(|| a.dataset.cmp(&b.dataset))
        .then_with(|| a.zip_code.cmp(&b.zip_code))
}
