//! Concurrent ingestion of dataset directories.
//!
//! A run has two phases. The filter is compiled first, so a syntax error is
//! reported before any file is touched. Then every dataset file becomes one
//! task on a rayon pool: the task streams its lines through
//! [`DatasetProcessor`], which decodes each row into a
//! [`Record`](crate::record::Record), derives its growth rate and tests it
//! against the shared, read-only predicate. Accepted records stay local to
//! the task until the file is done, at which point they are appended to the
//! shared [`ResultSet`](crate::results::ResultSet) under a single mutex.
//! After the pool joins, the result set is sorted by growth rate, so the
//! output never depends on task scheduling.
//!
//! ```rust,ignore
//! let config = QueryConfig::new("data").with_filter(["[", "State:CA", "]"]);
//! let result = zhiquery::ingest::query(&config)?;
//! for record in result.iter() {
//!     println!("{} {:.2}%", record.zip_code, record.growth_rate);
//! }
//! ```
pub mod engine;
pub mod processor;

pub use engine::{compile_filter, discover_datasets, query, run, run_with_metrics};
pub use processor::DatasetProcessor;
