pub mod config;
pub mod errors;
pub mod filters;
pub mod growth;
pub mod ingest;
pub mod metrics;
pub mod parser;
pub mod predicate;
pub mod record;
pub mod results;

pub use config::QueryConfig;
pub use errors::{SyntaxError, ZhiError, ZhiResult};
pub use growth::{growth_rate, Growth};
pub use ingest::{query, run};
pub use predicate::{FilterKind, Predicate};
pub use record::Record;
pub use results::ResultSet;
