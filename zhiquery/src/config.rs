use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Configuration for a query run.
///
/// # Configuration Locations
///
/// Files are layered in order of increasing precedence:
/// 1. Global `$CONFIG_DIR/zhiquery/config.yaml`
/// 2. Local `.zhiquery.yaml` in the current directory
/// 3. Custom config file given via `--config`
///
/// Command-line arguments override all of them, see [`QueryConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # Directory holding the dataset files
/// dataset_dir: "data"
///
/// # Filter expression, one token per entry
/// filter: ["[", "State:CA", "and", "GrowthRate:5", "]"]
///
/// # Dataset file extensions to include
/// file_extensions: ["csv"]
///
/// # Dataset files to skip (glob syntax)
/// ignore_patterns: ["*_raw.csv"]
///
/// # Drop records whose growth rate is NaN or infinite
/// skip_non_finite: false
///
/// # Worker threads (default: CPU cores)
/// thread_count: 4
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Directory holding the dataset files; only its direct children are read
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,

    /// Filter expression tokens. Empty means every record is accepted
    #[serde(default)]
    pub filter: Vec<String>,

    /// Optional list of dataset file extensions to include (e.g., ["csv"])
    /// If None, every file in the directory is a dataset
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,

    /// Dataset files to skip (supports glob syntax)
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Whether to only show the totals instead of individual records
    #[serde(default)]
    pub stats_only: bool,

    /// Whether to print records as JSON
    #[serde(default)]
    pub json: bool,

    /// Drop records whose growth rate is NaN or infinite before filtering
    #[serde(default)]
    pub skip_non_finite: bool,

    /// Number of worker threads used for ingestion
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from(".")
}

pub(crate) fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            dataset_dir: default_dataset_dir(),
            filter: Vec::new(),
            file_extensions: None,
            ignore_patterns: Vec::new(),
            stats_only: false,
            json: false,
            skip_non_finite: false,
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

impl QueryConfig {
    /// Creates a configuration for `dataset_dir` with every other field defaulted
    pub fn new(dataset_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_dir: dataset_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the filter tokens
    pub fn with_filter<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Loads configuration from the default locations plus a specific file,
    /// which must exist
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            dirs::config_dir().map(|p| p.join("zhiquery/config.yaml")),
            Some(PathBuf::from(".zhiquery.yaml")),
        ];

        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli_config: QueryConfig) -> Self {
        // CLI values take precedence over config file values
        if cli_config.dataset_dir != default_dataset_dir() {
            self.dataset_dir = cli_config.dataset_dir;
        }
        if !cli_config.filter.is_empty() {
            self.filter = cli_config.filter;
        }
        if cli_config.file_extensions.is_some() {
            self.file_extensions = cli_config.file_extensions;
        }
        if !cli_config.ignore_patterns.is_empty() {
            self.ignore_patterns = cli_config.ignore_patterns;
        }
        self.stats_only |= cli_config.stats_only;
        self.json |= cli_config.json;
        self.skip_non_finite |= cli_config.skip_non_finite;
        if cli_config.thread_count != default_thread_count() {
            self.thread_count = cli_config.thread_count;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }
}
