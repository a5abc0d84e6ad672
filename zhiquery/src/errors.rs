//! Error types for zhiquery.
//!
//! Two families exist. [`SyntaxError`] covers everything that can go wrong
//! while compiling a filter expression and is always reported before any
//! dataset is opened. [`ZhiError`] is the crate-wide error and wraps syntax
//! errors together with the fatal configuration problems that abort an
//! ingestion run (unreadable directories, unopenable files, bad zip codes).
//!
//! Monthly values that fail to parse are not errors at all: they are read as
//! `0.0` and only show up in the ingestion metrics.
use std::num::{ParseFloatError, ParseIntError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for query and ingestion operations
pub type ZhiResult<T> = Result<T, ZhiError>;

/// Grammar violations in a filter expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("No token given")]
    EmptyTokens,
    #[error("Tokens need to always start with a [, found {0:?}")]
    MissingGroupStart(String),
    #[error("Unknown filter kind: {0}")]
    UnknownKind(String),
    #[error("Filter {0:?} is missing the kind:argument separator")]
    MissingSeparator(String),
    #[error("Invalid {kind} argument {arg:?}: {source}")]
    InvalidFloat {
        kind: String,
        arg: String,
        source: ParseFloatError,
    },
    #[error("Invalid ZipCode argument {arg:?}: {source}")]
    InvalidZipCode { arg: String, source: ParseIntError },
    #[error("Group at token {0} closes without any filter")]
    EmptyGroup(usize),
    #[error("Operator {operator:?} at token {position} has no left operand")]
    UnexpectedOperator { operator: String, position: usize },
    #[error("Missing operator before {token:?} at token {position}")]
    MissingOperator { token: String, position: usize },
    #[error("Group at token {0} ends with a dangling operator")]
    DanglingOperator(usize),
    #[error("Expected {expected} operators for {operands} operands, found {operators}")]
    OperatorMismatch {
        operands: usize,
        operators: usize,
        expected: usize,
    },
    #[error("Unfinished tokens")]
    UnfinishedTokens,
    #[error("Groups nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("Unexpected tokens after the closing ]: {0:?}")]
    TrailingTokens(Vec<String>),
}

/// Errors that can occur while compiling a query or ingesting datasets
#[derive(Error, Debug)]
pub enum ZhiError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Dataset not found: {0}")]
    DatasetNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Invalid zip code {value:?} in {path} line {line}")]
    InvalidZipCode {
        path: PathBuf,
        line: usize,
        value: String,
    },
    #[error("Malformed record in {path} line {line}: {reason}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ZhiError {
    pub fn dataset_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DatasetNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_zip_code(path: impl Into<PathBuf>, line: usize, value: impl Into<String>) -> Self {
        Self::InvalidZipCode {
            path: path.into(),
            line,
            value: value.into(),
        }
    }

    pub fn malformed_record(
        path: impl Into<PathBuf>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Maps an I/O failure on `path` to the matching configuration error
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::dataset_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::Io(err),
        }
    }

    /// Maps a CSV reader failure on `path`; I/O failures go through [`ZhiError::from_io`]
    pub fn from_csv(path: &Path, err: csv::Error) -> Self {
        let line = err.position().map_or(0, |pos| pos.line() as usize);
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => Self::from_io(path, io_err),
            kind => Self::malformed_record(path, line, format!("{:?}", kind)),
        }
    }

    /// True for grammar errors, which are always raised before ingestion
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax(_))
    }
}
