// src/error.rs

//! Error types for gallery-migrate
//!
//! Errors fall into three groups as far as a migration run is concerned:
//! - per-shortcode: the picture could not be resolved or imported, the
//!   marker stays in the body and the run continues
//! - per-record: a single record could not be written back
//! - fatal: everything else (pattern, query, database or config failures)

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Shortcode pattern or a stored row could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A legacy picture or gallery row does not exist
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Remote download failed (network or HTTP status)
    #[error("Fetch failed: {0}")]
    FetchError(String),

    /// Local source file does not exist
    #[error("File not found: {0}")]
    FileNotFoundError(String),

    /// Local source file exists but cannot be read (permissions, directory)
    #[error("Cannot read source file: {0}")]
    SourceReadError(String),

    /// Content or media store rejected a write
    #[error("Store error: {0}")]
    StoreError(String),

    /// Shortcode kind other than the supported ones
    #[error("Unsupported shortcode kind: {0}")]
    UnsupportedKindError(String),

    /// Invalid run configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failed to initialize a component (HTTP client, directories)
    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Fatal failure while handling one shortcode of one record
    #[error("record {record}, shortcode {picture}: {source}")]
    ShortcodeFailed {
        record: i64,
        picture: i64,
        source: Box<Error>,
    },

    /// Fatal failure while writing back one record
    #[error("record {record}: {source}")]
    RecordFailed { record: i64, source: Box<Error> },
}

impl Error {
    /// Whether a failure while resolving or importing one picture may be
    /// skipped, leaving that marker untouched.
    pub fn is_shortcode_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NotFoundError(_)
                | Error::FetchError(_)
                | Error::FileNotFoundError(_)
                | Error::SourceReadError(_)
                | Error::StoreError(_)
        )
    }

    /// Whether a failure while writing back one record may be skipped.
    pub fn is_record_recoverable(&self) -> bool {
        matches!(self, Error::StoreError(_))
    }

    /// The innermost error, looking through record/shortcode context
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::ShortcodeFailed { source, .. } | Error::RecordFailed { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}
