//! Error types for sift

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// A batch-fatal import failure. Nothing from the batch was committed.
    #[error("Import failed after {rows_seen} rows: {source}")]
    Import {
        rows_seen: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Assistive classifier unavailable: {0}")]
    AssistUnavailable(#[from] AssistFailure),
}

/// Why an assistive classification produced no suggestion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssistFailure {
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("reply was not usable: {0}")]
    Format(String),

    #[error("backend call failed: {0}")]
    Invocation(String),

    #[error("cancelled by caller")]
    Cancelled,

    #[error("no classifier backend configured")]
    NotConfigured,
}

impl Error {
    /// Wrap a batch-fatal failure with the number of rows read so far
    pub(crate) fn import(rows_seen: usize, source: Error) -> Self {
        Error::Import {
            rows_seen,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
