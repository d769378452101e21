//*** START FILE: src/error.rs ***//
//! Error types for the translation ranker

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the annotator reports to its caller.
///
/// None of these are retried automatically. A failed operation leaves the
/// in-memory state as it was before the call so the user can try again.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed corpus text (missing header, rows or columns)
    #[error("Invalid corpus: {0}")]
    InputFormat(String),

    /// Submit attempted before every sentence in the session was touched
    #[error("Session incomplete: {interacted}/{total} sentences ranked")]
    IncompleteSession { interacted: usize, total: usize },

    /// Operation needs an active session
    #[error("No annotation session is active")]
    NoActiveSession,

    /// Store unavailable, write denied or quota exceeded
    #[error("Persistence error for '{key}': {reason}")]
    Persistence { key: String, reason: String },

    /// Stored value could not be decoded
    #[error("Corrupt stored value for '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Owner mode requested without a successful password check
    #[error("Owner mode requires authentication")]
    Unauthorized,

    /// Export requested but there is nothing to write
    #[error("Nothing to export: {0}")]
    NothingToExport(String),

    /// I/O outside the key-value store (exports, config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn persistence(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::Persistence {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the failures that came from the storage layer
    pub fn is_persistence(&self) -> bool {
        matches!(self, Error::Persistence { .. } | Error::Decode { .. })
    }
}
//*** END FILE: src/error.rs ***//
