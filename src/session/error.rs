//! Error types for session persistence
//!
//! Store failures are infrastructure faults: they are the only session-side
//! errors that propagate out of `fulfill`.

use thiserror::Error;

/// Errors that can occur while reading or writing session fields
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing file could not be read or written
    #[error("Session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value did not match the field's shape
    #[error("Session field '{field}' could not be (de)serialized: {source}")]
    Serialization {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Backend refused the request
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
