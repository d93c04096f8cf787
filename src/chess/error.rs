//! Error types for the chess rule oracle
//!
//! Malformed input is the only failure the oracle knows about; legality is
//! answered with booleans and candidate sets, never with errors.

use thiserror::Error;

/// Errors raised while parsing chess notation or positions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Position encoding could not be parsed or describes an impossible board
    #[error("Invalid position '{encoded}': {reason}")]
    InvalidPosition { encoded: String, reason: String },

    /// Square name outside a1-h8
    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    /// Move notation could not be parsed
    #[error("Invalid move notation: {0}")]
    InvalidMove(String),
}

/// Result type alias for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;
