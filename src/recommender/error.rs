//! Error types for move recommendation

use thiserror::Error;

/// Errors that can occur while asking for a best move
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommenderError {
    /// Search did not finish inside its time budget
    #[error("Move recommender timed out after {millis}ms")]
    Timeout { millis: u128 },

    /// Engine could not be started or reached
    #[error("Move recommender unavailable: {0}")]
    Unavailable(String),

    /// Position has no legal moves to recommend
    #[error("No move available in this position")]
    NoMove,

    /// Engine answered with something that is not a move
    #[error("Unexpected engine output: {0}")]
    Protocol(String),
}

/// Result type alias for recommender operations
pub type RecommenderResult<T> = Result<T, RecommenderError>;
