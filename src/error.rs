//! Errors returned by [`crate::Fulfiller::fulfill`]
//!
//! Rule violations and recommender trouble are answered in words and never
//! show up here. What remains is bad caller input and store failure.

use crate::chess::OracleError;
use crate::session::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FulfillError {
    #[error("Session id must not be empty")]
    EmptySessionId,

    /// The position string could not be parsed; recovering is up to the caller
    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] OracleError),

    #[error("Session store failure: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for fulfillment
pub type FulfillResult<T> = Result<T, FulfillError>;
