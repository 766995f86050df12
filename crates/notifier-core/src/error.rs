//! Error types for the notifier.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("query timed out: {0}")]
    QueryTimeout(String),

    #[error("enqueue failed: {0}")]
    EnqueueFailure(String),

    #[error("malformed data: {0}")]
    MalformedData(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("a scheduling run is already in progress")]
    RunInProgress,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
