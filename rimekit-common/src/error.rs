//! Common error types for rimekit

use thiserror::Error;

/// Common result type for rimekit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the rimekit crates
#[derive(Error, Debug)]
pub enum Error {
    /// Dictionary store fault (wraps sqlx::Error, retryable by the caller)
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// No dictionary handle became available within the acquire timeout
    #[error("Dictionary pool exhausted: no connection available within the acquire timeout")]
    PoolExhausted,

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entry not found where one was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid query word or search option
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External suggestion service failure (surfaced only in strict mode)
    #[error("Suggestion service error: {0}")]
    Service(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        // A pool acquire timeout is its own failure mode: the store is fine,
        // the caller just could not get a handle in time.
        match err {
            sqlx::Error::PoolTimedOut => Error::PoolExhausted,
            other => Error::Database(other),
        }
    }
}
