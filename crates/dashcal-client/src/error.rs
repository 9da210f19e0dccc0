//! Client error types.

use dashcal_ical::FetchError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The calendar could not be fetched.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Output could not be produced.
    #[error("output error: {0}")]
    Output(String),
}
