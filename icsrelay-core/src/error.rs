//! Error types for icsrelay.

use thiserror::Error;

/// Errors that can occur while relaying a calendar export.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The candidate URL does not match the allow-list.
    #[error("Invalid URL schema")]
    InvalidUrl,

    #[error("Error fetching the iCal file: {0}")]
    Transport(String),

    /// The upstream answered with a non-2xx status.
    #[error("HTTP error: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("An unexpected error occurred: calendar is not valid UTF-8 ({0})")]
    Decode(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// Result type alias for icsrelay operations.
pub type RelayResult<T> = Result<T, RelayError>;
