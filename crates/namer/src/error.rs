//! Naming Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A naming error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for naming operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// ### Setup Errors
/// - [`ErrorKind::Client`]
///
/// ### API Errors
/// - [`ErrorKind::Api`]
/// - [`ErrorKind::RateLimited`]
/// - [`ErrorKind::Status`]
///
/// ### Parse Errors
/// - [`ErrorKind::Parse`]
/// - [`ErrorKind::UnexpectedReply`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The HTTP client could not be built (TLS backend, bad configuration).
    #[display("unable to construct HTTP client")]
    Client,
    /// Transport failure: DNS, refused connection, timeout.
    #[display("language model request failed")]
    Api,
    /// HTTP 429 from the endpoint.
    #[display("language model rate limit exceeded")]
    RateLimited,
    /// Any other non-success HTTP status.
    #[display("language model responded with HTTP {_0}")]
    Status(#[error(not(source))] u16),
    /// The response (or the reply inside it) didn't have the expected shape.
    #[display("unable to parse language model reply: {_0}")]
    Parse(#[error(not(source))] String),
    /// The connection check got an answer, just not the one it asked for.
    #[display("unexpected reply to connection check: {_0}")]
    UnexpectedReply(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api | Self::RateLimited => true,
            Self::Status(code) => *code >= 500,
            Self::Client | Self::Parse(_) | Self::UnexpectedReply(_) => false,
        }
    }

    /// Returns `true` when the model answered but the answer was unusable.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::UnexpectedReply(_))
    }
}
