//! Configuration Error Types

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A source could not be read or a value has the wrong type.
    #[display("unable to load configuration")]
    Load,
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] String),
    #[display("no API key configured (set API_KEY_ACCESS or llm.api_key)")]
    MissingApiKey,
    #[display("no folder given (pass one, set PDF_DIR or library.folder)")]
    MissingFolder,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Load | Self::Invalid(_) | Self::MissingApiKey | Self::MissingFolder => false,
        }
    }
}
