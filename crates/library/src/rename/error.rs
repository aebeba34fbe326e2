//! Error types for the [`rename`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// A rename error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for rename operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies which stage of the pipeline failed for a file.
///
/// ### Dependency Errors
/// - [`ErrorKind::Extract`]
/// - [`ErrorKind::Naming`]: the attached naming error says whether the API
///   call failed or the reply couldn't be parsed.
///
/// ### Operational Errors
/// - [`ErrorKind::Filename`]
/// - [`ErrorKind::Rename`]
/// - [`ErrorKind::Conflict`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No text could be read from the document.
    #[display("content extraction failed")]
    Extract,
    #[display("naming failed")]
    Naming,
    /// The naming result couldn't be turned into a filename (template error
    /// or nothing left after sanitization).
    #[display("filename generation failed")]
    Filename,
    /// The filesystem refused the rename.
    #[display("filesystem rename failed")]
    Rename,
    /// Every disambiguating suffix is already taken.
    #[display("no free filename for {_0:?}")]
    Conflict(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Naming is already retried inside the pipeline, so nothing reaching
    /// the caller is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Extract | Self::Naming | Self::Filename | Self::Rename | Self::Conflict(_) => false,
        }
    }
}
