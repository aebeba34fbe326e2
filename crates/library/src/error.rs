//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The folder could not be listed. Fatal for a batch.
    #[display("unable to list files in {}", _0.display())]
    Discovery(#[error(not(source))] PathBuf),
    #[display("issue with filename generation from template")]
    Template,
    /// Sanitization removed every character of the title.
    #[display("nothing left of {_0:?} after sanitization")]
    EmptyName(#[error(not(source))] String),
    /// A single file failed somewhere in the rename pipeline; the cause is
    /// attached as a [`rename::error::ErrorKind`](crate::rename::error::ErrorKind).
    #[display("unable to rename {}", _0.display())]
    Rename(#[error(not(source))] PathBuf),
    #[display("unable to scramble {}", _0.display())]
    Scramble(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Discovery(_) | Self::Template | Self::EmptyName(_) | Self::Rename(_) | Self::Scramble(_) => false,
        }
    }
}
