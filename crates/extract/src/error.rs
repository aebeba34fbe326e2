//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Every variant means the same thing to the orchestrator: the content of this
/// file could not be read, leave it where it is.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The file extension isn't one of the supported e-book formats.
    #[display("unsupported file format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// The PDF is unreadable, encrypted or corrupt.
    #[display("unable to read PDF document")]
    Pdf,
    /// The EPUB container or its package document is broken.
    #[display("unable to read EPUB document")]
    Epub,
    /// MOBI/AZW3 needs `ebook-convert` and none was configured or found on `PATH`.
    #[display("ebook-convert not detected on your system")]
    ConverterNotFound,
    /// The converter exited with a non-zero exit code (`-1` when it was killed
    /// by a signal and no code is available).
    #[display("ebook-convert exited with code: {_0}")]
    ConverterFailed(#[error(not(source))] i32),
    /// Filesystem failure around the conversion: temp directory, spawning the
    /// converter or reading its output.
    #[display("I/O error while converting")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The file is either readable or it's not.
        false
    }
}
