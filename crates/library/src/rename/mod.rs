//! Renaming documents from their content.
//!
//! Every file goes through the same pipeline: extract the leading text,
//! detect its language, ask the [`Namer`](retitle_namer::Namer) for a title
//! and author, render a sanitized filename, then rename the file in place
//! (suffixing the name if something already lives there).
//!
//! Two batch entry points stream [`RenameEvent`]s:
//! - [`rename_sequential`] runs the whole pipeline one file at a time.
//! - [`rename_concurrent`] extracts everything first, then overlaps the naming
//!   calls (at most [`Context::concurrency`](crate::Context) at once), and
//!   only renames after every call has finished.
//!
//! A failure in one file never stops the batch.

mod conflict;
pub mod error;
mod file;
mod stream;

pub use self::file::rename_file;
pub use self::stream::{RenameEvent, rename_concurrent, rename_sequential};

use derive_more::Display;
use retitle_namer::Naming;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SkipReason {
    #[display("no text found")]
    NoText,
}

/// The outcome of (successfully) processing a single file.
#[derive(Debug)]
pub enum Outcome {
    Renamed { from: PathBuf, to: PathBuf, naming: Naming },
    /// The file already had the name it would have been given.
    AlreadyCorrect { path: PathBuf, naming: Naming },
    /// Dry run: the rename that would have happened.
    Planned { from: PathBuf, to: PathBuf, naming: Naming },
    Skipped { path: PathBuf, reason: SkipReason },
}
impl Outcome {
    /// The file's path before processing.
    pub fn path(&self) -> &Path {
        match self {
            Self::Renamed { from, .. } | Self::Planned { from, .. } => from,
            Self::AlreadyCorrect { path, .. } | Self::Skipped { path, .. } => path,
        }
    }

    pub fn naming(&self) -> Option<&Naming> {
        match self {
            Self::Renamed { naming, .. } | Self::AlreadyCorrect { naming, .. } | Self::Planned { naming, .. } => {
                Some(naming)
            },
            Self::Skipped { .. } => None,
        }
    }
}
