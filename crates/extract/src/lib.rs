mod consts;
pub mod error;
mod extract;
mod format;
pub mod lang;
mod text;

pub use crate::consts::{DEFAULT_MAX_PAGES, DETECTION_SAMPLE_CHARS, MAX_LEAD_CHARS};
pub use crate::extract::{ExtractedText, Extractor, ExtractorOptions};
pub use crate::format::Format;
pub use crate::lang::{Language, detect};
pub use crate::text::truncate_chars;

use crate::error::Result;
use std::path::Path;

/// Easy, top-level entrypoint: extracts the leading text of `path` using the
/// default [`Extractor`] (10 PDF pages, `ebook-convert` from `PATH`).
///
/// Build an [`Extractor`] once and reuse it when processing many files; this
/// function looks up the converter every time.
pub fn extract(path: impl AsRef<Path>) -> Result<ExtractedText> {
    Extractor::default().extract(path)
}
