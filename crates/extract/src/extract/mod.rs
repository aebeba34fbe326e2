//! Leading-text extraction for every supported [`Format`].

mod convert;
mod markup;
mod pdf;

use crate::consts::{DEFAULT_MAX_PAGES, MAX_LEAD_CHARS};
use crate::error::{ErrorKind, Result};
use crate::format::Format;
use crate::text::{normalize, truncate_chars};
use exn::OptionExt;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Text found by a format handler, before it's tagged with its format.
#[derive(Debug)]
pub(crate) struct Lead {
    text: String,
    location: Option<usize>,
}
impl Lead {
    fn found(text: String, location: usize) -> Self {
        Self { text, location: Some(location) }
    }

    fn empty() -> Self {
        Self { text: String::new(), location: None }
    }
}

/// The leading text of one document.
///
/// An empty `text` is not an error, it means "no content found" and the
/// caller decides what to do about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub format: Format,
    /// Where the text started: the 1-based PDF page, EPUB spine item or
    /// converted paragraph. `None` when nothing was found.
    pub location: Option<usize>,
}
impl ExtractedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorOptions {
    /// How many PDF pages to scan for the first non-empty one.
    pub max_pages: usize,
    /// Path (or bare name) of `ebook-convert`; discovered on `PATH` if unset.
    pub converter: Option<PathBuf>,
}
impl Default for ExtractorOptions {
    fn default() -> Self {
        Self { max_pages: DEFAULT_MAX_PAGES, converter: None }
    }
}

/// Pulls the leading text out of PDF, EPUB, MOBI and AZW3 files.
///
/// Construction resolves the external converter once; a missing converter
/// only becomes an error when a MOBI/AZW3 file is actually extracted.
#[derive(Debug, Clone)]
pub struct Extractor {
    max_pages: usize,
    converter: Option<PathBuf>,
}
impl Extractor {
    pub fn new(options: ExtractorOptions) -> Self {
        let converter = convert::discover(options.converter.as_deref());
        Self { max_pages: options.max_pages.max(1), converter }
    }

    /// The resolved `ebook-convert` executable, if any.
    pub fn converter(&self) -> Option<&Path> {
        self.converter.as_deref()
    }

    /// Extracts at most [`MAX_LEAD_CHARS`] characters of leading text.
    ///
    /// # Errors
    /// - [`ErrorKind::UnsupportedFormat`] for anything but the four formats.
    /// - [`ErrorKind::Pdf`] / [`ErrorKind::Epub`] for unreadable documents.
    /// - [`ErrorKind::ConverterNotFound`] / [`ErrorKind::ConverterFailed`] for
    ///   MOBI and AZW3 files that couldn't be converted.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn extract(&self, path: impl AsRef<Path>) -> Result<ExtractedText> {
        let path = path.as_ref();
        let format = Format::from_path(path).ok_or_raise(|| ErrorKind::UnsupportedFormat(path.to_path_buf()))?;
        let lead = match format {
            Format::Pdf => pdf::lead_text(path, self.max_pages)?,
            Format::Epub => markup::lead_text(path)?,
            Format::Mobi | Format::Azw3 => convert::lead_text(self.converter.as_deref(), path)?,
        };
        let text = truncate_chars(&normalize(&lead.text), MAX_LEAD_CHARS).to_string();
        tracing::debug!(%format, location = lead.location, chars = text.chars().count(), "Extracted leading text");
        Ok(ExtractedText { text, format, location: lead.location })
    }
}
impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorOptions::default())
    }
}
