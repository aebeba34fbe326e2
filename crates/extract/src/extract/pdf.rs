//! Paginated documents: the first non-empty page wins.

use super::Lead;
use crate::error::{ErrorKind, Result};
use crate::text::first_non_empty;
use exn::ResultExt;
use lopdf::Document;
use std::path::Path;

/// Scans pages from page 1 onward, returning the first one with any text
/// after whitespace trimming. At most `max_pages` pages are extracted.
///
/// This is a heuristic for finding the title page, nothing more. Scanned
/// PDFs without a text layer simply come back empty.
pub(super) fn lead_text(path: &Path, max_pages: usize) -> Result<Lead> {
    let document = Document::load(path).or_raise(|| ErrorKind::Pdf)?;
    lead_text_from_document(&document, max_pages)
}

pub(super) fn lead_text_from_document(document: &Document, max_pages: usize) -> Result<Lead> {
    let pages = document.get_pages();
    tracing::debug!(pages = pages.len(), max_pages, "Scanning leading PDF pages");
    // Page numbers are 1-based and ordered (BTreeMap), so `take` walks them in order.
    let numbers: Vec<u32> = pages.keys().copied().take(max_pages).collect();
    let texts = numbers.iter().map(|&number| {
        document.extract_text(&[number]).unwrap_or_else(|e| {
            // One broken content stream shouldn't sink the whole document.
            tracing::debug!(page = number, error = %e, "Could not extract text from page; treating as empty");
            String::new()
        })
    });
    match first_non_empty(texts) {
        Some((index, text)) => Ok(Lead::found(text, numbers[index] as usize)),
        None => {
            tracing::info!(max_pages, "No meaningful text found in leading pages");
            Ok(Lead::empty())
        },
    }
}
