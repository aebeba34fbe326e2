//! Markup documents (EPUB): walk the spine in reading order and collect the
//! leading text.

use super::Lead;
use crate::consts::MAX_LEAD_CHARS;
use crate::error::{ErrorKind, Result};
use crate::text::{html_to_text, lead_chunks};
use epub::doc::EpubDoc;
use exn::ResultExt;
use std::path::Path;

pub(super) fn lead_text(path: &Path) -> Result<Lead> {
    let mut doc = EpubDoc::new(path).or_raise(|| ErrorKind::Epub)?;
    // Package metadata is mostly whatever the converting tool felt like
    // writing ("Unknown", "calibre", the filename...). Log it, don't use it.
    if let Some(title) = doc.mdata("title") {
        tracing::debug!(title = %title.value, "EPUB declares a title");
    }
    if let Some(creator) = doc.mdata("creator") {
        tracing::debug!(creator = %creator.value, "EPUB declares a creator");
    }

    let mut started = false;
    // Lazily pull spine items so a huge book isn't converted in full just to
    // read its first few kilobytes.
    let sections = std::iter::from_fn(|| {
        if started && !doc.go_next() {
            return None;
        }
        started = true;
        Some(doc.get_current_str().map(|(content, _mime)| html_to_text(&content)).unwrap_or_default())
    });
    Ok(match lead_chunks(sections, MAX_LEAD_CHARS) {
        Some((index, text)) => Lead::found(text, index + 1),
        None => {
            tracing::info!("No meaningful text found in EPUB spine");
            Lead::empty()
        },
    })
}
