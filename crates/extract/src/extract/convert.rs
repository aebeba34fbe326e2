//! Container formats (MOBI, AZW3) have no pure-Rust reader worth trusting, so
//! they're handed to Calibre's `ebook-convert` and read back as plain text.

use super::Lead;
use crate::consts::{CONVERTER_EXECUTABLES, MAX_LEAD_CHARS};
use crate::error::{ErrorKind, Result};
use crate::text::{lead_chunks, paragraphs};
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Locates the converter: an explicitly configured path (or bare name) first,
/// otherwise the usual executable names on `PATH`.
pub(super) fn discover(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(configured) = configured {
        return match which::which(configured) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(converter = %configured.display(), error = %e, "Configured converter is not executable");
                None
            },
        };
    }
    let found = CONVERTER_EXECUTABLES.iter().find_map(|exe| which::which(exe).ok());
    if found.is_none() {
        tracing::info!("ebook-convert not found in PATH; MOBI and AZW3 files will be skipped");
    }
    found
}

pub(super) fn lead_text(converter: Option<&Path>, path: &Path) -> Result<Lead> {
    let converter = converter.ok_or_raise(|| ErrorKind::ConverterNotFound)?;
    // The converter picks its output format from the extension, so the
    // suffix is load-bearing.
    let output = tempfile::Builder::new()
        .prefix("retitle-")
        .suffix(".txt")
        .tempfile()
        .or_raise(|| ErrorKind::Io)?;
    tracing::debug!(converter = %converter.display(), output = %output.path().display(), "Converting to plain text");
    let status = Command::new(converter)
        .arg(path)
        .arg(output.path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .or_raise(|| ErrorKind::Io)?;
    if !status.success() {
        exn::bail!(ErrorKind::ConverterFailed(status.code().unwrap_or(-1)));
    }
    let bytes = std::fs::read(output.path()).or_raise(|| ErrorKind::Io)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(match lead_chunks(paragraphs(&text), MAX_LEAD_CHARS) {
        Some((index, text)) => Lead::found(text, index + 1),
        None => {
            tracing::info!("Converted text is empty");
            Lead::empty()
        },
    })
}
