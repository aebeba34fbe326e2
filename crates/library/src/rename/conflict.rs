use crate::rename::error::{ErrorKind, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Highest numeric suffix tried before giving up.
const MAX_SUFFIX: u32 = 99;

#[derive(Debug)]
pub(crate) enum Resolution {
    /// The source already has the name it should have.
    AlreadyCorrect,
    /// A free path to rename to.
    Free(PathBuf),
}

/// Picks a destination for `source` that doesn't overwrite anything.
///
/// A candidate is taken if nothing exists there on disk and no earlier file in
/// this run has claimed it. Otherwise ` (2)`, ` (3)`, … up to ` (99)` are
/// appended before the extension. A source already carrying any of those
/// names is left where it is.
///
/// Nothing is ever deleted: if the occupant turns out to have identical
/// content a warning is logged and the next suffix is tried anyway.
pub(crate) fn resolve(source: &Path, filename: &str, claimed: &HashSet<PathBuf>) -> Result<Resolution> {
    let folder = source.parent().unwrap_or(Path::new(""));
    let (stem, extension) = match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => (&filename[..filename.len() - ext.len() - 1], Some(ext)),
        None => (filename, None),
    };
    let candidates = (1..=MAX_SUFFIX).map(|attempt| {
        let name = match (attempt, extension) {
            (1, _) => filename.to_string(),
            (n, Some(ext)) => format!("{stem} ({n}).{ext}"),
            (n, None) => format!("{stem} ({n})"),
        };
        folder.join(name)
    });

    if candidates.clone().any(|candidate| candidate == source) {
        return Ok(Resolution::AlreadyCorrect);
    }
    for candidate in candidates {
        if claimed.contains(&candidate) {
            continue;
        }
        if !candidate.exists() {
            return Ok(Resolution::Free(candidate));
        }
        if is_duplicate(source, &candidate).unwrap_or(false) {
            tracing::warn!(
                path = %source.display(),
                existing = %candidate.display(),
                "Identical file already exists; keeping both",
            );
        }
    }
    exn::bail!(ErrorKind::Conflict(filename.to_string()))
}

fn content_hash(path: &Path) -> io::Result<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_reader(File::open(path)?)?;
    Ok(hasher.finalize())
}

fn is_duplicate(a: &Path, b: &Path) -> io::Result<bool> {
    if a.metadata()?.len() != b.metadata()?.len() {
        return Ok(false);
    }
    Ok(content_hash(a)? == content_hash(b)?)
}
