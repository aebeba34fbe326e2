//! Anonymises a folder by renaming every document to a random-looking number.
//!
//! Handy for building test folders: scramble a copy of a library, then check
//! how well a rename run recovers the original names.

use crate::discover::discover;
use crate::error::{Error, ErrorKind, Result};
use crate::sanitize::with_extension;
use exn::ResultExt;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const MIN_NAME: u64 = 10_000_000;
const NAME_RANGE: u64 = 90_000_000;
/// Attempts at finding an unused name before giving up on a file.
const MAX_ATTEMPTS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scrambled {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Default)]
pub struct ScrambleReport {
    pub scrambled: Vec<Scrambled>,
    pub failed: Vec<Error>,
}

/// An 8-digit number derived from the path, the run's seed and the attempt.
fn candidate(path: &Path, seed: u64, attempt: u32) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(path.as_os_str().as_encoded_bytes());
    hasher.update(&seed.to_le_bytes());
    hasher.update(&attempt.to_le_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
    MIN_NAME + u64::from_le_bytes(bytes) % NAME_RANGE
}

fn scramble_file(path: &Path, seed: u64, claimed: &mut HashSet<PathBuf>) -> Result<Scrambled> {
    let folder = path.parent().unwrap_or(Path::new(""));
    let extension = path.extension().and_then(|ext| ext.to_str());
    for attempt in 0..MAX_ATTEMPTS {
        let to = folder.join(with_extension(&candidate(path, seed, attempt).to_string(), extension));
        if claimed.contains(&to) || to.exists() {
            continue;
        }
        fs::rename(path, &to).or_raise(|| ErrorKind::Scramble(path.to_path_buf()))?;
        claimed.insert(to.clone());
        return Ok(Scrambled { from: path.to_path_buf(), to });
    }
    exn::bail!(ErrorKind::Scramble(path.to_path_buf()))
}

/// Renames every eligible file in `folder` to a unique 8-digit stem, keeping
/// its extension.
///
/// The same `seed` over the same folder always produces the same names. Only
/// failing to list the folder is an error; per-file failures are collected in
/// the report.
pub fn scramble(folder: impl AsRef<Path>, seed: u64) -> Result<ScrambleReport> {
    let mut report = ScrambleReport::default();
    let mut claimed = HashSet::new();
    for path in discover(folder)? {
        match scramble_file(&path, seed, &mut claimed) {
            Ok(scrambled) => {
                tracing::info!(from = %scrambled.from.display(), to = %scrambled.to.display(), "Scrambled");
                report.scrambled.push(scrambled);
            },
            Err(e) => {
                tracing::error!(path = %path.display(), "Unable to scramble: {e:?}");
                report.failed.push(e);
            },
        }
    }
    Ok(report)
}
