use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::rename::conflict::{Resolution, resolve};
use crate::rename::error::{ErrorKind, Result};
use crate::rename::{Outcome, SkipReason};
use exn::ResultExt;
use retitle_extract::{ExtractedText, Language, detect};
use retitle_namer::{Naming, NamingRequest};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// A document whose text has been read and whose language is known.
pub(crate) struct Prepared {
    pub path: PathBuf,
    pub extracted: ExtractedText,
    pub language: Language,
}
impl Prepared {
    fn request(&self) -> NamingRequest {
        NamingRequest {
            text: self.extracted.text.clone(),
            filename: self.path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default(),
            language: self.language,
        }
    }
}

/// Extracts the leading text and detects its language.
pub(crate) fn prepare(ctx: &Context, path: &Path) -> Result<Prepared> {
    let extracted = ctx.extractor.extract(path).or_raise(|| ErrorKind::Extract)?;
    let language = detect(&extracted.text);
    tracing::debug!(
        path = %path.display(),
        chars = extracted.text.chars().count(),
        location = ?extracted.location,
        %language,
        "Prepared document",
    );
    Ok(Prepared { path: path.to_path_buf(), extracted, language })
}

/// Names a prepared document, retrying retryable failures with exponential
/// backoff.
pub(crate) async fn name(ctx: &Context, prepared: &Prepared) -> Result<Naming> {
    let request = prepared.request();
    let mut attempt = 0;
    loop {
        match ctx.namer.name(&request).await {
            Ok(naming) => return Ok(naming),
            Err(e) if e.is_retryable() && attempt < ctx.retries => {
                let delay = ctx.backoff.saturating_mul(2u32.saturating_pow(attempt));
                attempt += 1;
                tracing::warn!(
                    path = %prepared.path.display(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Naming failed ({}); retrying",
                    &*e,
                );
                tokio::time::sleep(delay).await;
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::Naming),
        }
    }
}

/// Turns a naming into a filename and renames the file, or plans the rename
/// when running dry.
///
/// `claimed` holds every destination taken earlier in the run, so that two
/// files named alike never end up competing for the same path.
pub(crate) fn apply(
    ctx: &Context,
    prepared: Prepared,
    naming: Naming,
    claimed: &mut HashSet<PathBuf>,
) -> Result<Outcome> {
    let from = prepared.path;
    let filename = ctx.generator.generate_filename(&naming.result, &from).or_raise(|| ErrorKind::Filename)?;
    let to = match resolve(&from, &filename, claimed)? {
        Resolution::AlreadyCorrect => {
            claimed.insert(from.clone());
            return Ok(Outcome::AlreadyCorrect { path: from, naming });
        },
        Resolution::Free(to) => to,
    };
    claimed.insert(to.clone());
    if ctx.dry_run {
        tracing::info!(from = %from.display(), to = %to.display(), "Would rename");
        return Ok(Outcome::Planned { from, to, naming });
    }
    fs::rename(&from, &to).or_raise(|| ErrorKind::Rename)?;
    tracing::info!(from = %from.display(), to = %to.display(), tokens = naming.usage.total(), "Renamed");
    Ok(Outcome::Renamed { from, to, naming })
}

pub(crate) async fn process(ctx: &Context, path: &Path, claimed: &mut HashSet<PathBuf>) -> Result<Outcome> {
    let prepared = prepare(ctx, path)?;
    if prepared.extracted.is_empty() {
        tracing::warn!(path = %path.display(), "No text found; skipping");
        return Ok(Outcome::Skipped { path: prepared.path, reason: SkipReason::NoText });
    }
    let naming = name(ctx, &prepared).await?;
    apply(ctx, prepared, naming, claimed)
}

/// Runs the whole pipeline for a single file.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Rename>`](LibraryErrorKind::Rename) raised
/// from an inner [`Exn<ErrorKind>`](ErrorKind) naming the failed stage.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn rename_file(ctx: &Context, path: impl AsRef<Path>) -> LibraryResult<Outcome> {
    let path = path.as_ref();
    process(ctx, path, &mut HashSet::new()).await.or_raise(|| LibraryErrorKind::Rename(path.to_path_buf()))
}
