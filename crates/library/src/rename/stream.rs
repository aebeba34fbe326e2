use crate::Context;
use crate::discover::discover;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::rename::file::{Prepared, apply, name, prepare, process};
use crate::rename::{Outcome, SkipReason};
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::path::Path;

/// Progress events emitted while renaming a folder.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    number of eligible files.
/// 3. [`Processed`](Self::Processed): zero or more times, at most once per
///    file. Files that fail are reported as `Err` items instead.
/// 4. [`Complete`](Self::Complete): exactly once, signalling the stream is
///    finished.
///
/// A discovery error terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum RenameEvent {
    Started,
    DiscoveryComplete(u64),
    Processed(Outcome),
    Complete,
}

/// Renames every eligible file in `folder`, one file at a time.
///
/// Each file is fully processed (extracted, named, renamed) before the next
/// one is started. Individual failures are surfaced as
/// [`LibraryErrorKind::Rename`] items carrying the file's path, without
/// terminating the stream.
pub fn rename_sequential<'a>(
    folder: &'a Path,
    ctx: &'a Context,
) -> impl Stream<Item = LibraryResult<RenameEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(RenameEvent::Started);
        let files = match discover(folder) {
            Ok(files) => files,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield Ok(RenameEvent::DiscoveryComplete(u64::try_from(files.len()).unwrap_or(0)));

        let mut claimed = HashSet::new();
        for path in files {
            let result = process(ctx, &path, &mut claimed).await;
            yield result.map(RenameEvent::Processed).or_raise(|| LibraryErrorKind::Rename(path));
        }

        yield Ok(RenameEvent::Complete);
    })
}

/// Renames every eligible file in `folder`, overlapping the naming calls.
///
/// Runs in three phases:
/// 1. Every file is extracted and its language detected, in order. Files
///    without text are reported as skipped straight away.
/// 2. Naming calls for the remaining files run concurrently, at most
///    [`Context::concurrency`] at a time. Queued calls are promoted in order
///    as in-flight ones complete.
/// 3. Once *every* call has finished, the files are renamed in discovery
///    order and their outcomes (or failures) are yielded.
pub fn rename_concurrent<'a>(
    folder: &'a Path,
    ctx: &'a Context,
) -> impl Stream<Item = LibraryResult<RenameEvent>> + 'a {
    stream!({
        yield Ok(RenameEvent::Started);
        let files = match discover(folder) {
            Ok(files) => files,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        yield Ok(RenameEvent::DiscoveryComplete(u64::try_from(files.len()).unwrap_or(0)));

        let mut prepared: Vec<Prepared> = Vec::with_capacity(files.len());
        for path in files {
            match prepare(ctx, &path) {
                Ok(file) if file.extracted.is_empty() => {
                    tracing::warn!(path = %path.display(), "No text found; skipping");
                    yield Ok(RenameEvent::Processed(Outcome::Skipped { path, reason: SkipReason::NoText }));
                },
                Ok(file) => prepared.push(file),
                Err(e) => {
                    yield Err(e).or_raise(|| LibraryErrorKind::Rename(path));
                },
            }
        }

        tracing::info!(files = prepared.len(), concurrency = ctx.concurrency, "Naming documents");
        // Scoped so the in-flight futures (which borrow `prepared`) are gone before renaming.
        let namings = {
            let mut namings: Vec<_> = prepared.iter().map(|_| None).collect();
            let mut queue: VecDeque<_> = prepared
                .iter()
                .enumerate()
                .map(|(index, file)| async move { (index, name(ctx, file).await) })
                .collect();
            let mut in_flight = FuturesUnordered::new();
            in_flight.extend(queue.drain(..ctx.concurrency.max(1).min(queue.len())));
            while let Some((index, result)) = in_flight.next().await {
                namings[index] = Some(result);
                // Pop-n-push, FIFO.
                if let Some(next) = queue.pop_front() {
                    in_flight.push(next);
                }
            }
            namings
        };

        let mut claimed = HashSet::new();
        for (file, naming) in prepared.into_iter().zip(namings) {
            let path = file.path.clone();
            let result = match naming {
                Some(Ok(naming)) => apply(ctx, file, naming, &mut claimed),
                Some(Err(e)) => Err(e),
                // Unreachable: the loop above only ends once every future has resolved.
                None => continue,
            };
            yield result.map(RenameEvent::Processed).or_raise(|| LibraryErrorKind::Rename(path));
        }

        yield Ok(RenameEvent::Complete);
    })
}
