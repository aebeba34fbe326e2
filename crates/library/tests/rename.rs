#![cfg(unix)]

use exn::Exn;
use futures::StreamExt;
use retitle_extract::{Extractor, ExtractorOptions};
use retitle_library::error::{Error, ErrorKind};
use retitle_library::rename::{Outcome, RenameEvent, SkipReason, rename_concurrent, rename_file, rename_sequential};
use retitle_library::{Context, DEFAULT_TEMPLATE};
use retitle_namer::error::{ErrorKind as NamerErrorKind, Result as NamerResult};
use retitle_namer::{CompletionRequest, MockClient, Namer, NamerOptions, Phase};
use std::fs;
use std::ops::Deref;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    books: PathBuf,
    converter: PathBuf,
}
impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let converter = dir.path().join("ebook-convert");
        fs::write(&converter, "#!/bin/sh\ncp \"$1\" \"$2\"\n").unwrap();
        fs::set_permissions(&converter, fs::Permissions::from_mode(0o755)).unwrap();
        let books = dir.path().join("books");
        fs::create_dir(&books).unwrap();
        Self { _dir: dir, books, converter }
    }

    /// The fake converter copies its input, so a `.mobi` "book" is just text.
    fn book(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.books.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn context(&self, client: Arc<MockClient>, filename_first: bool) -> Context {
        let extractor = Extractor::new(ExtractorOptions { converter: Some(self.converter.clone()), ..Default::default() });
        let namer = Namer::from_shared(client, NamerOptions { filename_first, ..Default::default() });
        Context::new(extractor, namer, DEFAULT_TEMPLATE.parse().unwrap()).with_retries(2, Duration::from_millis(1))
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<_> =
            fs::read_dir(&self.books).unwrap().map(|e| e.unwrap().file_name().to_string_lossy().into_owned()).collect();
        names.sort();
        names
    }
}

/// Answers content prompts with `first line - second line` of the document text.
fn answer_from_text(request: &CompletionRequest) -> NamerResult<String> {
    let Some(text) = request.prompt.split("Text:\n").nth(1) else {
        return Ok("MORE".to_string());
    };
    let mut lines = text.lines();
    let title = lines.next().unwrap_or_default();
    Ok(match lines.next() {
        Some(author) => format!("{title} - {author}"),
        None => title.to_string(),
    })
}

#[derive(Default)]
struct Run {
    events: Vec<RenameEvent>,
    errors: Vec<Error>,
}
impl Run {
    async fn collect(stream: impl futures::Stream<Item = retitle_library::error::Result<RenameEvent>>) -> Self {
        let mut run = Run::default();
        let mut stream = std::pin::pin!(stream);
        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => run.events.push(event),
                Err(e) => run.errors.push(e),
            }
        }
        run
    }

    fn outcomes(&self) -> Vec<&Outcome> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RenameEvent::Processed(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }

    fn assert_complete(&self, discovered: u64) {
        assert!(matches!(self.events.first(), Some(RenameEvent::Started)));
        assert!(matches!(self.events.get(1), Some(RenameEvent::DiscoveryComplete(n)) if *n == discovered));
        assert!(matches!(self.events.last(), Some(RenameEvent::Complete)));
    }
}

fn failed_path(error: &Error) -> &Path {
    match error.deref() {
        ErrorKind::Rename(path) => path,
        other => panic!("unexpected error kind: {other}"),
    }
}

#[rstest::rstest]
#[case::sequential(false)]
#[case::concurrent(true)]
#[tokio::test]
async fn test_batch_survives_partial_failure(#[case] concurrent: bool) {
    let fixture = Fixture::new();
    fixture.book("01.mobi", "The Great Gatsby\n\nF. Scott Fitzgerald\n\nIn my younger and more vulnerable years");
    let broken = fixture.book("02.pdf", "this is not a pdf");
    fixture.book("03.mobi", "Introduction to Algorithms\n");
    fixture.book("04.mobi", "\n\n   \n");
    fixture.book("05.azw3", "Dune\n\nFrank Herbert");
    let client = Arc::new(MockClient::new(answer_from_text));
    let ctx = fixture.context(client.clone(), false);

    let run = match concurrent {
        true => Run::collect(rename_concurrent(&fixture.books, &ctx)).await,
        false => Run::collect(rename_sequential(&fixture.books, &ctx)).await,
    };

    run.assert_complete(5);
    assert_eq!(run.errors.len(), 1);
    assert_eq!(failed_path(&run.errors[0]), broken);
    let outcomes = run.outcomes();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes.iter().filter(|o| matches!(o, Outcome::Renamed { .. })).count(), 3);
    assert!(outcomes.iter().any(|o| matches!(o, Outcome::Skipped { reason: SkipReason::NoText, .. })));
    // The empty document was never sent to the model.
    assert_eq!(client.calls(), 3);
    assert_eq!(
        fixture.names(),
        [
            "02.pdf",
            "04.mobi",
            "Dune - Frank Herbert.azw3",
            "Introduction to Algorithms.mobi",
            "The Great Gatsby - F Scott Fitzgerald.mobi",
        ]
    );
}

#[rstest::rstest]
#[case::sequential(false)]
#[case::concurrent(true)]
#[tokio::test]
async fn test_collisions_are_suffixed(#[case] concurrent: bool) {
    let fixture = Fixture::new();
    fixture.book("a.mobi", "Dune\n\nFrank Herbert");
    fixture.book("b.mobi", "Dune\n\nFrank Herbert");
    fixture.book("Dune - Frank Herbert (2).mobi", "Dune\n\nFrank Herbert");
    let ctx = fixture.context(Arc::new(MockClient::new(answer_from_text)), false);

    let run = match concurrent {
        true => Run::collect(rename_concurrent(&fixture.books, &ctx)).await,
        false => Run::collect(rename_sequential(&fixture.books, &ctx)).await,
    };

    assert!(run.errors.is_empty());
    let outcomes = run.outcomes();
    assert!(matches!(outcomes[0], Outcome::AlreadyCorrect { .. }));
    assert_eq!(
        fixture.names(),
        ["Dune - Frank Herbert (2).mobi", "Dune - Frank Herbert (3).mobi", "Dune - Frank Herbert.mobi"]
    );
}

#[tokio::test]
async fn test_dry_run_touches_nothing() {
    let fixture = Fixture::new();
    let book = fixture.book("545.mobi", "The Great Gatsby\n\nF. Scott Fitzgerald");
    fixture.book("546.mobi", "The Great Gatsby\n\nF. Scott Fitzgerald");
    let ctx = fixture.context(Arc::new(MockClient::new(answer_from_text)), false).with_dry_run(true);

    let run = Run::collect(rename_sequential(&fixture.books, &ctx)).await;

    run.assert_complete(2);
    let planned: Vec<_> = run
        .outcomes()
        .into_iter()
        .map(|outcome| match outcome {
            Outcome::Planned { from, to, .. } => (from.clone(), to.file_name().unwrap().to_string_lossy().into_owned()),
            other => panic!("unexpected outcome: {other:?}"),
        })
        .collect();
    assert_eq!(planned[0], (book, "The Great Gatsby - F Scott Fitzgerald.mobi".to_string()));
    // Claimed by the first plan even though nothing was renamed.
    assert_eq!(planned[1].1, "The Great Gatsby - F Scott Fitzgerald (2).mobi");
    assert_eq!(fixture.names(), ["545.mobi", "546.mobi"]);
}

#[tokio::test]
async fn test_filename_phase_skips_content() {
    let fixture = Fixture::new();
    fixture.book("Dune_Frank_Herbert_1965.mobi", "Book One\n\nBeginnings");
    fixture.book("scan0001.mobi", "The Great Gatsby\n\nF. Scott Fitzgerald");
    let client = Arc::new(MockClient::new(|request| match request.prompt.contains("Dune_Frank_Herbert_1965") {
        true if !request.prompt.contains("Text:\n") => Ok("Dune - Frank Herbert".to_string()),
        _ => answer_from_text(request),
    }));
    let ctx = fixture.context(client.clone(), true);

    let run = Run::collect(rename_sequential(&fixture.books, &ctx)).await;

    assert!(run.errors.is_empty());
    let phases: Vec<_> = run.outcomes().iter().map(|o| o.naming().unwrap().phase).collect();
    assert_eq!(phases, [Phase::Filename, Phase::Content]);
    assert_eq!(client.calls(), 3);
    assert_eq!(fixture.names(), ["Dune - Frank Herbert.mobi", "The Great Gatsby - F Scott Fitzgerald.mobi"]);
}

#[tokio::test]
async fn test_retryable_failures_are_retried() {
    let fixture = Fixture::new();
    let book = fixture.book("1.mobi", "Dune\n\nFrank Herbert");
    let attempts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = attempts.clone();
    let client = Arc::new(MockClient::new(move |request| {
        match counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) {
            0 | 1 => Err(Exn::from(NamerErrorKind::RateLimited)),
            _ => answer_from_text(request),
        }
    }));
    let ctx = fixture.context(client.clone(), false);

    let outcome = rename_file(&ctx, &book).await.unwrap();
    assert!(matches!(outcome, Outcome::Renamed { ref to, .. } if to.ends_with("Dune - Frank Herbert.mobi")));
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_retries_give_up() {
    let fixture = Fixture::new();
    let book = fixture.book("1.mobi", "Dune\n\nFrank Herbert");
    let client = Arc::new(MockClient::new(|_| Err(Exn::from(NamerErrorKind::Status(503)))));
    let ctx = fixture.context(client.clone(), false);

    let error = rename_file(&ctx, &book).await.unwrap_err();
    assert_eq!(failed_path(&error), book);
    // One attempt plus two retries.
    assert_eq!(client.calls(), 3);
    assert!(book.exists());

    // Unparseable replies aren't retried.
    let client = Arc::new(MockClient::replying(""));
    let ctx = fixture.context(client.clone(), false);
    assert!(rename_file(&ctx, &book).await.is_err());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_missing_folder_ends_the_stream() {
    let fixture = Fixture::new();
    let ctx = fixture.context(Arc::new(MockClient::new(answer_from_text)), false);
    let missing = fixture.books.join("missing");

    let run = Run::collect(rename_concurrent(&missing, &ctx)).await;

    assert_eq!(run.events.len(), 1);
    assert!(matches!(run.events[0], RenameEvent::Started));
    assert!(matches!(run.errors[0].deref(), ErrorKind::Discovery(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_naming_overlaps() {
    const FILES: u32 = 15;
    const LATENCY: Duration = Duration::from_millis(200);
    let fixture = Fixture::new();
    for n in 0..FILES {
        fixture.book(&format!("{n:02}.mobi"), &format!("Volume {n}\n\nSome Author"));
    }
    let client = Arc::new(MockClient::new(answer_from_text).with_latency(LATENCY));
    let ctx = fixture.context(client.clone(), false);

    let started = Instant::now();
    let run = Run::collect(rename_concurrent(&fixture.books, &ctx)).await;
    let elapsed = started.elapsed();

    run.assert_complete(u64::from(FILES));
    assert!(run.errors.is_empty());
    assert_eq!(run.outcomes().len(), FILES as usize);
    assert_eq!(client.calls(), FILES as usize);
    assert!(elapsed < LATENCY * FILES, "took {elapsed:?}");
    assert!(fixture.names().iter().all(|name| name.starts_with("Volume ") && name.ends_with(" - Some Author.mobi")));
}
