use crate::template::FilenameGenerator;
use retitle_extract::Extractor;
use retitle_namer::Namer;
use std::time::Duration;

/// Maximum number of naming calls in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 8;
/// Additional attempts after a retryable naming failure.
pub const DEFAULT_RETRIES: u32 = 2;
/// Delay before the first retry; doubles on every attempt after that.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Everything a rename run needs, built once from configuration.
pub struct Context {
    pub extractor: Extractor,
    pub namer: Namer,
    pub generator: FilenameGenerator,
    pub concurrency: usize,
    pub retries: u32,
    pub backoff: Duration,
    /// Work out every new name without touching the filesystem.
    pub dry_run: bool,
}
impl Context {
    pub fn new(extractor: Extractor, namer: Namer, generator: FilenameGenerator) -> Self {
        Self {
            extractor,
            namer,
            generator,
            concurrency: DEFAULT_CONCURRENCY,
            retries: DEFAULT_RETRIES,
            backoff: DEFAULT_BACKOFF,
            dry_run: false,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.retries = retries;
        self.backoff = backoff;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
