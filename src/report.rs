use retitle_library::rename::Outcome;
use retitle_namer::Usage;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use time::macros::format_description;

/// Tallies a rename run and logs a summary at the end.
pub struct Report {
    started_at: OffsetDateTime,
    clock: Instant,
    renamed: usize,
    unchanged: usize,
    planned: usize,
    skipped: usize,
    failed: usize,
    /// Files that got a name from the model, whatever happened next.
    named: usize,
    usage: Usage,
}
impl Report {
    pub fn start() -> Self {
        Self {
            started_at: OffsetDateTime::now_utc(),
            clock: Instant::now(),
            renamed: 0,
            unchanged: 0,
            planned: 0,
            skipped: 0,
            failed: 0,
            named: 0,
            usage: Usage::default(),
        }
    }

    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Renamed { .. } => self.renamed += 1,
            Outcome::AlreadyCorrect { .. } => self.unchanged += 1,
            Outcome::Planned { .. } => self.planned += 1,
            Outcome::Skipped { path, reason } => {
                tracing::info!(path = %path.display(), %reason, "Skipped");
                self.skipped += 1;
            },
        }
        if let Some(naming) = outcome.naming() {
            self.named += 1;
            self.usage += naming.usage;
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    fn processed(&self) -> usize {
        self.renamed + self.unchanged + self.planned + self.skipped + self.failed
    }

    fn average_tokens(&self) -> u64 {
        match self.named {
            0 => 0,
            n => self.usage.total() / n as u64,
        }
    }

    fn average_duration(&self, elapsed: Duration) -> Duration {
        match u32::try_from(self.processed()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => elapsed / n,
        }
    }

    fn clock_time(at: OffsetDateTime) -> String {
        at.format(format_description!("[hour]:[minute]:[second]Z")).unwrap_or_default()
    }

    pub fn finish(self) {
        let elapsed = self.clock.elapsed();
        let finished_at = self.started_at + elapsed;
        tracing::info!(
            renamed = self.renamed,
            unchanged = self.unchanged,
            planned = self.planned,
            skipped = self.skipped,
            failed = self.failed,
            "Processed {} files",
            self.processed(),
        );
        tracing::info!(
            total = self.usage.total(),
            prompt = self.usage.prompt_tokens,
            completion = self.usage.completion_tokens,
            average = self.average_tokens(),
            "Token usage",
        );
        tracing::info!(
            started = %Self::clock_time(self.started_at),
            finished = %Self::clock_time(finished_at),
            elapsed = ?elapsed,
            per_file = ?self.average_duration(elapsed),
            "Timing",
        );
    }
}
