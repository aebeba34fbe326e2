//! Command-line interface.

use crate::error::{ErrorKind, Result};
use crate::report::Report;
use clap::{Args, Parser, Subcommand};
use exn::ResultExt;
use futures::StreamExt;
use futures::future::Either;
use retitle_config::Config;
use retitle_extract::{Extractor, ExtractorOptions};
use retitle_library::error::ErrorKind as LibraryErrorKind;
use retitle_library::rename::{RenameEvent, rename_concurrent, rename_sequential};
use retitle_library::{Context, DEFAULT_BACKOFF, FilenameGenerator, scramble};
use retitle_namer::{Namer, NamerOptions, OpenAiClient};
use std::ops::Deref;
use std::path::PathBuf;
use time::OffsetDateTime;

/// Rename e-books and documents from their content using a language model.
#[derive(Debug, Parser)]
#[command(name = "retitle", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, global = true, env = "RETITLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rename every PDF, EPUB, MOBI and AZW3 file in a folder.
    Rename(RenameArgs),
    /// Check that the language model answers.
    Check,
    /// Rename every document in a folder to a random 8-digit number.
    Scramble(ScrambleArgs),
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Folder of documents; defaults to `library.folder` or `PDF_DIR`.
    pub folder: Option<PathBuf>,

    /// Process one file at a time instead of overlapping model calls.
    #[arg(long)]
    pub sequential: bool,

    /// Maximum model calls in flight.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Retries after a rate limit, timeout or server error.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Show what would be renamed without renaming anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Filename template, e.g. `{{ author|ascii }} - {{ title|ascii }}`.
    #[arg(long)]
    pub template: Option<String>,

    /// Don't check the model connection before starting.
    #[arg(long)]
    pub skip_check: bool,
}
impl RenameArgs {
    /// Command-line flags beat every other configuration source.
    fn apply(&self, config: &mut Config) {
        if let Some(folder) = &self.folder {
            config.library.folder = Some(folder.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config.library.concurrency = concurrency;
        }
        if let Some(retries) = self.retries {
            config.library.retries = retries;
        }
        if self.dry_run {
            config.library.dry_run = true;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.llm.base_url = base_url.clone();
        }
        if let Some(template) = &self.template {
            config.library.template = template.clone();
        }
    }
}

#[derive(Debug, Args)]
pub struct ScrambleArgs {
    /// Folder of documents; defaults to `library.folder` or `PDF_DIR`.
    pub folder: Option<PathBuf>,

    /// Seed for the generated names; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
}

fn namer(config: &Config) -> Result<Namer> {
    let api_key = config.api_key().or_raise(|| ErrorKind::Config)?;
    let client = OpenAiClient::new(&config.llm.base_url, api_key, config.llm.timeout()).or_raise(|| ErrorKind::Setup)?;
    let options = NamerOptions {
        model: config.llm.model.clone(),
        fallback_model: config.llm.fallback_model.clone(),
        filename_first: config.llm.filename_first,
    };
    Ok(Namer::new(client, options))
}

fn generator(config: &Config) -> Result<FilenameGenerator> {
    config.library.template.parse::<FilenameGenerator>().or_raise(|| ErrorKind::Config)
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Rename(args) => {
            args.apply(&mut config);
            config.validate().or_raise(|| ErrorKind::Config)?;
            tracing::debug!(?config, "Loaded configuration");
            rename(&config, &args).await
        },
        Command::Check => {
            config.validate().or_raise(|| ErrorKind::Config)?;
            namer(&config)?.ping().await.or_raise(|| ErrorKind::Connection)
        },
        Command::Scramble(args) => {
            if let Some(folder) = args.folder {
                config.library.folder = Some(folder);
            }
            let folder = config.folder().or_raise(|| ErrorKind::Config)?;
            let seed = args.seed.unwrap_or_else(|| OffsetDateTime::now_utc().unix_timestamp_nanos() as u64);
            let report = scramble(folder, seed).or_raise(|| ErrorKind::Discovery)?;
            tracing::info!(scrambled = report.scrambled.len(), failed = report.failed.len(), seed, "Scramble complete");
            Ok(())
        },
    }
}

async fn rename(config: &Config, args: &RenameArgs) -> Result<()> {
    let folder = config.folder().or_raise(|| ErrorKind::Config)?;
    let generator = generator(config)?;
    let namer = namer(config)?;
    if !args.skip_check {
        namer.ping().await.or_raise(|| ErrorKind::Connection)?;
    }
    let extractor = Extractor::new(ExtractorOptions {
        max_pages: config.extract.max_pages,
        converter: config.extract.converter.clone(),
    });
    if extractor.converter().is_none() {
        tracing::warn!("ebook-convert not found; MOBI and AZW3 files will fail to extract");
    }
    let ctx = Context::new(extractor, namer, generator)
        .with_concurrency(config.library.concurrency)
        .with_retries(config.library.retries, DEFAULT_BACKOFF)
        .with_dry_run(config.library.dry_run);

    let events = match args.sequential {
        true => Either::Left(rename_sequential(folder, &ctx)),
        false => Either::Right(rename_concurrent(folder, &ctx)),
    };
    let mut events = std::pin::pin!(events);
    let mut report = Report::start();
    while let Some(event) = events.next().await {
        match event {
            Ok(RenameEvent::Started) => {
                tracing::info!(folder = %folder.display(), sequential = args.sequential, dry_run = ctx.dry_run, "Starting");
            },
            Ok(RenameEvent::DiscoveryComplete(files)) => tracing::info!(files, "Discovered documents"),
            Ok(RenameEvent::Processed(outcome)) => report.record(&outcome),
            Ok(RenameEvent::Complete) => {},
            Err(e) if matches!(e.deref(), LibraryErrorKind::Discovery(_)) => {
                return Err(e).or_raise(|| ErrorKind::Discovery);
            },
            Err(e) => {
                tracing::error!("{e:?}");
                report.record_failure();
            },
        }
    }
    report.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_rename_flags_override_config() {
        let cli = Cli::try_parse_from([
            "retitle",
            "rename",
            "/books",
            "--sequential",
            "-j",
            "3",
            "--retries",
            "0",
            "--dry-run",
            "--model",
            "deepseek-ai/DeepSeek-R1",
            "--template",
            "{{ title|slug }}",
        ])
        .unwrap();
        let Command::Rename(args) = cli.command else {
            panic!("expected rename");
        };
        assert!(args.sequential);
        assert!(!args.skip_check);

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.folder().unwrap(), std::path::Path::new("/books"));
        assert_eq!(config.library.concurrency, 3);
        assert_eq!(config.library.retries, 0);
        assert!(config.library.dry_run);
        assert_eq!(config.llm.model, "deepseek-ai/DeepSeek-R1");
        assert_eq!(config.library.template, "{{ title|slug }}");
        assert_eq!(config.llm.base_url, retitle_namer::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_configured_template_is_compiled() {
        let mut config = Config::default();
        assert!(generator(&config).is_ok());

        config.library.template = "{{ title".to_string();
        let error = generator(&config).unwrap_err();
        assert!(matches!(error.deref(), ErrorKind::Config));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["retitle", "check", "--log-level", "debug", "-c", "retitle.toml"]).unwrap();
        assert!(matches!(cli.command, Command::Check));
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.config, Some(PathBuf::from("retitle.toml")));
    }

    #[test]
    fn test_scramble_args() {
        let cli = Cli::try_parse_from(["retitle", "scramble", "--seed", "42"]).unwrap();
        let Command::Scramble(args) = cli.command else {
            panic!("expected scramble");
        };
        assert_eq!(args.seed, Some(42));
        assert!(args.folder.is_none());
    }
}
