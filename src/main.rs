//! Sumi-Sweep main entry point
//!
//! This is the command-line interface for the Sumi-Sweep same-domain scraper.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sumi_sweep::config::{config_fingerprint, read_config, validate, Config};
use sumi_sweep::crawler::Scheduler;
use sumi_sweep::output::{print_statistics, write_report, ProgressReporter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Log file created inside the log directory
const LOG_FILE_NAME: &str = "scraper.log";

/// Sumi-Sweep: a same-domain breadth-first scraper
///
/// Sumi-Sweep crawls every page reachable from a seed URL on the seed's own
/// host, extracts title, visible text and meta description from each, and
/// writes the results as JSON.
#[derive(Parser, Debug)]
#[command(name = "sumi-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A same-domain breadth-first scraper", long_about = None)]
struct Cli {
    /// Seed URL (overrides `seed-url` from the config file)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum delay before each request, in seconds
    #[arg(long, value_name = "SECONDS")]
    min_delay: Option<f64>,

    /// Maximum delay before each request, in seconds
    #[arg(long, value_name = "SECONDS")]
    max_delay: Option<f64>,

    /// Attempts per URL before giving up
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Per-request timeout, in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// Append logs to DIR/scraper.log [default: logs]
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Suppress non-error output and the progress bar
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Builds the effective configuration: defaults < config file < flags
    fn build_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => read_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(url) = &self.url {
            config.crawler.seed_url = url.clone();
        }
        if let Some(min_delay) = self.min_delay {
            config.crawler.min_delay = min_delay;
        }
        if let Some(max_delay) = self.max_delay {
            config.crawler.max_delay = max_delay;
        }
        if let Some(retries) = self.retries {
            config.crawler.max_retries = retries;
        }
        if let Some(workers) = self.workers {
            config.crawler.max_workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.crawler.request_timeout = timeout;
        }
        if let Some(log_dir) = &self.log_dir {
            config.output.log_dir = log_dir.display().to_string();
        }
        if let Some(output) = &self.output {
            config.output.path = Some(output.display().to_string());
        }
        if self.quiet {
            config.output.show_progress = false;
        }

        validate(&config).context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.build_config()?;

    // Flushes buffered log lines when dropped at the end of main
    let _log_guard = setup_logging(cli.verbose, cli.quiet, Path::new(&config.output.log_dir))?;

    let fingerprint = config_fingerprint(&config)?;
    tracing::info!("Configuration loaded (fingerprint: {})", fingerprint);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping crawl");
                cancel.cancel();
            }
        });
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let reporter = ProgressReporter::new(config.output.show_progress);
    let reporter_task = tokio::spawn(reporter.run(rx));

    let scheduler = Scheduler::new(&config.crawler)?
        .with_progress(tx)
        .with_cancellation(cancel)
        .with_fingerprint(fingerprint);
    let outcome = scheduler.run().await;

    // Closes the progress channel so the reporter can finish
    drop(scheduler);
    if let Err(e) = reporter_task.await {
        tracing::error!("Progress reporter failed: {}", e);
    }

    if !cli.quiet {
        print_statistics(&outcome.stats);
    }

    let cancelled = outcome.stats.cancelled;
    let output = config.output.path.as_deref().map(Path::new);
    write_report(&outcome.into_report(), output).context("Failed to write report")?;

    if cancelled {
        tracing::warn!("Crawl was interrupted; report is partial");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Lines are appended to `scraper.log` in `log_dir` through a background
/// writer, so the terminal stays free for the progress bar and the summary.
fn setup_logging(verbose: u8, quiet: bool, log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sweep=info,warn"),
            1 => EnvFilter::new("sumi_sweep=debug,info"),
            2 => EnvFilter::new("sumi_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let (writer, guard) = open_log_writer(log_dir)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();

    Ok(guard)
}

/// Opens `scraper.log` in `log_dir` (creating the directory) for appending
fn open_log_writer(log_dir: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(log_dir)
        .with_context(|| format!("Failed to open log file in {}", log_dir.display()))?;
    Ok(tracing_appender::non_blocking(appender))
}
