//! Crawl statistics
//!
//! This module provides the summary computed once at the end of a crawl and
//! its human-readable rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlStats {
    /// The seed URL
    pub start_url: String,

    /// URLs that produced data
    pub total_pages_scraped: u64,

    /// URLs dispatched to a worker
    pub total_urls_processed: u64,

    /// URLs dispatched without producing data
    pub failed_urls: u64,

    /// Scraped / processed, in percent
    pub success_rate: f64,

    /// Wall-clock duration of the crawl
    pub duration_seconds: f64,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    /// Deepest BFS layer dispatched (seed = 0)
    pub max_depth: u32,

    /// Progress estimate when the crawl ended
    pub final_estimate: u64,

    /// Whether the crawl was stopped before the frontier emptied
    pub cancelled: bool,

    /// SHA-256 of the effective configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_fingerprint: Option<String>,
}

/// What a finished (or cancelled) run observed, before any derivation
#[derive(Debug, Clone)]
pub struct CrawlRun<'a> {
    /// The seed URL
    pub start_url: &'a str,

    /// Size of the visited set
    pub visited: usize,

    /// Size of the result map
    pub succeeded: usize,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    /// Monotonic duration of the run
    pub elapsed: Duration,

    pub max_depth: u32,

    pub final_estimate: u64,

    pub cancelled: bool,

    pub config_fingerprint: Option<String>,
}

impl CrawlStats {
    /// Computes statistics from the final visited and result counts
    ///
    /// Failures are visited URLs without a result. The success rate is zero
    /// when nothing was visited.
    pub fn compute(run: CrawlRun<'_>) -> Self {
        let visited = run.visited as u64;
        let succeeded = run.succeeded as u64;

        let success_rate = if visited > 0 {
            (succeeded as f64 / visited as f64) * 100.0
        } else {
            0.0
        };

        Self {
            start_url: run.start_url.to_string(),
            total_pages_scraped: succeeded,
            total_urls_processed: visited,
            failed_urls: visited.saturating_sub(succeeded),
            success_rate,
            duration_seconds: run.elapsed.as_secs_f64(),
            started_at: run.started_at,
            finished_at: run.finished_at,
            max_depth: run.max_depth,
            final_estimate: run.final_estimate,
            cancelled: run.cancelled,
            config_fingerprint: run.config_fingerprint,
        }
    }

    /// Average pages processed per second
    pub fn pages_per_second(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            self.total_urls_processed as f64 / self.duration_seconds
        } else {
            0.0
        }
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Stdout is left alone because it may carry the JSON report.
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStats) {
    eprintln!("=== Crawl Statistics ===\n");

    eprintln!("Overview:");
    eprintln!("  Start URL: {}", stats.start_url);
    eprintln!("  URLs processed: {}", stats.total_urls_processed);
    eprintln!("  Pages scraped: {}", stats.total_pages_scraped);
    eprintln!("  Failed URLs: {}", stats.failed_urls);
    eprintln!("  Deepest layer: {}", stats.max_depth);
    eprintln!(
        "  Duration: {:.1}s ({:.2} pages/sec)",
        stats.duration_seconds,
        stats.pages_per_second()
    );
    if stats.cancelled {
        eprintln!("  Interrupted before the frontier was exhausted");
    }
    eprintln!();

    eprintln!(
        "Success Rate: {:.1}% ({} / {} URLs successfully scraped)",
        stats.success_rate, stats.total_pages_scraped, stats.total_urls_processed
    );
}
