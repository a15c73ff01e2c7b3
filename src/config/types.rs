use crate::config::validation::MAX_SECONDS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for Sumi-Sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// URL the crawl starts from; its host bounds the crawl
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Maximum number of pages fetched in parallel (batch size per round)
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// Attempts per URL before it is given up on
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Lower bound of the randomized pre-request delay (seconds)
    #[serde(rename = "min-delay")]
    pub min_delay: f64,

    /// Upper bound of the randomized pre-request delay (seconds)
    #[serde(rename = "max-delay")]
    pub max_delay: f64,

    /// Smallest delay ever slept (seconds)
    #[serde(rename = "delay-floor")]
    pub delay_floor: f64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: f64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            max_workers: default_workers(),
            max_retries: 3,
            min_delay: 1.0,
            max_delay: 3.0,
            delay_floor: 0.1,
            request_timeout: 30.0,
        }
    }
}

impl CrawlerConfig {
    /// Creates a default configuration for the given seed URL
    pub fn for_seed(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            ..Self::default()
        }
    }

    /// Returns the configured delay bounds as durations
    ///
    /// Out-of-range values are clamped; validation reports them first.
    pub fn delay_range(&self) -> (Duration, Duration) {
        (seconds(self.min_delay), seconds(self.max_delay))
    }

    pub fn delay_floor(&self) -> Duration {
        seconds(self.delay_floor)
    }

    pub fn request_timeout(&self) -> Duration {
        seconds(self.request_timeout)
    }
}

/// Converts a seconds setting, clamped to `[0, MAX_SECONDS]` (NaN is zero)
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.clamp(0.0, MAX_SECONDS)).unwrap_or_default()
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON report; stdout when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Directory receiving `scraper.log`
    ///
    /// Logs never go to the terminal, which belongs to the progress bar.
    #[serde(rename = "log-dir")]
    pub log_dir: String,

    /// Draw the live progress bar
    #[serde(rename = "show-progress")]
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            log_dir: DEFAULT_LOG_DIR.to_string(),
            show_progress: true,
        }
    }
}

/// Log directory used when none is configured
pub const DEFAULT_LOG_DIR: &str = "logs";

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
