//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP transport and fetching with retry/backoff
//! - Randomized request delays
//! - HTML extraction and the same-domain link filter
//! - The breadth-first scheduler and its workers

mod delay;
mod extractor;
mod fetcher;
mod scheduler;
mod transport;
mod worker;

pub use delay::{DelayPolicy, DEFAULT_DELAY_FLOOR};
pub use extractor::{ExtractedPage, Extractor};
pub use fetcher::{FetchOutcome, Fetcher};
pub use scheduler::{CrawlOutcome, Scheduler};
pub use transport::{build_http_client, ReqwestTransport, Transport, TransportResponse};
pub use worker::Worker;

use crate::config::CrawlerConfig;
use crate::SweepError;

/// Runs a complete crawl with the default transport and identity
///
/// This is the simplest entry point: no progress events, no external stop
/// signal. Build a [`Scheduler`] directly for either.
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl finished
/// * `Err(SweepError)` - Configuration invalid or HTTP client unavailable
pub async fn crawl(config: &CrawlerConfig) -> Result<CrawlOutcome, SweepError> {
    let scheduler = Scheduler::new(config)?;
    Ok(scheduler.run().await)
}
