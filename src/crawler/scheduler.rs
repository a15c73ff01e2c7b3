//! Crawl scheduler
//!
//! The scheduler drives a breadth-first crawl in rounds:
//! 1. Take a batch of up to `max_workers` unvisited URLs from the frontier
//! 2. Spawn one worker task per URL (each claims its URL as it starts)
//! 3. Fold each outcome into the shared state as it completes, enqueueing
//!    newly discovered links at the back of the frontier
//! 4. Repeat until no batch can be formed or the crawl is cancelled
//!
//! Since a round finishes before the next one starts, every page at depth k
//! is dispatched before any page at depth k + 1. Within a round, links are
//! enqueued in completion order.

use crate::config::{validate_crawler_config, CrawlerConfig};
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::transport::{ReqwestTransport, Transport};
use crate::crawler::worker::Worker;
use crate::identity::{BrowserIdentity, IdentityProvider};
use crate::output::{CrawlReport, CrawlRun, CrawlStats};
use crate::state::{CrawlState, PageData, ProgressEvent, StateHandle};
use crate::url::parse_seed;
use crate::SweepError;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Everything a finished (or cancelled) crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Extracted data per successfully processed URL
    pub results: BTreeMap<String, PageData>,

    /// Every dispatched URL, in the order workers claimed them
    pub visited: Vec<String>,

    /// Summary statistics
    pub stats: CrawlStats,
}

impl CrawlOutcome {
    /// Converts the outcome into the serializable report
    pub fn into_report(self) -> CrawlReport {
        CrawlReport {
            data: self.results,
            stats: self.stats,
        }
    }
}

/// Breadth-first crawl scheduler
pub struct Scheduler {
    seed: String,
    root_domain: String,
    max_workers: usize,
    fetcher: Arc<Fetcher>,
    extractor: Arc<Extractor>,
    events: Option<UnboundedSender<ProgressEvent>>,
    cancel: CancellationToken,
    fingerprint: Option<String>,
}

impl Scheduler {
    /// Creates a scheduler using the `reqwest` transport and browser identity
    ///
    /// # Returns
    ///
    /// * `Ok(Scheduler)` - Ready to run
    /// * `Err(SweepError::Config)` - The configuration is invalid
    /// * `Err(SweepError::Reqwest)` - The HTTP client could not be built
    pub fn new(config: &CrawlerConfig) -> Result<Self, SweepError> {
        let transport = ReqwestTransport::new()?;
        let identity = BrowserIdentity::with_referer(config.seed_url.trim());
        Self::with_collaborators(config, Arc::new(transport), Arc::new(identity))
    }

    /// Creates a scheduler with explicit transport and identity collaborators
    ///
    /// The configuration is validated here, before any crawling begins.
    pub fn with_collaborators(
        config: &CrawlerConfig,
        transport: Arc<dyn Transport>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, SweepError> {
        validate_crawler_config(config)?;
        let (seed, root_domain) = parse_seed(&config.seed_url)?;

        Ok(Self {
            seed: seed.to_string(),
            extractor: Arc::new(Extractor::new(root_domain.clone())),
            root_domain,
            max_workers: config.max_workers,
            fetcher: Arc::new(Fetcher::from_config(config, transport, identity)),
            events: None,
            cancel: CancellationToken::new(),
            fingerprint: None,
        })
    }

    /// Sends a progress event for every folded outcome to `events`
    pub fn with_progress(mut self, events: UnboundedSender<ProgressEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Uses `token` as the stop signal for the crawl
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Records a configuration fingerprint in the final statistics
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Returns a token that stops the crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// Runs the crawl to completion or cancellation
    ///
    /// Per-URL failures never abort the run; they show up as visited URLs
    /// without results. On cancellation, in-flight work is abandoned and only
    /// outcomes folded before the stop signal are kept.
    pub async fn run(&self) -> CrawlOutcome {
        let started_at = Utc::now();
        let start_time = Instant::now();

        let state = StateHandle::new(CrawlState::new(self.seed.as_str()));
        let worker = Worker::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
            state.clone(),
        );

        tracing::info!(
            "Starting crawl of {} ({} workers)",
            self.seed,
            self.max_workers
        );

        let mut round = 0u64;
        let mut cancelled = false;

        'rounds: loop {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let batch = state.next_batch(self.max_workers);
            if batch.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }

            round += 1;
            tracing::debug!("Round {}: dispatching {} URLs", round, batch.len());

            let mut in_flight = JoinSet::new();
            for url in batch {
                let worker = worker.clone();
                in_flight.spawn(async move { worker.process(url).await });
            }

            loop {
                tokio::select! {
                    biased;

                    _ = self.cancel.cancelled() => {
                        tracing::warn!("Crawl cancelled, abandoning {} in-flight pages", in_flight.len());
                        in_flight.abort_all();
                        while in_flight.join_next().await.is_some() {}
                        cancelled = true;
                        break 'rounds;
                    }

                    joined = in_flight.join_next() => match joined {
                        None => break,
                        Some(Ok(Some(outcome))) => {
                            let event = state.fold(outcome);
                            self.report_progress(event);
                        }
                        // Already claimed; unreachable for layer batches
                        Some(Ok(None)) => {}
                        Some(Err(e)) => {
                            // The URL stays visited with no result
                            tracing::error!("Worker task failed: {}", e);
                        }
                    },
                }
            }
        }

        drop(worker);
        let (final_estimate, max_depth) = {
            let guard = state.lock();
            (guard.estimate(), guard.max_depth())
        };
        let (results, visited) = state.into_inner();

        let stats = CrawlStats::compute(CrawlRun {
            start_url: &self.seed,
            visited: visited.len(),
            succeeded: results.len(),
            started_at,
            finished_at: Utc::now(),
            elapsed: start_time.elapsed(),
            max_depth,
            final_estimate,
            cancelled,
            config_fingerprint: self.fingerprint.clone(),
        });

        tracing::info!(
            "Crawl {}: {} of {} pages scraped in {:?}",
            if cancelled { "cancelled" } else { "completed" },
            stats.total_pages_scraped,
            stats.total_urls_processed,
            start_time.elapsed()
        );

        CrawlOutcome {
            results,
            visited,
            stats,
        }
    }

    fn report_progress(&self, event: ProgressEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver only means nobody is watching
            let _ = events.send(event);
        }
    }
}
