//! Page fetcher with retry and backoff
//!
//! This module obtains the body of a page or gives up on it definitively:
//! - A randomized delay before every attempt
//! - Fresh identity headers on every attempt
//! - Transport failures and non-2xx statuses are retried alike
//! - A backoff delay (twice a normal delay) between attempts
//!
//! Giving up is reported as `FetchOutcome::Failed`, never as a panic or an
//! error that would stop the crawl.

use crate::config::CrawlerConfig;
use crate::crawler::delay::DelayPolicy;
use crate::crawler::transport::Transport;
use crate::identity::IdentityProvider;
use crate::url::extract_domain;
use crate::SweepError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the page
    Fetched {
        /// HTTP status code (2xx)
        status_code: u16,
        /// Page body content
        body: String,
        /// Attempts used, including the successful one
        attempts: u32,
    },

    /// Every attempt failed
    Failed {
        /// Attempts made
        attempts: u32,
        /// The error from the last attempt
        error: SweepError,
    },
}

impl FetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fetched { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Fetches pages through a transport, retrying failed attempts
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    identity: Arc<dyn IdentityProvider>,
    delays: DelayPolicy,
    max_retries: u32,
    timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher
    ///
    /// # Arguments
    ///
    /// * `transport` - Performs the HTTP requests
    /// * `identity` - Supplies headers for each attempt
    /// * `delays` - Delay distribution before and between attempts
    /// * `max_retries` - Total attempts per URL (at least one is always made)
    /// * `timeout` - Per-request timeout
    pub fn new(
        transport: Arc<dyn Transport>,
        identity: Arc<dyn IdentityProvider>,
        delays: DelayPolicy,
        max_retries: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            identity,
            delays,
            max_retries: max_retries.max(1),
            timeout,
        }
    }

    pub fn from_config(
        config: &CrawlerConfig,
        transport: Arc<dyn Transport>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self::new(
            transport,
            identity,
            DelayPolicy::from_config(config),
            config.max_retries,
            config.request_timeout(),
        )
    }

    /// Fetches a URL, retrying up to the configured number of attempts
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return the body |
    /// | Any other status | Backoff, retry |
    /// | Timeout / connection / DNS error | Backoff, retry |
    /// | Last attempt failed | Return `Failed` |
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let domain = Url::parse(url)
            .ok()
            .and_then(|parsed| extract_domain(&parsed))
            .unwrap_or_default();

        let mut attempt = 0;
        loop {
            attempt += 1;

            tokio::time::sleep(self.delays.delay()).await;
            let headers = self.identity.next_headers(&domain);

            let error = match self.transport.get(url, headers, self.timeout).await {
                Ok(response) if response.is_success() => {
                    return FetchOutcome::Fetched {
                        status_code: response.status,
                        body: response.body,
                        attempts: attempt,
                    };
                }
                Ok(response) => SweepError::HttpStatus {
                    url: url.to_string(),
                    status: response.status,
                },
                Err(e) => e,
            };

            tracing::warn!(
                "Attempt {}/{} failed for {}: {}",
                attempt,
                self.max_retries,
                url,
                error
            );

            if attempt >= self.max_retries || !error.is_retryable() {
                return FetchOutcome::Failed {
                    attempts: attempt,
                    error,
                };
            }

            tokio::time::sleep(self.delays.backoff()).await;
        }
    }
}
