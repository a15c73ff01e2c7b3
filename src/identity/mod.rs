//! Request identity
//!
//! Every request attempt asks an `IdentityProvider` for a fresh header set, so
//! consecutive requests (including retries of the same URL) do not share a
//! fixed fingerprint. `BrowserIdentity` rotates through common desktop browser
//! User-Agent strings.

use rand::seq::SliceRandom;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, DNT, REFERER, USER_AGENT,
};

/// Supplies the headers for one request attempt
pub trait IdentityProvider: Send + Sync {
    /// Returns a header set for a request to `domain`
    ///
    /// The result always includes a User-Agent.
    fn next_headers(&self, domain: &str) -> HeaderMap;
}

/// Desktop browser User-Agent strings to rotate through
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// Identity provider mimicking ordinary browser traffic
#[derive(Debug, Clone, Default)]
pub struct BrowserIdentity {
    /// Referer sent with every request (the crawl's seed URL)
    referer: Option<String>,
}

impl BrowserIdentity {
    /// Creates a provider that sends no Referer
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that sends `referer` with every request
    pub fn with_referer(referer: impl Into<String>) -> Self {
        Self {
            referer: Some(referer.into()),
        }
    }

    fn random_user_agent() -> &'static str {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }
}

impl IdentityProvider for BrowserIdentity {
    fn next_headers(&self, domain: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(Self::random_user_agent()),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        if let Some(referer) = &self.referer {
            match HeaderValue::from_str(referer) {
                Ok(value) => {
                    headers.insert(REFERER, value);
                }
                Err(e) => {
                    tracing::debug!("Skipping Referer for {}: {}", domain, e);
                }
            }
        }

        headers
    }
}
