//! One unit of work: claim, fetch and extract a single URL

use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::state::{PageOutcome, StateHandle};
use std::sync::Arc;

/// Processes URLs on behalf of the scheduler
///
/// Cheap to clone; every spawned task gets its own copy.
#[derive(Clone)]
pub struct Worker {
    fetcher: Arc<Fetcher>,
    extractor: Arc<Extractor>,
    state: StateHandle,
}

impl Worker {
    pub fn new(fetcher: Arc<Fetcher>, extractor: Arc<Extractor>, state: StateHandle) -> Self {
        Self {
            fetcher,
            extractor,
            state,
        }
    }

    /// Processes a single URL
    ///
    /// The URL is marked visited before anything else happens. If it was
    /// already claimed this returns None and nothing is fetched. The
    /// scheduler's batches only hold unclaimed URLs, so for it this is a
    /// guard against ever fetching a page twice.
    /// Otherwise the outcome always comes back, with absent data when the
    /// fetch gave up or the page could not be extracted.
    pub async fn process(&self, url: String) -> Option<PageOutcome> {
        if !self.state.claim(&url) {
            tracing::debug!("Skipping {}: already claimed", url);
            return None;
        }

        tracing::info!("Processing: {}", url);

        let outcome = match self.fetcher.fetch(&url).await {
            FetchOutcome::Fetched { body, .. } => match self.extractor.extract(&body, &url) {
                Ok(page) => {
                    tracing::info!("Successfully scraped: {}", url);
                    PageOutcome {
                        url,
                        data: Some(page.data),
                        links: page.links,
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to extract {}: {}", url, e);
                    PageOutcome::failed(url)
                }
            },
            FetchOutcome::Failed { attempts, error } => {
                tracing::warn!("Giving up on {} after {} attempts: {}", url, attempts, error);
                PageOutcome::failed(url)
            }
        };

        Some(outcome)
    }
}
