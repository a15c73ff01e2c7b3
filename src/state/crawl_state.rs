//! Shared crawl state
//!
//! The frontier, the visited set, the result map and the progress estimate live
//! together in one `CrawlState` behind one mutex. There is no other lock, so
//! there is no lock ordering to get wrong. The lock is only ever held for
//! in-memory bookkeeping, never across a fetch or a delay.
//!
//! Every known URL carries its BFS depth (seed = 0). A batch never spans two
//! depths, so all pages of one layer are dispatched before the next layer.

use crate::state::page_data::{PageData, PageOutcome};
use crate::state::progress::{ProgressEstimator, ProgressEvent};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueuedUrl {
    url: String,
    depth: u32,
}

/// Everything the scheduler and its workers share during one crawl
#[derive(Debug)]
pub struct CrawlState {
    /// URLs awaiting dispatch, in discovery order
    frontier: VecDeque<QueuedUrl>,

    /// Mirror of `frontier` contents for O(1) membership checks
    queued: HashSet<String>,

    /// URLs claimed by a worker
    visited: HashSet<String>,

    /// `visited` in claim order
    visit_order: Vec<String>,

    /// BFS depth of every queued or visited URL
    depths: HashMap<String, u32>,

    /// Extracted data for URLs that succeeded
    results: BTreeMap<String, PageData>,

    /// Units of work folded in so far
    completed: u64,

    progress: ProgressEstimator,
}

impl CrawlState {
    /// Creates the state for a crawl starting at `seed`
    pub fn new(seed: impl Into<String>) -> Self {
        Self::with_estimator(seed, ProgressEstimator::new())
    }

    /// Creates the state with a custom progress estimator
    pub fn with_estimator(seed: impl Into<String>, progress: ProgressEstimator) -> Self {
        let seed = seed.into();
        let mut state = Self {
            frontier: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            visit_order: Vec::new(),
            depths: HashMap::new(),
            results: BTreeMap::new(),
            completed: 0,
            progress,
        };
        state.enqueue(seed, 0);
        state
    }

    /// Appends a URL to the back of the frontier unless it is already known
    ///
    /// Returns true if the URL was enqueued.
    fn enqueue(&mut self, url: String, depth: u32) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.depths.insert(url.clone(), depth);
        self.frontier.push_back(QueuedUrl { url, depth });
        true
    }

    /// Takes up to `max` unvisited URLs from the front of the frontier
    ///
    /// Entries that were visited since they were queued are dropped, and the
    /// batch stops at the first URL of a deeper layer. An empty batch means
    /// the frontier holds nothing left to crawl.
    pub fn next_batch(&mut self, max: usize) -> Vec<String> {
        let mut batch = Vec::with_capacity(max.min(self.frontier.len()));
        let mut layer = None;

        while batch.len() < max {
            let Some(front) = self.frontier.front() else {
                break;
            };
            if layer.is_some_and(|depth| depth != front.depth) {
                break;
            }

            let Some(queued) = self.frontier.pop_front() else {
                break;
            };
            self.queued.remove(&queued.url);
            if !self.visited.contains(&queued.url) {
                layer = Some(queued.depth);
                batch.push(queued.url);
            }
        }

        batch
    }

    /// Marks a URL visited as its worker starts
    ///
    /// Returns false if another worker already claimed it, in which case the
    /// caller must not process it.
    pub fn claim(&mut self, url: &str) -> bool {
        if !self.visited.insert(url.to_string()) {
            return false;
        }
        self.visit_order.push(url.to_string());
        true
    }

    /// Folds one unit of work into the shared state
    ///
    /// Records the page data, enqueues the links that are neither visited nor
    /// already queued, and raises the progress estimate.
    pub fn fold(&mut self, outcome: PageOutcome) -> ProgressEvent {
        let PageOutcome { url, data, links } = outcome;
        let succeeded = data.is_some();
        let child_depth = self.depth_of(&url).unwrap_or(0).saturating_add(1);

        if let Some(data) = data {
            self.results.insert(url.clone(), data);
        }
        self.completed += 1;

        let fresh: Vec<String> = links
            .into_iter()
            .filter(|link| !self.visited.contains(link) && !self.queued.contains(link))
            .collect();

        let estimate = self
            .progress
            .update(self.visited.len(), self.frontier.len(), fresh.len());

        let discovered = fresh.len() as u64;
        for link in fresh {
            self.enqueue(link, child_depth);
        }

        ProgressEvent {
            url,
            succeeded,
            completed: self.completed,
            visited: self.visited.len() as u64,
            frontier: self.frontier.len() as u64,
            discovered,
            estimate,
        }
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn is_queued(&self, url: &str) -> bool {
        self.queued.contains(url)
    }

    /// BFS depth of a queued or visited URL
    pub fn depth_of(&self, url: &str) -> Option<u32> {
        self.depths.get(url).copied()
    }

    /// Deepest layer dispatched so far
    pub fn max_depth(&self) -> u32 {
        self.visit_order
            .iter()
            .filter_map(|url| self.depth_of(url))
            .max()
            .unwrap_or(0)
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn results_count(&self) -> usize {
        self.results.len()
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn estimate(&self) -> u64 {
        self.progress.estimate()
    }

    /// URLs in the order workers claimed them
    pub fn visit_order(&self) -> &[String] {
        &self.visit_order
    }

    pub fn results(&self) -> &BTreeMap<String, PageData> {
        &self.results
    }

    /// Consumes the state, returning the result map and the claim order
    pub fn into_parts(self) -> (BTreeMap<String, PageData>, Vec<String>) {
        (self.results, self.visit_order)
    }
}

/// Cloneable handle to the shared `CrawlState`
///
/// Every read and write of crawl membership state goes through this handle.
#[derive(Debug, Clone)]
pub struct StateHandle {
    inner: Arc<Mutex<CrawlState>>,
}

impl StateHandle {
    pub fn new(state: CrawlState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Locks the state
    ///
    /// A panicking worker cannot leave the state half-updated (every mutation
    /// completes before the guard drops), so a poisoned lock is still usable.
    pub fn lock(&self) -> MutexGuard<'_, CrawlState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`CrawlState::claim`]
    pub fn claim(&self, url: &str) -> bool {
        self.lock().claim(url)
    }

    /// See [`CrawlState::next_batch`]
    pub fn next_batch(&self, max: usize) -> Vec<String> {
        self.lock().next_batch(max)
    }

    /// See [`CrawlState::fold`]
    pub fn fold(&self, outcome: PageOutcome) -> ProgressEvent {
        self.lock().fold(outcome)
    }

    /// Takes the state out of the handle
    ///
    /// Falls back to a snapshot when another clone of the handle is still
    /// alive (e.g. a worker task that was aborted but not yet dropped).
    pub fn into_inner(self) -> (BTreeMap<String, PageData>, Vec<String>) {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner)
                .into_parts(),
            Err(shared) => {
                let state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                (state.results.clone(), state.visit_order.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn page(title: &str) -> PageData {
        PageData {
            title: Some(title.to_string()),
            text: title.to_string(),
            meta_description: None,
        }
    }

    fn outcome(url: &str, data: Option<PageData>, links: &[&str]) -> PageOutcome {
        PageOutcome {
            url: url.to_string(),
            data,
            links: links.iter().map(|l| l.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_new_state_holds_seed() {
        let state = CrawlState::new("https://example.com/");
        assert_eq!(state.frontier_len(), 1);
        assert!(state.is_queued("https://example.com/"));
        assert_eq!(state.visited_count(), 0);
        assert_eq!(state.estimate(), 10);
    }

    #[test]
    fn test_next_batch_is_fifo_and_bounded() {
        let mut state = CrawlState::new("a");
        assert_eq!(state.next_batch(2), vec!["a".to_string()]);
        state.claim("a");
        state.fold(outcome("a", None, &["b", "c", "d"]));

        assert_eq!(state.next_batch(2), vec!["b".to_string(), "c".to_string()]);
        assert_eq!(state.next_batch(2), vec!["d".to_string()]);
        assert!(state.next_batch(2).is_empty());
    }

    #[test]
    fn test_next_batch_skips_visited() {
        let mut state = CrawlState::new("a");
        assert_eq!(state.next_batch(1), vec!["a".to_string()]);
        assert!(state.claim("a"));
        state.fold(outcome("a", None, &["b", "c"]));

        state.claim("b");
        assert_eq!(state.next_batch(5), vec!["c".to_string()]);
        assert_eq!(state.frontier_len(), 0);
    }

    #[test]
    fn test_batch_never_spans_layers() {
        let mut state = CrawlState::new("root");
        assert_eq!(state.next_batch(4), vec!["root".to_string()]);
        state.claim("root");
        state.fold(outcome("root", None, &["a", "b", "c"]));

        assert_eq!(state.next_batch(2), vec!["a".to_string(), "b".to_string()]);
        state.claim("a");
        state.claim("b");
        state.fold(outcome("a", None, &["a1"]));
        state.fold(outcome("b", None, &["b1"]));

        // c is depth 1, a1 and b1 are depth 2: c goes alone
        assert_eq!(state.next_batch(4), vec!["c".to_string()]);
        state.claim("c");
        state.fold(outcome("c", None, &["c1"]));

        assert_eq!(state.depth_of("c1"), Some(2));
        assert_eq!(
            state.next_batch(4),
            vec!["a1".to_string(), "b1".to_string(), "c1".to_string()]
        );
    }

    #[test]
    fn test_depth_tracking() {
        let mut state = CrawlState::new("root");
        state.next_batch(1);
        state.claim("root");
        state.fold(outcome("root", None, &["a"]));
        state.next_batch(1);
        state.claim("a");

        assert_eq!(state.depth_of("root"), Some(0));
        assert_eq!(state.depth_of("a"), Some(1));
        assert_eq!(state.depth_of("unknown"), None);
        assert_eq!(state.max_depth(), 1);
    }

    #[test]
    fn test_claim_is_exclusive() {
        let mut state = CrawlState::new("a");
        assert!(state.claim("a"));
        assert!(!state.claim("a"));
        assert_eq!(state.visit_order(), ["a".to_string()]);
    }

    #[test]
    fn test_fold_records_success_only() {
        let mut state = CrawlState::new("a");
        state.claim("a");
        state.claim("b");
        state.fold(outcome("a", Some(page("A")), &[]));
        state.fold(outcome("b", None, &[]));

        assert_eq!(state.results_count(), 1);
        assert!(state.results().contains_key("a"));
        assert_eq!(state.completed(), 2);
        assert_eq!(state.visited_count(), 2);
    }

    #[test]
    fn test_fold_filters_visited_and_queued_links() {
        let mut state = CrawlState::new("a");
        let batch = state.next_batch(1);
        assert_eq!(batch, vec!["a".to_string()]);
        state.claim("a");

        let event = state.fold(outcome("a", Some(page("A")), &["a", "b", "c"]));
        assert_eq!(event.discovered, 2);
        assert_eq!(state.frontier_len(), 2);

        // b and c are already queued, a is visited
        let event = state.fold(outcome("z", None, &["a", "b", "c", "d"]));
        assert_eq!(event.discovered, 1);
        assert_eq!(state.frontier_len(), 3);
    }

    #[test]
    fn test_fold_raises_estimate() {
        let mut state = CrawlState::new("p0");
        state.next_batch(1);
        state.claim("p0");

        let links: Vec<String> = (1..=20).map(|i| format!("p{}", i)).collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let event = state.fold(outcome("p0", Some(page("0")), &link_refs));

        // 1 visited + 0 queued + 20 new
        assert_eq!(event.estimate, 21);
        assert_eq!(state.estimate(), 21);
    }

    #[test]
    fn test_handle_shares_state() {
        let handle = StateHandle::new(CrawlState::new("a"));
        let worker = handle.clone();

        assert!(worker.claim("a"));
        assert!(!handle.claim("a"));
        drop(worker);

        let (results, order) = handle.into_inner();
        assert!(results.is_empty());
        assert_eq!(order, vec!["a".to_string()]);
    }

    #[test]
    fn test_concurrent_claims_resolve_to_one_visit() {
        let handle = StateHandle::new(CrawlState::new("seed"));
        let threads: Vec<_> = (0..16)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || handle.claim("https://example.com/same"))
            })
            .collect();

        let wins = threads
            .into_iter()
            .map(|t| t.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(handle.lock().visited_count(), 1);
    }
}
