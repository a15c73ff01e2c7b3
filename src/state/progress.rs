//! Progress estimation
//!
//! The total number of pages is unknown until the crawl ends, so the estimate is
//! an upper bound that is only ever raised as new links are discovered.

/// Estimate shown before the first page completes
pub const INITIAL_ESTIMATE: u64 = 10;

/// Maintains a never-decreasing estimate of the total crawl size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEstimator {
    estimate: u64,
}

impl Default for ProgressEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressEstimator {
    /// Creates an estimator starting at `INITIAL_ESTIMATE`
    pub fn new() -> Self {
        Self::starting_at(INITIAL_ESTIMATE)
    }

    /// Creates an estimator with a custom starting estimate
    pub fn starting_at(estimate: u64) -> Self {
        Self { estimate }
    }

    /// Folds in a new observation and returns the updated estimate
    ///
    /// The new estimate is `max(previous, visited + frontier + newly_discovered)`.
    pub fn update(&mut self, visited: usize, frontier: usize, newly_discovered: usize) -> u64 {
        let observed = (visited as u64)
            .saturating_add(frontier as u64)
            .saturating_add(newly_discovered as u64);
        self.estimate = self.estimate.max(observed);
        self.estimate
    }

    /// Returns the current estimate
    pub fn estimate(&self) -> u64 {
        self.estimate
    }
}

/// Emitted by the scheduler each time a unit of work has been folded in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// URL whose outcome was just folded in
    pub url: String,

    /// Whether that URL produced data
    pub succeeded: bool,

    /// Units of work folded in so far
    pub completed: u64,

    /// URLs dispatched so far
    pub visited: u64,

    /// URLs waiting in the frontier
    pub frontier: u64,

    /// Links newly enqueued from this page
    pub discovered: u64,

    /// Current progress estimate
    pub estimate: u64,
}

impl ProgressEvent {
    /// Completion percentage against the current estimate
    pub fn percent(&self) -> f64 {
        if self.estimate == 0 {
            return 0.0;
        }
        (self.completed as f64 / self.estimate as f64) * 100.0
    }
}
