//! State module for tracking crawl progress
//!
//! This module owns every piece of state that workers share during a crawl.
//!
//! # Components
//!
//! - `CrawlState`: frontier queue, visited set, result map and progress estimate
//! - `StateHandle`: the single synchronization point workers and the scheduler use
//! - `ProgressEstimator`: never-decreasing estimate of total crawl size
//! - `PageData` / `PageOutcome`: what one unit of work produces

mod crawl_state;
mod page_data;
mod progress;

// Re-export main types
pub use crawl_state::{CrawlState, StateHandle};
pub use page_data::{PageData, PageOutcome};
pub use progress::{ProgressEstimator, ProgressEvent, INITIAL_ESTIMATE};
