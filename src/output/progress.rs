//! Live progress display
//!
//! The reporter consumes the scheduler's progress events and keeps an
//! `indicatif` bar in sync: its length is the current estimate and its
//! position the number of completed pages.

use crate::state::{ProgressEvent, INITIAL_ESTIMATE};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;

/// Renders scheduler progress events
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Creates a reporter; a hidden one draws nothing but still tracks state
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new(INITIAL_ESTIMATE);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} Scraping [{elapsed_precise}] {wide_bar} {pos}/{len} pages ({percent}%) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::with_draw_target(Some(INITIAL_ESTIMATE), ProgressDrawTarget::hidden())
        };

        Self { bar }
    }

    /// Applies one event to the bar
    pub fn observe(&self, event: &ProgressEvent) {
        self.bar.set_length(event.estimate);
        self.bar.set_position(event.completed);
        self.bar.set_message(format!("queue: {}", event.frontier));

        tracing::debug!(
            "Progress: {:.1}% ({}/{}) - Queue: {}",
            event.percent(),
            event.completed,
            event.estimate,
            event.frontier
        );
    }

    /// Fills the bar and leaves it on screen
    pub fn finish(&self) {
        if let Some(length) = self.bar.length() {
            self.bar.set_position(length);
        }
        self.bar.finish();
    }

    /// Current (estimate, completed) shown by the bar
    pub fn snapshot(&self) -> (u64, u64) {
        (self.bar.length().unwrap_or(0), self.bar.position())
    }

    /// Consumes events until the sender side is dropped, then finishes
    ///
    /// Returns the number of events observed.
    pub async fn run(self, mut events: UnboundedReceiver<ProgressEvent>) -> u64 {
        let mut observed = 0;
        while let Some(event) = events.recv().await {
            self.observe(&event);
            observed += 1;
        }
        self.finish();
        observed
    }
}
