//! Output module for crawl results
//!
//! This module handles:
//! - The JSON report (`{ data, stats }`) and writing it out
//! - Crawl statistics and their terminal summary
//! - The live progress bar

mod progress;
pub mod stats;

pub use progress::ProgressReporter;
pub use stats::{print_statistics, CrawlRun, CrawlStats};

use crate::state::PageData;
use crate::SweepError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// The final artifact of a crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Extracted data per scraped URL
    pub data: BTreeMap<String, PageData>,

    /// Summary statistics
    pub stats: CrawlStats,
}

impl CrawlReport {
    /// Renders the report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SweepError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Writes the report as JSON to `path`, or to stdout when no path is given
///
/// Missing parent directories are created.
///
/// # Returns
///
/// * `Ok(())` - Report written
/// * `Err(SweepError)` - Serialization or I/O failed
pub fn write_report(report: &CrawlReport, path: Option<&Path>) -> Result<(), SweepError> {
    let json = report.to_json()?;

    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json)?;
        }
    }

    Ok(())
}
