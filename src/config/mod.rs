//! Configuration module for Sumi-Sweep
//!
//! This module handles loading, parsing, layering and validating the crawl
//! configuration. Values come from built-in defaults, an optional TOML file and
//! command-line overrides, in that order; validation runs once on the result.
//!
//! # Example
//!
//! ```no_run
//! use sumi_sweep::config::{read_config, validate};
//! use std::path::Path;
//!
//! let config = read_config(Path::new("sweep.toml")).unwrap();
//! validate(&config).unwrap();
//! println!("Crawling with {} workers", config.crawler.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, DEFAULT_LOG_DIR};

// Re-export parser and validation functions
pub use parser::{config_fingerprint, read_config};
pub use validation::{validate, validate_crawler_config};
