//! Data carried by a processed page
use serde::Serialize;
use std::collections::BTreeSet;

/// Structured data extracted from one successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageData {
    /// Text of the `<title>` element, if any
    pub title: Option<String>,

    /// Visible text of the page, whitespace-separated
    pub text: String,

    /// Content of `<meta name="description">`, if any
    pub meta_description: Option<String>,
}

/// Result of one unit of work (fetch + extract for a single URL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    /// The URL that was processed
    pub url: String,

    /// Extracted data; absent when fetching or extraction failed
    pub data: Option<PageData>,

    /// Same-domain links discovered on the page
    pub links: BTreeSet<String>,
}

impl PageOutcome {
    /// Outcome of a URL that produced nothing (fetch failure, extraction error)
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            data: None,
            links: BTreeSet::new(),
        }
    }

    /// Returns true if the page yielded data
    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}
