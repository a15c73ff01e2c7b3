//! Page extractor
//!
//! This module turns a fetched HTML body into:
//! - Page data (title, visible text, meta description)
//! - The set of outbound links that stay on the crawl's root domain

use crate::state::PageData;
use crate::url::{is_same_domain, resolve_link};
use crate::SweepError;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Elements whose text content is never rendered
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Title, text and meta description
    pub data: PageData,

    /// Absolute same-domain links, deduplicated
    pub links: BTreeSet<String>,
}

/// Extracts page data and same-domain links
#[derive(Debug, Clone)]
pub struct Extractor {
    root_domain: String,
}

impl Extractor {
    /// Creates an extractor keeping links on `root_domain` (`host[:port]`)
    pub fn new(root_domain: impl Into<String>) -> Self {
        Self {
            root_domain: root_domain.into(),
        }
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// Parses a page body and extracts its data and links
    ///
    /// # Link Extraction Rules
    ///
    /// Every `<a href>` is resolved against `source_url` and kept only if its
    /// host (and explicit port) equals the root domain. Scheme and path are
    /// ignored in that comparison. Links are returned as a set.
    ///
    /// # Arguments
    ///
    /// * `body` - The HTML content to parse
    /// * `source_url` - The URL the body was fetched from
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractedPage)` - Successfully extracted page
    /// * `Err(SweepError::Extraction)` - Empty body or unusable source URL
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_sweep::crawler::Extractor;
    ///
    /// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
    /// let page = Extractor::new("example.com").extract(html, "https://example.com/").unwrap();
    /// assert_eq!(page.data.title, Some("Test".to_string()));
    /// assert!(page.links.contains("https://example.com/page"));
    /// ```
    pub fn extract(&self, body: &str, source_url: &str) -> Result<ExtractedPage, SweepError> {
        if body.trim().is_empty() {
            return Err(SweepError::Extraction {
                url: source_url.to_string(),
                message: "empty response body".to_string(),
            });
        }

        let base_url = Url::parse(source_url).map_err(|e| SweepError::Extraction {
            url: source_url.to_string(),
            message: format!("invalid source URL: {}", e),
        })?;

        let document = Html::parse_document(body);

        let data = PageData {
            title: extract_title(&document),
            text: extract_text(&document),
            meta_description: extract_meta_description(&document),
        };
        let links = self.extract_links(&document, &base_url);

        Ok(ExtractedPage { data, links })
    }

    /// Extracts all same-domain links from the HTML document
    fn extract_links(&self, document: &Html, base_url: &Url) -> BTreeSet<String> {
        let mut links = BTreeSet::new();

        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in document.select(&a_selector) {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };

                match resolve_link(href, base_url) {
                    Some(absolute_url) if is_same_domain(&absolute_url, &self.root_domain) => {
                        links.insert(absolute_url.to_string());
                    }
                    Some(absolute_url) => {
                        tracing::trace!("Skipping off-domain link {}", absolute_url);
                    }
                    None => {}
                }
            }
        }

        links
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts the visible text, one space between text fragments
fn extract_text(document: &Html) -> String {
    let mut fragments = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| INVISIBLE_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let fragment = text.trim();
        if !fragment.is_empty() {
            fragments.push(fragment);
        }
    }

    fragments.join(" ")
}

/// Extracts `<meta name="description" content="...">`
fn extract_meta_description(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="description"]"#).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(str::to_string)
}
