//! URL handling module for Sumi-Sweep
//!
//! This module provides domain extraction, link resolution and the
//! same-domain filter. URLs are deliberately not canonicalized: once resolved
//! against their base, two URLs are the same page only if their strings are
//! equal (`/a` and `/a/` are distinct, as are differently ordered queries).

mod domain;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::extract_domain;

/// Parses a seed URL and returns it with its crawl domain
///
/// # Arguments
///
/// * `seed` - The seed URL string
///
/// # Returns
///
/// * `Ok((Url, String))` - The parsed seed and its `host[:port]` domain
/// * `Err(UrlError)` - The seed is malformed, not HTTP(S), or has no host
pub fn parse_seed(seed: &str) -> UrlResult<(Url, String)> {
    let url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let domain = extract_domain(&url).ok_or(UrlError::MissingDomain)?;
    Ok((url, domain))
}

/// Returns true if the URL's domain is exactly the crawl's root domain
///
/// Scheme and path play no part in the comparison; subdomains do not match.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sweep::url::is_same_domain;
///
/// let inside = Url::parse("http://root.example.com/y").unwrap();
/// let outside = Url::parse("http://other.example.com/x").unwrap();
/// assert!(is_same_domain(&inside, "root.example.com"));
/// assert!(!is_same_domain(&outside, "root.example.com"));
/// ```
pub fn is_same_domain(url: &Url, root_domain: &str) -> bool {
    extract_domain(url).is_some_and(|domain| domain == root_domain)
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only (same page) anchors
/// - javascript:, mailto:, tel: and data: links
/// - hrefs that cannot be resolved against the base
/// - non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}
