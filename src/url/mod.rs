//! URL handling module for Kumo
//!
//! This module provides URL normalization, domain extraction and the
//! same-domain scope check used to decide which discovered links are followed.

mod normalize;
mod scope;

pub use normalize::normalize_url;
pub use scope::{is_same_or_subdomain, DomainScope};

use url::Url;

/// Extracts the lowercase host from a URL
///
/// Returns `None` for URLs without a host (e.g. `mailto:` or `data:` URLs).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use kumo::url::extract_domain;
///
/// let url = Url::parse("https://Blog.EXAMPLE.com:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_ascii_lowercase())
}
