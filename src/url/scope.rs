use url::Url;

/// Checks if a host is the base domain itself or one of its subdomains
///
/// Both arguments are expected to be lowercase. Matching is on label
/// boundaries, so `notexample.com` is not a subdomain of `example.com`.
///
/// # Examples
///
/// ```
/// use kumo::url::is_same_or_subdomain;
///
/// assert!(is_same_or_subdomain("example.com", "example.com"));
/// assert!(is_same_or_subdomain("example.com", "api.v2.example.com"));
/// assert!(!is_same_or_subdomain("example.com", "myexample.com"));
/// assert!(!is_same_or_subdomain("example.com", "example.com.org"));
/// ```
pub fn is_same_or_subdomain(base: &str, candidate: &str) -> bool {
    if base.is_empty() {
        return false;
    }
    candidate == base
        || candidate
            .strip_suffix(base)
            .is_some_and(|prefix| prefix.ends_with('.') && prefix.len() > 1)
}

/// The set of URLs a crawl is allowed to visit
///
/// A crawl only follows http(s) links whose host is the base domain (the
/// seed's host) or a subdomain of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScope {
    base: String,
}

impl DomainScope {
    /// Creates a scope rooted at the given domain
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().to_ascii_lowercase(),
        }
    }

    /// Creates a scope rooted at the host of the given URL
    ///
    /// Returns `None` if the URL has no host.
    pub fn from_url(url: &Url) -> Option<Self> {
        url.host_str().map(Self::new)
    }

    /// The base domain of this scope
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns true if the URL may be crawled within this scope
    pub fn contains(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        match url.host_str() {
            Some(host) => is_same_or_subdomain(&self.base, &host.to_ascii_lowercase()),
            None => false,
        }
    }
}
