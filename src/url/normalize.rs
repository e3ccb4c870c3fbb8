use crate::UrlError;
use url::Url;

/// Query parameters that only carry tracking data
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes a URL into the canonical form used for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme and a host
/// 3. Lowercase the host
/// 4. Normalize path:
///    - Remove dot segments (. and ..) and duplicate slashes
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 5. Remove fragment (everything after #)
/// 6. Remove tracking query parameters (`utm_*`, `fbclid`, `gclid`, `mc_eid`)
/// 7. Sort remaining query parameters by key
/// 8. Remove empty query string (trailing ?)
///
/// Scheme and any `www.` prefix are kept: they can change what the server returns.
///
/// # Examples
///
/// ```
/// use kumo::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.COM/a/../page/?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page?a=1&b=2");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
        _ => return Err(UrlError::MissingDomain),
    };
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let path = normalize_path(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Resolves dot segments and drops empty segments and the trailing slash
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Drops tracking parameters and orders the rest by key (stable for equal keys)
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
