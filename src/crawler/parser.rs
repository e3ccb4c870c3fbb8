//! HTML parser for building fetched documents
//!
//! This module turns a fetched HTML body into a [`Document`]:
//! - Page title and meta description
//! - Visible text (script, style and noscript content excluded)
//! - Links to follow (from `<a href>` tags)
//! - Image sources (from `<img src>` tags)

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// A fetched and parsed HTML page
#[derive(Debug, Clone)]
pub struct Document {
    /// The URL that was requested
    pub url: Url,

    /// The URL the response came from after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status: u16,

    /// Raw response body
    pub html: String,

    /// Visible text with whitespace collapsed to single spaces
    pub text: String,

    /// Absolute http(s) links, in document order
    pub links: Vec<String>,

    /// Absolute image sources, in document order
    pub images: Vec<String>,

    /// The page title (from `<title>`)
    pub title: Option<String>,

    /// The meta description, falling back to `og:description`
    pub description: Option<String>,
}

/// Elements whose text is never shown to a reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Parses an HTML body into a document
///
/// Relative links and image sources are resolved against `final_url`, so a
/// redirected page resolves links the way a browser would.
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` tags that resolve to http(s) URLs
/// (`rel="nofollow"` links are followed).
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
///
/// # Example
///
/// ```
/// use kumo::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let url = Url::parse("https://example.com/").unwrap();
/// let doc = parse_html(url.clone(), url, 200, html.to_string());
/// assert_eq!(doc.title.as_deref(), Some("Test"));
/// assert_eq!(doc.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(url: Url, final_url: Url, status: u16, html: String) -> Document {
    let parsed = Html::parse_document(&html);

    let title = extract_title(&parsed);
    let description = extract_description(&parsed);
    let text = extract_text(&parsed);
    let links = extract_attribute_urls(&parsed, "a[href]", "href", &final_url);
    let images = extract_attribute_urls(&parsed, "img[src]", "src", &final_url);

    Document {
        url,
        final_url,
        status,
        html,
        text,
        links,
        images,
        title,
        description,
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Extracts `<meta name="description">`, falling back to `og:description`
fn extract_description(document: &Html) -> Option<String> {
    ["meta[name='description']", "meta[property='og:description']"]
        .iter()
        .filter_map(|selector| Selector::parse(selector).ok())
        .find_map(|selector| {
            document
                .select(&selector)
                .filter_map(|element| element.value().attr("content"))
                .map(collapse_whitespace)
                .find(|content| !content.is_empty())
        })
}

/// Collects the visible body text, skipping hidden elements
fn extract_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    collect_text(root, &mut text);
    collapse_whitespace(&text)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

fn extract_attribute_urls(
    document: &Html,
    selector: &str,
    attr: &str,
    base_url: &Url,
) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only references
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
