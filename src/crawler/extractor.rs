//! Page data extraction
//!
//! Turns a fetched [`Document`] into a [`PageRecord`]: headings, contact details
//! (emails, phone numbers, contact forms) and content counts.

use crate::crawler::parser::Document;
use crate::output::PageRecord;
use crate::url::extract_domain;
use chrono::Utc;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

/// North American numbers, with optional +1 prefix and separators
const PHONE_PATTERN: &str = concat!(
    r"(?:\+?1[-. ]?)?\(?([0-9]{3})\)?[-. ]?([0-9]{3})[-. ]?([0-9]{4})\b",
    r"|\b[0-9]{3}[-.]?[0-9]{3}[-.]?[0-9]{4}\b",
);

/// Builds a page record from a document
///
/// Extraction is pure: the same document always yields the same record
/// (apart from the crawl timestamp). Depth is filled in by the caller.
pub trait Extractor: Send + Sync {
    fn extract(&self, document: &Document) -> PageRecord;
}

/// Extractor for HTML pages
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, document: &Document) -> PageRecord {
        let html = Html::parse_document(&document.html);
        let headings = extract_headings(&html);

        PageRecord {
            url: document.url.to_string(),
            domain: extract_domain(&document.url).unwrap_or_default(),
            depth: 0,
            title: document.title.clone(),
            description: document.description.clone(),
            heading_count: headings.len(),
            headings,
            emails: extract_emails(&document.text),
            phone_numbers: extract_phones(&document.text),
            link_count: document.links.len(),
            links: document.links.clone(),
            image_count: document.images.len(),
            images: document.images.clone(),
            has_contact_form: has_contact_form(&html, &document.text),
            word_count: count_words(&document.text),
            content_length: document.text.len(),
            crawled_at: Utc::now(),
        }
    }
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

fn phone_regex() -> Option<&'static Regex> {
    static PHONE: OnceLock<Option<Regex>> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(PHONE_PATTERN).ok()).as_ref()
}

/// Collects `h1`-`h6` text as `"h<n>: text"`, skipping empty headings
fn extract_headings(html: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };

    html.select(&selector)
        .filter_map(|element| {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then(|| format!("{}: {}", element.value().name(), text))
        })
        .collect()
}

pub(crate) fn extract_emails(text: &str) -> BTreeSet<String> {
    email_regex()
        .map(|re| {
            re.find_iter(text)
                .map(|m| m.as_str().to_lowercase())
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn extract_phones(text: &str) -> BTreeSet<String> {
    phone_regex()
        .map(|re| {
            re.find_iter(text)
                .map(|m| m.as_str().trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// A page has a contact form if it has a form and either mentions contact or
/// email, or offers an email field or free-text area
fn has_contact_form(html: &Html, text: &str) -> bool {
    let has = |selector: &str| {
        Selector::parse(selector)
            .map(|s| html.select(&s).next().is_some())
            .unwrap_or(false)
    };

    if !has("form") {
        return false;
    }

    let text = text.to_lowercase();
    text.contains("contact")
        || text.contains("email")
        || has("input[type=email]")
        || has("textarea")
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
