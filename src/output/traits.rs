//! Sink traits and page record types
//!
//! This module defines the interface workers hand crawl results to, and the
//! data structures that flow through it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Data extracted from one successfully crawled page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    pub url: String,
    pub domain: String,

    /// Links between the seed and this page
    pub depth: u32,

    pub title: Option<String>,
    pub description: Option<String>,

    /// Headings in document order, as `"h2: Heading text"`
    pub headings: Vec<String>,

    /// Lowercased email addresses found in the page text
    pub emails: BTreeSet<String>,

    pub phone_numbers: BTreeSet<String>,

    /// Absolute links found on the page (all domains)
    pub links: Vec<String>,

    pub images: Vec<String>,
    pub has_contact_form: bool,
    pub word_count: usize,
    pub link_count: usize,
    pub image_count: usize,
    pub heading_count: usize,

    /// Length of the visible text in bytes
    pub content_length: usize,

    pub crawled_at: DateTime<Utc>,
}

impl PageRecord {
    /// Creates an empty record for `url`; the extractor fills in the rest
    pub fn new(url: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            domain: domain.into(),
            depth: 0,
            title: None,
            description: None,
            headings: Vec::new(),
            emails: BTreeSet::new(),
            phone_numbers: BTreeSet::new(),
            links: Vec::new(),
            images: Vec::new(),
            has_contact_form: false,
            word_count: 0,
            link_count: 0,
            image_count: 0,
            heading_count: 0,
            content_length: 0,
            crawled_at: Utc::now(),
        }
    }
}

/// A crawl target that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub url: String,
    pub reason: String,
    pub reported_at: DateTime<Utc>,
}

impl BrokenLink {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
            reported_at: Utc::now(),
        }
    }
}

/// Destination for crawl results
///
/// Sinks are shared by all workers, so every method takes `&self` and
/// implementations must be thread-safe. Errors are logged by the caller and
/// never stop the crawl.
pub trait Sink: Send + Sync {
    /// Records a successfully crawled page
    fn accept(&self, record: PageRecord) -> OutputResult<()>;

    /// Records a page that failed to fetch
    ///
    /// # Arguments
    ///
    /// * `url` - The URL that failed
    /// * `reason` - Human-readable failure description
    fn report_broken_link(&self, url: &str, reason: &str) -> OutputResult<()>;

    /// Keeps a copy of a crawled page's markup and visible text
    ///
    /// Called once per crawled page, before [`Sink::accept`]. Sinks that do
    /// not archive pages can ignore it.
    fn archive_page(&self, _url: &str, _html: &str, _text: &str) -> OutputResult<()> {
        Ok(())
    }

    /// Writes out anything buffered; called once after all workers stopped
    fn flush_all(&self) -> OutputResult<()>;
}
