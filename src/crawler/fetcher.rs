//! HTTP fetcher implementation
//!
//! This module defines the [`Fetcher`] seam workers call to retrieve pages,
//! and [`HttpFetcher`], its reqwest-backed implementation:
//! - Building a shared HTTP client with connect timeout and redirect limit
//! - Per-request user agent and timeout
//! - Status and Content-Type checks
//! - Error classification

use crate::config::CrawlerConfig;
use crate::crawler::parser::{parse_html, Document};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Why a page could not be fetched
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("Expected HTML, got {content_type}")]
    ContentMismatch { content_type: String },

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Retrieves and parses one page
///
/// Implementations must be callable from any worker concurrently.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, identifying as `user_agent` and giving up after `timeout`
    async fn fetch(
        &self,
        url: &Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Document, FetchError>;
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with a client configured from the crawler settings
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Document, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_html(&content_type) {
            return Err(FetchError::ContentMismatch { content_type });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(timeout)
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        tracing::trace!("Fetched {} ({} bytes)", final_url, body.len());
        Ok(parse_html(url.clone(), final_url, status.as_u16(), body))
    }
}

/// Accepts HTML, XHTML, and responses that do not declare a type
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}

fn classify_error(error: reqwest::Error, timeout: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(timeout)
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Request(error.to_string())
    }
}
