//! In-process fetchers for unit tests

use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::parser::{parse_html, Document};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Serves fixed pages by URL; anything else is a 404
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

/// Builds a fetcher from `(url, html)` pairs
pub fn site(pages: &[(&str, &str)]) -> StaticFetcher {
    StaticFetcher {
        pages: pages
            .iter()
            .map(|(url, html)| (url.to_string(), html.to_string()))
            .collect(),
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(
        &self,
        url: &Url,
        _user_agent: &str,
        _timeout: Duration,
    ) -> Result<Document, FetchError> {
        match self.pages.get(url.as_str()) {
            Some(html) => Ok(parse_html(url.clone(), url.clone(), 200, html.clone())),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}

/// Never answers
pub struct HangingFetcher;

#[async_trait]
impl Fetcher for HangingFetcher {
    async fn fetch(
        &self,
        _url: &Url,
        _user_agent: &str,
        _timeout: Duration,
    ) -> Result<Document, FetchError> {
        std::future::pending().await
    }
}
