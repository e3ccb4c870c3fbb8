//! Shared fixtures for integration tests

use async_trait::async_trait;
use kumo::config::CrawlerConfig;
use kumo::crawler::{parse_html, Document, FetchError, Fetcher};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Crawler settings with every wait shortened for tests
pub fn fast_config() -> CrawlerConfig {
    CrawlerConfig {
        max_threads: 4,
        max_pages: 100,
        max_depth: 5,
        delay_ms: 0,
        poll_timeout_ms: 20,
        monitor_interval_ms: 20,
        quiescence_grace_ms: 100,
        shutdown_grace_ms: 2000,
        ..CrawlerConfig::default()
    }
}

/// Serves pages from a map and records every URL it was asked for
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// A chain of `len` pages, each linking to the next
    pub fn chain(len: usize) -> Self {
        let pages: Vec<(String, String)> = (0..len)
            .map(|i| {
                (
                    format!("https://a.test/p{}", i),
                    format!(r#"<a href="/p{}">next</a>"#, i + 1),
                )
            })
            .collect();
        Self {
            pages: pages.into_iter().collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// A seed page linking to `width` leaf pages
    pub fn fan(width: usize) -> Self {
        let links: String = (0..width)
            .map(|i| format!(r#"<a href="/leaf{}">{}</a>"#, i, i))
            .collect();
        let mut pages: HashMap<String, String> = (0..width)
            .map(|i| (format!("https://a.test/leaf{}", i), "<p>leaf</p>".to_string()))
            .collect();
        pages.insert("https://a.test/".to_string(), links);
        Self {
            pages,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
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
        self.fetched.lock().unwrap().push(url.to_string());
        tokio::task::yield_now().await;
        match self.pages.get(url.as_str()) {
            Some(html) => Ok(parse_html(url.clone(), url.clone(), 200, html.clone())),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}

/// Never completes a fetch
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
