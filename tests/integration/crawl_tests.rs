//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the HTTP fetcher.

use crate::support::fast_config;
use kumo::config::CrawlerConfig;
use kumo::crawler::{HtmlExtractor, HttpFetcher};
use kumo::output::{ExportSink, FanOutSink, MemorySink, Sink, SqliteSink};
use kumo::{Orchestrator, StopReason};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

fn orchestrator(config: CrawlerConfig, sink: Arc<dyn Sink>) -> Orchestrator {
    let fetcher = HttpFetcher::from_config(&config).expect("Failed to build HTTP client");
    Orchestrator::new(config, Arc::new(fetcher), Arc::new(HtmlExtractor::new()), sink)
}

#[tokio::test]
async fn test_full_crawl_with_exports() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body>
            <h1>Welcome</h1>
            <a href="/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="/missing">Missing</a>
            <a href="http://other.invalid/">Elsewhere</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<html><head><title>Contact</title></head><body>
            <p>Contact Sales@Example.com or call (555) 123-4567</p>
            <form><textarea name="message"></textarea></form>
            <a href="/">Home</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("<html><body><p>Second page</p></body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let out = TempDir::new().unwrap();
    let export: Arc<dyn Sink> = Arc::new(ExportSink::new(out.path().join("export")).unwrap());
    let sqlite: Arc<dyn Sink> =
        Arc::new(SqliteSink::new(&out.path().join("crawl.db"), "test-hash").unwrap());
    let sink = Arc::new(FanOutSink::new(vec![export, sqlite]));

    let report = orchestrator(fast_config(), sink)
        .run(&format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Quiescent);
    assert_eq!(report.stats.pages_crawled, 3);
    assert_eq!(report.stats.failed_pages, 1);
    assert_eq!(report.unique_urls, 4);
    assert!(report.stats.bytes_downloaded > 0);
    assert!(!report.flush_failed);

    let export_dir = out.path().join("export");
    let csv = fs::read_to_string(export_dir.join("data/crawl_results.csv")).unwrap();
    assert_eq!(csv.lines().count(), 4);

    let contacts = fs::read_to_string(export_dir.join("data/contact_info.txt")).unwrap();
    assert!(contacts.contains("sales@example.com"));
    assert!(contacts.contains("(555) 123-4567"));

    let broken = fs::read_to_string(export_dir.join("reports/broken_links.txt")).unwrap();
    assert!(broken.contains("/missing - HTTP 404"));

    assert_eq!(fs::read_dir(export_dir.join("pages")).unwrap().count(), 3);
    let page1 = fs::read_to_string(export_dir.join("content/127.0.0.1_page1.txt")).unwrap();
    assert!(page1.contains("Sales@Example.com"));

    let summary = fs::read_to_string(export_dir.join("reports/crawl_summary.md")).unwrap();
    assert!(summary.contains("- **Pages Crawled**: 3"));
    assert!(summary.contains("- **Pages With Contact Forms**: 1"));

    let conn = rusqlite::Connection::open(out.path().join("crawl.db")).unwrap();
    let pages: i64 = conn
        .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))
        .unwrap();
    let status: String = conn
        .query_row("SELECT status FROM runs", [], |row| row.get(0))
        .unwrap();
    assert_eq!(pages, 3);
    assert_eq!(status, "completed");
}

#[tokio::test]
async fn test_non_html_is_a_failed_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/report.pdf">Report</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let report = orchestrator(fast_config(), sink.clone())
        .run(&mock_server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.pages_crawled, 1);
    assert_eq!(report.stats.failed_pages, 1);
    let broken = sink.broken_links();
    assert_eq!(broken.len(), 1);
    assert!(broken[0].reason.contains("Expected HTML, got application/pdf"));
}

#[tokio::test]
async fn test_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "KumoTest/1.0"))
        .respond_with(html("<p>hello</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = CrawlerConfig {
        user_agent: "KumoTest/1.0".to_string(),
        ..fast_config()
    };
    let sink = Arc::new(MemorySink::new());
    let report = orchestrator(config, sink).run(&mock_server.uri()).await.unwrap();

    assert_eq!(report.stats.pages_crawled, 1);
    assert_eq!(report.stats.failed_pages, 0);
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/docs/", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html(r#"<a href="intro">Intro</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .respond_with(html("<p>Intro</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let report = orchestrator(fast_config(), sink.clone())
        .run(&mock_server.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.failed_pages, 0);
    assert!(sink
        .records()
        .iter()
        .any(|r| r.url.ends_with("/docs/intro")));
}

#[tokio::test]
async fn test_request_timeout_counts_as_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>slow</p>").set_delay(std::time::Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = CrawlerConfig {
        request_timeout_ms: 200,
        ..fast_config()
    };
    let sink = Arc::new(MemorySink::new());
    let report = orchestrator(config, sink.clone()).run(&mock_server.uri()).await.unwrap();

    assert_eq!(report.stats.pages_crawled, 0);
    assert_eq!(report.stats.failed_pages, 1);
    assert!(sink.broken_links()[0].reason.contains("timed out"));
}
