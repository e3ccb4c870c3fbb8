//! Termination, limit, and scope properties of whole crawls
//!
//! These tests run the orchestrator against in-memory fetchers so they can
//! check exact page counts without a network.

use crate::support::{fast_config, HangingFetcher, StaticFetcher};
use kumo::config::{CrawlerConfig, PageCapMode, QuiescenceMode};
use kumo::crawler::HtmlExtractor;
use kumo::output::MemorySink;
use kumo::{KumoError, Orchestrator, StopReason};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn orchestrator(
    config: CrawlerConfig,
    fetcher: Arc<StaticFetcher>,
    sink: Arc<MemorySink>,
) -> Orchestrator {
    Orchestrator::new(config, fetcher, Arc::new(HtmlExtractor::new()), sink)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crawl_stays_in_domain() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        (
            "https://a.test/",
            r#"<a href="/p1">1</a><a href="/p2">2</a><a href="https://b.test/x">other</a>"#,
        ),
        ("https://a.test/p1", r#"<a href="/p2">2</a><a href="/">home</a>"#),
        ("https://a.test/p2", "<p>end</p>"),
        ("https://b.test/x", "<p>never</p>"),
    ]));
    let sink = Arc::new(MemorySink::new());

    let config = CrawlerConfig {
        max_depth: 1,
        max_pages: 10,
        ..fast_config()
    };

    let report = orchestrator(config, fetcher.clone(), sink.clone())
        .run("https://a.test/")
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Quiescent);
    assert_eq!(report.stats.pages_crawled, 3);
    assert_eq!(report.stats.failed_pages, 0);
    assert_eq!(report.unique_urls, 3);
    assert!(!fetcher.fetched().iter().any(|url| url.contains("b.test")));

    let depths: Vec<(String, u32)> = sink
        .records()
        .into_iter()
        .map(|r| (r.url, r.depth))
        .collect();
    assert!(depths.contains(&("https://a.test/".to_string(), 0)));
    assert!(depths.contains(&("https://a.test/p2".to_string(), 1)));
    assert_eq!(sink.flush_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_subdomains_are_in_scope() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        (
            "https://a.test/",
            r#"<a href="https://blog.a.test/">blog</a><a href="https://nota.test/">x</a>"#,
        ),
        ("https://blog.a.test/", "<p>blog</p>"),
    ]));
    let sink = Arc::new(MemorySink::new());

    let report = orchestrator(fast_config(), fetcher.clone(), sink)
        .run("https://a.test/")
        .await
        .unwrap();

    assert_eq!(report.stats.pages_crawled, 2);
    assert!(!fetcher.fetched().contains(&"https://nota.test/".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_url_fetched_once() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        ("https://a.test/", r#"<a href="/a">a</a><a href="/b">b</a><a href="/a#top">a again</a>"#),
        (
            "https://a.test/a",
            r#"<a href="/b">b</a><a href="/">home</a><a href="/a?utm_source=x">self</a>"#,
        ),
        ("https://a.test/b", r#"<a href="/a">a</a><a href="/b/">b slash</a>"#),
    ]));
    let sink = Arc::new(MemorySink::new());

    let report = orchestrator(fast_config(), fetcher.clone(), sink)
        .run("https://a.test/")
        .await
        .unwrap();

    let fetched = fetcher.fetched();
    let unique: HashSet<&String> = fetched.iter().collect();
    assert_eq!(fetched.len(), unique.len(), "{:?}", fetched);
    assert_eq!(report.stats.pages_crawled, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_depth_limit() {
    let fetcher = Arc::new(StaticFetcher::chain(10));
    let sink = Arc::new(MemorySink::new());
    let config = CrawlerConfig {
        max_depth: 2,
        ..fast_config()
    };

    let report = orchestrator(config, fetcher.clone(), sink.clone())
        .run("https://a.test/p0")
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Quiescent);
    assert_eq!(report.stats.pages_crawled, 3);
    assert!(sink.records().iter().all(|r| r.depth <= 2));
    assert!(!fetcher.fetched().contains(&"https://a.test/p3".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_best_effort_cap_is_never_exceeded() {
    let fetcher = Arc::new(StaticFetcher::fan(50));
    let sink = Arc::new(MemorySink::new());
    let config = CrawlerConfig {
        max_pages: 5,
        max_threads: 8,
        ..fast_config()
    };

    let report = tokio::time::timeout(
        Duration::from_secs(10),
        orchestrator(config, fetcher.clone(), sink.clone()).run("https://a.test/"),
    )
    .await
    .unwrap()
    .unwrap();

    // Admission counts crawled pages against the cap too, so fewer may be crawled
    assert!(report.stats.pages_crawled >= 1);
    assert!(report.stats.pages_crawled <= 5, "{:?}", report);
    assert!(report.stats.pages_queued <= 5);
    assert!(fetcher.fetched().len() <= 5);
    assert!(sink.records().len() <= 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_exact_page_cap_reaches_page_limit() {
    let fetcher = Arc::new(StaticFetcher::fan(50));
    let sink = Arc::new(MemorySink::new());
    let config = CrawlerConfig {
        max_pages: 5,
        max_threads: 8,
        page_cap: PageCapMode::Exact,
        ..fast_config()
    };

    let report = orchestrator(config, fetcher.clone(), sink.clone())
        .run("https://a.test/")
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::PageLimit);
    assert_eq!(report.unique_urls, 5);
    assert_eq!(report.stats.pages_queued, 5);
    assert_eq!(report.stats.pages_crawled, 5);
    assert_eq!(fetcher.fetched().len(), 5);
    assert_eq!(sink.records().len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_seed_without_links_terminates() {
    let fetcher = Arc::new(StaticFetcher::new(&[("https://a.test/", "<p>nothing here</p>")]));
    let sink = Arc::new(MemorySink::new());

    let report = tokio::time::timeout(
        Duration::from_secs(10),
        orchestrator(fast_config(), fetcher, sink).run("https://a.test/"),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(report.stop_reason, StopReason::Quiescent);
    assert_eq!(report.stats.pages_crawled, 1);
    assert_eq!(report.stats.pages_queued, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_pages_are_reported() {
    let fetcher = Arc::new(StaticFetcher::new(&[(
        "https://a.test/",
        r#"<a href="/gone">gone</a><a href="/also-gone">also</a>"#,
    )]));
    let sink = Arc::new(MemorySink::new());

    let report = orchestrator(fast_config(), fetcher, sink.clone())
        .run("https://a.test/")
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Quiescent);
    assert_eq!(report.stats.pages_crawled, 1);
    assert_eq!(report.stats.failed_pages, 2);

    let broken: HashSet<String> = sink.broken_links().into_iter().map(|b| b.url).collect();
    assert!(broken.contains("https://a.test/gone"));
    assert!(broken.contains("https://a.test/also-gone"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_grace_period_quiescence() {
    let fetcher = Arc::new(StaticFetcher::fan(3));
    let sink = Arc::new(MemorySink::new());
    let config = CrawlerConfig {
        quiescence: QuiescenceMode::GracePeriod,
        ..fast_config()
    };

    let report = orchestrator(config, fetcher, sink)
        .run("https://a.test/")
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Quiescent);
    assert_eq!(report.stats.pages_crawled, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stop_handle_aborts_hung_fetches() {
    let sink = Arc::new(MemorySink::new());
    let config = CrawlerConfig {
        shutdown_grace_ms: 100,
        ..fast_config()
    };
    let orchestrator = Orchestrator::new(
        config,
        Arc::new(HangingFetcher),
        Arc::new(HtmlExtractor::new()),
        sink.clone(),
    );

    let stop = orchestrator.stop_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        stop.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(10), orchestrator.run("https://a.test/"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Requested);
    assert!(report.forced_cancellation);
    assert_eq!(report.stats.pages_crawled, 0);
    assert_eq!(sink.flush_count(), 1);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let sink = Arc::new(MemorySink::new());
    let fetcher = Arc::new(StaticFetcher::default());
    let orchestrator = orchestrator(fast_config(), fetcher, sink.clone());

    for seed in ["", "example.com", "mailto:me@a.test", "https://"] {
        let err = orchestrator.run(seed).await.unwrap_err();
        assert!(matches!(err, KumoError::InvalidSeed { .. }), "{}: {}", seed, err);
    }
    assert_eq!(sink.flush_count(), 0);
}
