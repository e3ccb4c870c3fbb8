//! Per-run crawl counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic counters for one crawl run
///
/// Each counter is updated atomically on its own; there is no cross-counter
/// consistency, so a snapshot taken mid-run may mix values from slightly
/// different moments.
#[derive(Debug)]
pub struct Stats {
    pages_crawled: AtomicU64,
    pages_queued: AtomicU64,
    failed_pages: AtomicU64,
    bytes_downloaded: AtomicU64,
    started: Instant,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            pages_crawled: AtomicU64::new(0),
            pages_queued: AtomicU64::new(0),
            failed_pages: AtomicU64::new(0),
            bytes_downloaded: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    // ===== Writers =====

    pub fn record_crawled(&self) {
        self.pages_crawled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queued(&self) {
        self.pages_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed_pages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes(&self, bytes: u64) {
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    // ===== Readers =====

    pub fn pages_crawled(&self) -> u64 {
        self.pages_crawled.load(Ordering::Relaxed)
    }

    pub fn pages_queued(&self) -> u64 {
        self.pages_queued.load(Ordering::Relaxed)
    }

    pub fn failed_pages(&self) -> u64 {
        self.failed_pages.load(Ordering::Relaxed)
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.bytes_downloaded.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Crawl rate since the run started; 0 before any time has passed
    pub fn pages_per_second(&self) -> f64 {
        rate(self.pages_crawled(), self.elapsed())
    }

    /// Captures all counters as a plain value
    pub fn snapshot(&self) -> StatsSnapshot {
        let elapsed = self.elapsed();
        let pages_crawled = self.pages_crawled();
        StatsSnapshot {
            pages_crawled,
            pages_queued: self.pages_queued(),
            failed_pages: self.failed_pages(),
            bytes_downloaded: self.bytes_downloaded(),
            elapsed_ms: elapsed.as_millis() as u64,
            pages_per_second: rate(pages_crawled, elapsed),
        }
    }
}

fn rate(pages: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        pages as f64 / secs
    } else {
        0.0
    }
}

/// Point-in-time copy of [`Stats`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StatsSnapshot {
    pub pages_crawled: u64,
    pub pages_queued: u64,
    pub failed_pages: u64,
    pub bytes_downloaded: u64,
    pub elapsed_ms: u64,
    pub pages_per_second: f64,
}

impl StatsSnapshot {
    pub fn megabytes_downloaded(&self) -> f64 {
        self.bytes_downloaded as f64 / (1024.0 * 1024.0)
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}
