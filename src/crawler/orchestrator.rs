//! Crawl orchestration
//!
//! The orchestrator owns one crawl from seed to report:
//! - Validating the seed and fixing the domain scope
//! - Starting the worker pool
//! - Monitoring progress and deciding when to stop
//! - Shutting workers down and flushing the sink

use crate::config::{validate_crawler_config, CrawlerConfig, QuiescenceMode};
use crate::crawler::context::CrawlContext;
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::pool::WorkerPool;
use crate::crawler::stats::StatsSnapshot;
use crate::crawler::worker::WorkerDeps;
use crate::output::{Sink, StatsObserver};
use crate::url::{normalize_url, DomainScope};
use crate::{KumoError, Result};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Why a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// The configured number of pages was crawled
    PageLimit,

    /// No work was left anywhere
    Quiescent,

    /// The stop handle was cancelled from outside
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PageLimit => "page limit reached",
            Self::Quiescent => "no work left",
            Self::Requested => "stop requested",
        };
        f.write_str(s)
    }
}

/// Outcome of a finished crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    pub domain: String,
    pub stats: StatsSnapshot,
    pub unique_urls: usize,
    pub stop_reason: StopReason,

    /// Some workers did not stop within the shutdown grace and were aborted
    pub forced_cancellation: bool,

    /// The sink failed to flush; results may be incomplete on disk
    pub flush_failed: bool,
}

/// Runs crawls with a fixed set of capabilities
pub struct Orchestrator {
    config: Arc<CrawlerConfig>,
    deps: WorkerDeps,
    observers: Vec<Arc<dyn StatsObserver>>,
    stop: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        config: CrawlerConfig,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        sink: Arc<dyn Sink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            deps: WorkerDeps {
                fetcher,
                extractor,
                sink,
            },
            observers: Vec::new(),
            stop: CancellationToken::new(),
        }
    }

    /// Adds an observer that receives every periodic statistics snapshot
    pub fn with_observer(mut self, observer: Arc<dyn StatsObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Handle that stops the crawl when cancelled
    ///
    /// Cancelling before [`run`](Self::run) makes the run stop immediately.
    pub fn stop_handle(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Crawls from `seed` until a stop condition holds
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute http(s) URL; its host fixes the crawl scope
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl ran and all workers have stopped
    /// * `Err(KumoError::Config)` - The crawler settings are out of range
    /// * `Err(KumoError::InvalidSeed)` - The seed is not a crawlable URL
    pub async fn run(&self, seed: &str) -> Result<CrawlReport> {
        validate_crawler_config(&self.config)?;

        let seed_url = normalize_url(seed).map_err(|e| KumoError::InvalidSeed {
            url: seed.to_string(),
            reason: e.to_string(),
        })?;
        let scope = DomainScope::from_url(&seed_url).ok_or_else(|| KumoError::InvalidSeed {
            url: seed.to_string(),
            reason: "URL has no host".to_string(),
        })?;

        tracing::info!(
            "Starting crawl of {} ({} workers, max {} pages, max depth {})",
            seed_url,
            self.config.max_threads,
            self.config.max_pages,
            self.config.max_depth
        );

        let ctx = Arc::new(CrawlContext::new(Arc::clone(&self.config), scope.clone()));
        ctx.admit_seed(seed_url.clone());

        let stop = self.stop.child_token();
        let mut pool = WorkerPool::spawn(self.config.max_threads, &ctx, &self.deps, stop.clone());

        let stop_reason = self.monitor(&ctx, &stop).await;
        tracing::info!("Stopping crawl: {}", stop_reason);

        let forced_cancellation = pool.shutdown(self.config.shutdown_grace()).await;

        let flush_failed = match self.deps.sink.flush_all() {
            Ok(()) => false,
            Err(e) => {
                tracing::error!("Failed to flush results: {}", e);
                true
            }
        };

        let stats = ctx.stats.snapshot();
        self.notify(&stats);
        tracing::info!(
            "Crawl finished: {} pages crawled, {} failed, {} unique URLs in {:.1}s",
            stats.pages_crawled,
            stats.failed_pages,
            ctx.visited.len(),
            stats.elapsed().as_secs_f64()
        );

        Ok(CrawlReport {
            seed: seed_url.to_string(),
            domain: scope.base().to_string(),
            stats,
            unique_urls: ctx.visited.len(),
            stop_reason,
            forced_cancellation,
            flush_failed,
        })
    }

    /// Waits until a stop condition holds, reporting progress each interval
    async fn monitor(&self, ctx: &CrawlContext, stop: &CancellationToken) -> StopReason {
        let mut interval = tokio::time::interval(self.config.monitor_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => return StopReason::Requested,
                _ = interval.tick() => {}
            }

            let stats = ctx.stats.snapshot();
            tracing::debug!(
                "Progress: {} crawled, {} queued, {} failed, {} in flight, {:.2} pages/s, {:.2} MB",
                stats.pages_crawled,
                stats.pages_queued,
                stats.failed_pages,
                ctx.frontier.in_flight(),
                stats.pages_per_second,
                stats.megabytes_downloaded()
            );
            self.notify(&stats);

            if stats.pages_crawled >= self.config.max_pages {
                return StopReason::PageLimit;
            }

            match self.config.quiescence {
                QuiescenceMode::InFlight => {
                    if ctx.frontier.is_quiescent() {
                        return self.quiescent_reason(ctx);
                    }
                }
                QuiescenceMode::GracePeriod => {
                    if ctx.frontier.is_empty() {
                        tokio::select! {
                            biased;
                            _ = stop.cancelled() => return StopReason::Requested,
                            _ = tokio::time::sleep(self.config.quiescence_grace()) => {}
                        }
                        if ctx.frontier.is_empty() {
                            return self.quiescent_reason(ctx);
                        }
                    }
                }
            }
        }
    }

    /// Names the stop reason once no work is left
    ///
    /// The last page may have been counted after this tick's snapshot, so the
    /// page limit is checked again and wins.
    fn quiescent_reason(&self, ctx: &CrawlContext) -> StopReason {
        if ctx.stats.pages_crawled() >= self.config.max_pages {
            StopReason::PageLimit
        } else {
            StopReason::Quiescent
        }
    }

    fn notify(&self, stats: &StatsSnapshot) {
        for observer in &self.observers {
            observer.on_stats_snapshot(stats);
        }
    }
}
