//! Crawl worker
//!
//! A worker repeatedly leases one task from the frontier and walks it through
//! the [`WorkerState`] cycle:
//! 1. Reserve a fetch slot from the page budget (or hand the task back)
//! 2. Sleep for the politeness delay
//! 3. Fetch the page
//! 4. Extract a page record and admit discovered links
//! 5. Update statistics and hand the record to the sink
//!
//! The worker exits once the stop signal is observed, at most one poll
//! timeout later. A fetch in progress is never interrupted by the stop signal;
//! only aborting the worker's task cancels it.

use crate::crawler::admission::admit_links;
use crate::crawler::budget::BudgetSlot;
use crate::crawler::context::CrawlContext;
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::frontier::TaskLease;
use crate::output::Sink;
use crate::state::WorkerState;
use crate::KumoError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// How a single leased task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Crawled,
    Failed,
    Interrupted,
}

/// Capabilities a worker calls through
#[derive(Clone)]
pub struct WorkerDeps {
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn Extractor>,
    pub sink: Arc<dyn Sink>,
}

pub struct Worker {
    id: usize,
    ctx: Arc<CrawlContext>,
    deps: WorkerDeps,
    stop: CancellationToken,
    state: WorkerState,
}

impl Worker {
    pub fn new(
        id: usize,
        ctx: Arc<CrawlContext>,
        deps: WorkerDeps,
        stop: CancellationToken,
    ) -> Self {
        Self {
            id,
            ctx,
            deps,
            stop,
            state: WorkerState::Idle,
        }
    }

    /// Runs until the stop signal is observed
    ///
    /// # Returns
    ///
    /// The number of tasks this worker finished (crawled or failed)
    pub async fn run(mut self) -> usize {
        tracing::debug!("Worker {} started", self.id);
        let poll_timeout = self.ctx.config.poll_timeout();
        let mut finished = 0;

        loop {
            let lease = tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                lease = self.ctx.frontier.lease(poll_timeout) => lease,
            };
            let Some(lease) = lease else {
                continue;
            };

            // Register for a release before checking, so one cannot slip by unseen
            let budget = Arc::clone(&self.ctx.fetch_budget);
            let released = budget.released();
            tokio::pin!(released);
            released.as_mut().enable();

            let Some(slot) = budget.try_reserve() else {
                lease.requeue();
                tokio::select! {
                    _ = self.stop.cancelled() => break,
                    _ = released => {}
                    _ = tokio::time::sleep(poll_timeout) => {}
                }
                continue;
            };

            match self.process(lease, slot).await {
                Ok(TaskOutcome::Interrupted) => {
                    self.state = WorkerState::Idle;
                    break;
                }
                Ok(_) => finished += 1,
                Err(e) => {
                    tracing::error!("Worker {}: {}", self.id, e);
                    self.state = WorkerState::Idle;
                }
            }
        }

        tracing::debug!("Worker {} stopped after {} tasks", self.id, finished);
        finished
    }

    /// Processes one leased task
    ///
    /// The lease and the fetch slot are released when they go out of scope;
    /// the slot stays consumed only if the page was crawled.
    async fn process(
        &mut self,
        lease: TaskLease,
        slot: BudgetSlot,
    ) -> Result<TaskOutcome, KumoError> {
        let task = lease.task().clone();
        let config = Arc::clone(&self.ctx.config);

        self.transition(WorkerState::Delaying)?;
        if !self.polite_delay().await {
            tracing::debug!("Worker {} interrupted before fetching {}", self.id, task.url);
            self.transition(WorkerState::Idle)?;
            return Ok(TaskOutcome::Interrupted);
        }

        self.transition(WorkerState::Fetching)?;
        // The fetcher gets the connect timeout; the whole fetch is bounded here
        let timeout = config.request_timeout();
        let fetched = tokio::time::timeout(
            timeout,
            self.deps
                .fetcher
                .fetch(&task.url, &config.user_agent, config.connect_timeout()),
        )
        .await
        .unwrap_or(Err(FetchError::Timeout(timeout)));

        let document = match fetched {
            Ok(document) => document,
            Err(e) => {
                self.transition(WorkerState::Reporting)?;
                tracing::warn!("Failed to fetch {}: {}", task.url, e);
                self.ctx.stats.record_failed();
                let reason = format!("{} - {}", task.url, e);
                if let Err(e) = self.deps.sink.report_broken_link(task.url.as_str(), &reason) {
                    tracing::warn!("Sink rejected broken link {}: {}", task.url, e);
                }
                self.transition(WorkerState::Idle)?;
                return Ok(TaskOutcome::Failed);
            }
        };

        self.transition(WorkerState::Extracting)?;
        let mut record = self.deps.extractor.extract(&document);
        record.depth = task.depth;
        let admitted = admit_links(&self.ctx, &document.links, task.depth);

        self.transition(WorkerState::Reporting)?;
        slot.commit();
        self.ctx.stats.record_crawled();
        self.ctx.stats.add_bytes(document.html.len() as u64);
        tracing::debug!(
            "Crawled {} (depth {}, {} new links)",
            task.url,
            task.depth,
            admitted
        );
        if let Err(e) = self
            .deps
            .sink
            .archive_page(task.url.as_str(), &document.html, &document.text)
        {
            tracing::warn!("Failed to archive page {}: {}", task.url, e);
        }
        if let Err(e) = self.deps.sink.accept(record) {
            tracing::warn!("Sink rejected page {}: {}", task.url, e);
        }

        self.transition(WorkerState::Idle)?;
        drop(lease);
        Ok(TaskOutcome::Crawled)
    }

    /// Sleeps for the configured delay; false if the stop signal came first
    async fn polite_delay(&self) -> bool {
        let delay = self.ctx.config.delay();
        if delay.is_zero() {
            return !self.stop.is_cancelled();
        }

        tokio::select! {
            _ = self.stop.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    fn transition(&mut self, next: WorkerState) -> Result<(), KumoError> {
        self.state = self.state.transition(next)?;
        tracing::trace!("Worker {} -> {}", self.id, self.state);
        Ok(())
    }
}
