//! Pending-task queue shared by all workers
//!
//! The frontier is an unbounded FIFO of [`CrawlTask`]s plus an outstanding-work
//! counter. A task counts as outstanding from the moment it is pushed until
//! the worker that leased it drops its [`TaskLease`], so a zero counter means
//! no task is queued and no worker can still discover new ones.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use url::Url;

/// A URL to crawl and its distance (in links) from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: u32,
}

impl CrawlTask {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }
}

/// Multi-producer, multi-consumer FIFO of crawl tasks
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<CrawlTask>>,
    available: Notify,
    outstanding: AtomicUsize,
    leased: AtomicUsize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a new task; never blocks
    pub fn push(&self, task: CrawlTask) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.enqueue(task);
    }

    /// Waits up to `timeout` for a task
    ///
    /// Returns `None` on timeout. Cancel safe: dropping the future never
    /// loses a task.
    pub async fn pop(&self, timeout: Duration) -> Option<CrawlTask> {
        let deadline = Instant::now() + timeout;

        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(task) = self.try_pop() {
                return Some(task);
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.try_pop();
            }
        }
    }

    /// Like [`Frontier::pop`], but wraps the task in a lease that finishes it on drop
    pub async fn lease(self: &Arc<Self>, timeout: Duration) -> Option<TaskLease> {
        let task = self.pop(timeout).await?;
        self.leased.fetch_add(1, Ordering::SeqCst);
        Some(TaskLease {
            frontier: Arc::clone(self),
            task,
            returned: false,
        })
    }

    /// Marks one outstanding task as finished
    pub fn complete(&self) {
        let _ = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// Best-effort check that nothing is queued
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Number of tasks currently held by workers
    pub fn in_flight(&self) -> usize {
        self.leased.load(Ordering::SeqCst)
    }

    /// Number of tasks queued or held by workers
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// True when no task is queued and no worker holds one
    pub fn is_quiescent(&self) -> bool {
        self.outstanding() == 0
    }

    fn enqueue(&self, task: CrawlTask) {
        self.lock().push_back(task);
        self.available.notify_one();
    }

    fn try_pop(&self) -> Option<CrawlTask> {
        self.lock().pop_front()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<CrawlTask>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A worker's claim on a dequeued task
///
/// Dropping the lease finishes the task, including when the owning worker is
/// cancelled mid-fetch. [`TaskLease::requeue`] hands the task back instead.
#[derive(Debug)]
pub struct TaskLease {
    frontier: Arc<Frontier>,
    task: CrawlTask,
    returned: bool,
}

impl TaskLease {
    pub fn task(&self) -> &CrawlTask {
        &self.task
    }

    /// Puts the task back at the end of the queue without finishing it
    pub fn requeue(mut self) {
        self.returned = true;
        self.frontier.leased.fetch_sub(1, Ordering::SeqCst);
        self.frontier.enqueue(self.task.clone());
    }
}

impl Drop for TaskLease {
    fn drop(&mut self) {
        if !self.returned {
            self.frontier.leased.fetch_sub(1, Ordering::SeqCst);
            self.frontier.complete();
        }
    }
}
