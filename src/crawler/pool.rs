//! Fixed-size worker pool with bounded shutdown

use crate::crawler::context::CrawlContext;
use crate::crawler::worker::{Worker, WorkerDeps};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// A set of workers sharing one crawl context and one stop signal
pub struct WorkerPool {
    workers: JoinSet<usize>,
    stop: CancellationToken,
    size: usize,
}

impl WorkerPool {
    /// Spawns `size` workers onto the current runtime
    pub fn spawn(
        size: usize,
        ctx: &Arc<CrawlContext>,
        deps: &WorkerDeps,
        stop: CancellationToken,
    ) -> Self {
        let mut workers = JoinSet::new();
        for id in 0..size {
            let worker = Worker::new(id, Arc::clone(ctx), deps.clone(), stop.clone());
            workers.spawn(worker.run());
        }
        tracing::debug!("Spawned {} workers", size);

        Self {
            workers,
            stop,
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Signals every worker to stop and waits for them
    ///
    /// Workers that have not exited within `grace` are aborted. Calling this
    /// again after all workers are gone does nothing.
    ///
    /// # Returns
    ///
    /// `true` if any worker had to be aborted
    pub async fn shutdown(&mut self, grace: Duration) -> bool {
        self.stop.cancel();
        if self.workers.is_empty() {
            return false;
        }

        let drained = tokio::time::timeout(grace, drain(&mut self.workers)).await;
        match drained {
            Ok(tasks) => {
                tracing::debug!("All workers stopped ({} tasks finished)", tasks);
                false
            }
            Err(_) => {
                tracing::warn!(
                    "{} workers still running after {:?}, aborting",
                    self.workers.len(),
                    grace
                );
                self.workers.abort_all();
                drain(&mut self.workers).await;
                true
            }
        }
    }
}

async fn drain(workers: &mut JoinSet<usize>) -> usize {
    let mut finished = 0;
    while let Some(result) = workers.join_next().await {
        match result {
            Ok(tasks) => finished += tasks,
            Err(e) if e.is_cancelled() => {}
            Err(e) => tracing::error!("Worker panicked: {}", e),
        }
    }
    finished
}
