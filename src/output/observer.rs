//! Statistics observers
//!
//! Observers receive the orchestrator's periodic [`StatsSnapshot`]s. They are
//! called from the monitor loop and must not block.

use crate::crawler::StatsSnapshot;
use tokio::sync::mpsc::UnboundedSender;

/// Receives periodic statistics snapshots
pub trait StatsObserver: Send + Sync {
    fn on_stats_snapshot(&self, snapshot: &StatsSnapshot);
}

/// Logs each snapshot at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl StatsObserver for LogObserver {
    fn on_stats_snapshot(&self, snapshot: &StatsSnapshot) {
        tracing::info!(
            crawled = snapshot.pages_crawled,
            queued = snapshot.pages_queued,
            failed = snapshot.failed_pages,
            "{:.2} MB downloaded, {:.2} pages/s after {:.1}s",
            snapshot.megabytes_downloaded(),
            snapshot.pages_per_second,
            snapshot.elapsed().as_secs_f64()
        );
    }
}

/// Forwards snapshots to a channel
///
/// Snapshots are dropped silently once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: UnboundedSender<StatsSnapshot>,
}

impl ChannelObserver {
    pub fn new(sender: UnboundedSender<StatsSnapshot>) -> Self {
        Self { sender }
    }
}

impl StatsObserver for ChannelObserver {
    fn on_stats_snapshot(&self, snapshot: &StatsSnapshot) {
        let _ = self.sender.send(*snapshot);
    }
}
