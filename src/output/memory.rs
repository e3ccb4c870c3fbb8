//! In-memory sink

use crate::output::traits::{BrokenLink, OutputResult, PageRecord, Sink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Keeps every record and broken link in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<PageRecord>>,
    broken_links: Mutex<Vec<BrokenLink>>,
    archived: Mutex<Vec<String>>,
    flushes: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records accepted so far, in arrival order
    pub fn records(&self) -> Vec<PageRecord> {
        lock(&self.records).clone()
    }

    pub fn broken_links(&self) -> Vec<BrokenLink> {
        lock(&self.broken_links).clone()
    }

    /// URLs of the pages handed to [`Sink::archive_page`]
    pub fn archived_pages(&self) -> Vec<String> {
        lock(&self.archived).clone()
    }

    /// How many times [`Sink::flush_all`] was called
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl Sink for MemorySink {
    fn accept(&self, record: PageRecord) -> OutputResult<()> {
        lock(&self.records).push(record);
        Ok(())
    }

    fn report_broken_link(&self, url: &str, reason: &str) -> OutputResult<()> {
        lock(&self.broken_links).push(BrokenLink::new(url, reason));
        Ok(())
    }

    fn archive_page(&self, url: &str, _html: &str, _text: &str) -> OutputResult<()> {
        lock(&self.archived).push(url.to_string());
        Ok(())
    }

    fn flush_all(&self) -> OutputResult<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
