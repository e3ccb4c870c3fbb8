//! Sink that forwards to several sinks

use crate::output::traits::{OutputResult, PageRecord, Sink};
use std::sync::Arc;

/// Forwards every call to each child sink in order
///
/// A failing child does not keep the others from being called; the first
/// error is returned once all children have run.
#[derive(Default)]
pub struct FanOutSink {
    sinks: Vec<Arc<dyn Sink>>,
}

impl FanOutSink {
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn Sink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn for_each(&self, mut call: impl FnMut(&dyn Sink) -> OutputResult<()>) -> OutputResult<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = call(sink.as_ref()) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Sink for FanOutSink {
    fn accept(&self, record: PageRecord) -> OutputResult<()> {
        self.for_each(|sink| sink.accept(record.clone()))
    }

    fn report_broken_link(&self, url: &str, reason: &str) -> OutputResult<()> {
        self.for_each(|sink| sink.report_broken_link(url, reason))
    }

    fn archive_page(&self, url: &str, html: &str, text: &str) -> OutputResult<()> {
        self.for_each(|sink| sink.archive_page(url, html, text))
    }

    fn flush_all(&self) -> OutputResult<()> {
        self.for_each(|sink| sink.flush_all())
    }
}
