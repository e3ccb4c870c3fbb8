//! Output module for crawl results and reports
//!
//! This module handles:
//! - The [`Sink`] interface workers hand page records and broken links to
//! - In-memory, file export, and SQLite sinks, plus fan-out to several
//! - Statistics observers and the final report

mod export;
mod fanout;
mod markdown;
mod memory;
mod observer;
mod sqlite;
mod stats;
mod traits;

pub use export::ExportSink;
pub use fanout::FanOutSink;
pub use markdown::{format_markdown_summary, generate_markdown_summary, CrawlSummary, DomainSummary};
pub use memory::MemorySink;
pub use observer::{ChannelObserver, LogObserver, StatsObserver};
pub use sqlite::SqliteSink;
pub use stats::{format_report, print_report};
pub use traits::{BrokenLink, OutputError, OutputResult, PageRecord, Sink};
