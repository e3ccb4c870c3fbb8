//! Crawler module for concurrent, domain-scoped crawling
//!
//! This module contains the core crawling logic, including:
//! - Shared crawl state (frontier, visited set, statistics, page budget)
//! - HTTP fetching and HTML parsing
//! - Page data extraction and link admission
//! - The worker pool and the orchestrator that runs a crawl to completion

mod admission;
mod budget;
mod context;
mod extractor;
mod fetcher;
mod frontier;
mod orchestrator;
mod parser;
mod pool;
mod stats;
#[cfg(test)]
pub(crate) mod testing;
mod visited;
mod worker;

pub use admission::admit_links;
pub use budget::{BudgetSlot, PageBudget};
pub use context::CrawlContext;
pub use extractor::{Extractor, HtmlExtractor};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher};
pub use frontier::{CrawlTask, Frontier, TaskLease};
pub use orchestrator::{CrawlReport, Orchestrator, StopReason};
pub use parser::{parse_html, Document};
pub use pool::WorkerPool;
pub use stats::{Stats, StatsSnapshot};
pub use visited::VisitedSet;
pub use worker::{TaskOutcome, Worker, WorkerDeps};
