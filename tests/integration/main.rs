//! Integration tests for Kumo
//!
//! - `crawl_tests`: full crawls against wiremock servers through the HTTP fetcher
//! - `scheduler_tests`: termination, limits, and scope properties with in-memory fetchers

mod crawl_tests;
mod scheduler_tests;
mod support;
