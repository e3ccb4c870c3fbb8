//! Shared state for one crawl run

use crate::config::{CrawlerConfig, PageCapMode};
use crate::crawler::budget::PageBudget;
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::stats::Stats;
use crate::crawler::visited::VisitedSet;
use crate::url::DomainScope;
use std::sync::Arc;
use url::Url;

/// Everything workers and the orchestrator share during a run
///
/// A context is created per run and handed to workers behind an `Arc`, so
/// several crawls can run side by side in one process.
#[derive(Debug)]
pub struct CrawlContext {
    pub config: Arc<CrawlerConfig>,
    pub scope: DomainScope,
    pub frontier: Arc<Frontier>,
    pub visited: VisitedSet,
    pub stats: Stats,

    /// Caps successful crawls at `max-pages`; one slot per page fetched
    pub fetch_budget: Arc<PageBudget>,

    /// Caps admissions at `max-pages` when the exact page cap is configured
    pub admission_budget: Option<Arc<PageBudget>>,
}

impl CrawlContext {
    pub fn new(config: Arc<CrawlerConfig>, scope: DomainScope) -> Self {
        let fetch_budget = Arc::new(PageBudget::new(config.max_pages));
        let admission_budget = match config.page_cap {
            PageCapMode::Exact => Some(Arc::new(PageBudget::new(config.max_pages))),
            PageCapMode::BestEffort => None,
        };

        Self {
            config,
            scope,
            frontier: Arc::new(Frontier::new()),
            visited: VisitedSet::new(),
            stats: Stats::new(),
            fetch_budget,
            admission_budget,
        }
    }

    /// Admits the seed at depth 0
    ///
    /// Returns false if the seed was already admitted.
    pub fn admit_seed(&self, seed: Url) -> bool {
        let slot = match &self.admission_budget {
            Some(budget) => match budget.try_reserve() {
                Some(slot) => Some(slot),
                None => return false,
            },
            None => None,
        };

        if !self.visited.try_admit(seed.as_str(), 0) {
            return false;
        }

        self.stats.record_queued();
        self.frontier.push(CrawlTask::new(seed, 0));
        if let Some(slot) = slot {
            slot.commit();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(page_cap: PageCapMode) -> CrawlContext {
        let config = CrawlerConfig {
            page_cap,
            max_pages: 3,
            ..CrawlerConfig::default()
        };
        CrawlContext::new(Arc::new(config), DomainScope::new("example.com"))
    }

    #[test]
    fn test_admit_seed() {
        let ctx = context(PageCapMode::BestEffort);
        let seed = Url::parse("https://example.com/").unwrap();

        assert!(ctx.admit_seed(seed.clone()));
        assert!(!ctx.admit_seed(seed));

        assert_eq!(ctx.stats.pages_queued(), 1);
        assert_eq!(ctx.frontier.len(), 1);
        assert_eq!(ctx.visited.depth_of("https://example.com/"), Some(0));
        assert!(ctx.admission_budget.is_none());
    }

    #[test]
    fn test_exact_cap_seed_uses_admission_slot() {
        let ctx = context(PageCapMode::Exact);
        ctx.admit_seed(Url::parse("https://example.com/").unwrap());

        let budget = ctx.admission_budget.as_ref().unwrap();
        assert_eq!(budget.used(), 1);
        assert_eq!(ctx.fetch_budget.used(), 0);
    }
}
