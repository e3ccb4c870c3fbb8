//! Admission control for discovered links
//!
//! Decides which links found on a page become new crawl tasks:
//! - nothing is admitted from pages at the depth limit
//! - links are canonicalized, deduplicated within the page and kept to the
//!   base domain and its subdomains
//! - the page cap is checked before each admission
//! - the visited set has the final word, so each URL is queued at most once

use crate::crawler::context::CrawlContext;
use crate::crawler::frontier::CrawlTask;
use crate::url::normalize_url;
use std::collections::HashSet;

/// Admits the unseen, in-scope links found on a page at `parent_depth`
///
/// # Arguments
///
/// * `ctx` - The run's shared state
/// * `links` - Absolute links found on the page, in document order
/// * `parent_depth` - Depth of the page the links were found on
///
/// # Returns
///
/// The number of new tasks pushed to the frontier
pub fn admit_links(ctx: &CrawlContext, links: &[String], parent_depth: u32) -> usize {
    if parent_depth >= ctx.config.max_depth {
        return 0;
    }

    let child_depth = parent_depth + 1;
    let mut on_page = HashSet::new();
    let mut admitted = 0;

    for link in links {
        let url = match normalize_url(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Skipping link {}: {}", link, e);
                continue;
            }
        };

        if !ctx.scope.contains(&url) || !on_page.insert(url.as_str().to_string()) {
            continue;
        }

        let slot = match &ctx.admission_budget {
            Some(budget) => match budget.try_reserve() {
                Some(slot) => Some(slot),
                None => {
                    tracing::debug!("Admission budget exhausted; dropping remaining links");
                    break;
                }
            },
            None => {
                if ctx.stats.pages_crawled() + ctx.stats.pages_queued() >= ctx.config.max_pages {
                    tracing::debug!("Page cap reached; dropping remaining links");
                    break;
                }
                None
            }
        };

        if ctx.visited.try_admit(url.as_str(), child_depth) {
            tracing::debug!("Queued {} (depth {})", url, child_depth);
            ctx.stats.record_queued();
            ctx.frontier.push(CrawlTask::new(url, child_depth));
            if let Some(slot) = slot {
                slot.commit();
            }
            admitted += 1;
        }
    }

    admitted
}
