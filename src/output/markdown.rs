//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of crawl results,
//! including overall and content statistics, a depth breakdown, and the
//! domains with the most pages.

use crate::output::traits::{BrokenLink, OutputResult, PageRecord};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Number of domains listed in the top domains table
const TOP_DOMAINS: usize = 10;

/// Per-domain aggregates
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSummary {
    pub domain: String,
    pub pages: usize,
    pub avg_words: f64,
    pub avg_links: f64,
    pub avg_images: f64,
    pub contact_form_pages: usize,
}

/// Aggregates over a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub generated_at: DateTime<Utc>,
    pub total_pages: usize,
    pub unique_domains: usize,
    pub broken_links: usize,
    pub unique_emails: usize,
    pub unique_phone_numbers: usize,
    pub total_words: usize,
    pub total_links: usize,
    pub total_images: usize,
    pub contact_form_pages: usize,

    /// Pages crawled per depth
    pub depth_breakdown: BTreeMap<u32, usize>,

    /// Domains ordered by page count (descending), then name
    pub top_domains: Vec<DomainSummary>,
}

impl CrawlSummary {
    pub fn from_records(records: &[PageRecord], broken_links: &[BrokenLink]) -> Self {
        let mut emails = BTreeSet::new();
        let mut phones = BTreeSet::new();
        let mut depth_breakdown = BTreeMap::new();
        let mut by_domain: HashMap<&str, Vec<&PageRecord>> = HashMap::new();

        for record in records {
            emails.extend(record.emails.iter());
            phones.extend(record.phone_numbers.iter());
            *depth_breakdown.entry(record.depth).or_insert(0) += 1;
            by_domain.entry(record.domain.as_str()).or_default().push(record);
        }

        let unique_domains = by_domain.len();
        let mut top_domains: Vec<DomainSummary> = by_domain
            .into_iter()
            .map(|(domain, pages)| summarize_domain(domain, &pages))
            .collect();
        top_domains.sort_by(|a, b| b.pages.cmp(&a.pages).then_with(|| a.domain.cmp(&b.domain)));
        top_domains.truncate(TOP_DOMAINS);

        Self {
            generated_at: Utc::now(),
            total_pages: records.len(),
            unique_domains,
            broken_links: broken_links.len(),
            unique_emails: emails.len(),
            unique_phone_numbers: phones.len(),
            total_words: records.iter().map(|r| r.word_count).sum(),
            total_links: records.iter().map(|r| r.link_count).sum(),
            total_images: records.iter().map(|r| r.image_count).sum(),
            contact_form_pages: records.iter().filter(|r| r.has_contact_form).count(),
            depth_breakdown,
            top_domains,
        }
    }
}

fn summarize_domain(domain: &str, pages: &[&PageRecord]) -> DomainSummary {
    let count = pages.len();
    let average = |value: fn(&PageRecord) -> usize| {
        if count == 0 {
            0.0
        } else {
            pages.iter().map(|p| value(p)).sum::<usize>() as f64 / count as f64
        }
    };

    DomainSummary {
        domain: domain.to_string(),
        pages: count,
        avg_words: average(|p| p.word_count),
        avg_links: average(|p| p.link_count),
        avg_images: average(|p| p.image_count),
        contact_form_pages: pages.iter().filter(|p| p.has_contact_form).count(),
    }
}

/// Writes a markdown summary to `output_path`
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Kumo Crawl Summary\n\n");
    md.push_str(&format!(
        "Generated: {}\n\n",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Crawled**: {}\n", summary.total_pages));
    md.push_str(&format!("- **Domains**: {}\n", summary.unique_domains));
    md.push_str(&format!("- **Broken Links**: {}\n", summary.broken_links));
    md.push_str(&format!("- **Emails Found**: {}\n", summary.unique_emails));
    md.push_str(&format!(
        "- **Phone Numbers Found**: {}\n\n",
        summary.unique_phone_numbers
    ));

    md.push_str("## Content Statistics\n\n");
    md.push_str(&format!("- **Total Words**: {}\n", summary.total_words));
    md.push_str(&format!("- **Total Links**: {}\n", summary.total_links));
    md.push_str(&format!("- **Total Images**: {}\n", summary.total_images));
    md.push_str(&format!(
        "- **Pages With Contact Forms**: {}\n\n",
        summary.contact_form_pages
    ));

    if !summary.depth_breakdown.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &summary.depth_breakdown {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !summary.top_domains.is_empty() {
        md.push_str("## Top Domains\n\n");
        md.push_str("| Domain | Pages | Avg Words | Avg Links | Avg Images | Contact Forms |\n");
        md.push_str("|--------|-------|-----------|-----------|------------|---------------|\n");
        for domain in &summary.top_domains {
            md.push_str(&format!(
                "| {} | {} | {:.1} | {:.1} | {:.1} | {} |\n",
                domain.domain,
                domain.pages,
                domain.avg_words,
                domain.avg_links,
                domain.avg_images,
                domain.contact_form_pages
            ));
        }
        md.push('\n');
    }

    md.push_str("## Files\n\n");
    md.push_str("- `data/crawl_results.csv`: one row per crawled page\n");
    md.push_str("- `data/crawl_results.json`: full page records\n");
    md.push_str("- `data/contact_info.txt`: all emails and phone numbers found\n");
    if summary.broken_links > 0 {
        md.push_str("- `reports/broken_links.txt`: pages that failed to fetch\n");
    }
    md.push_str("- `reports/crawl_summary.md`: this summary\n");

    md
}
