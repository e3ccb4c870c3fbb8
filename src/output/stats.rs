//! Final report printing

use crate::crawler::CrawlReport;

/// Prints the final statistics block to stdout
///
/// # Arguments
///
/// * `report` - The report returned by a finished crawl
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}

/// Formats the final statistics block
pub fn format_report(report: &CrawlReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    out.push_str("=== Crawl Statistics ===\n\n");
    out.push_str(&format!("Seed: {}\n", report.seed));
    out.push_str(&format!("Domain: {}\n", report.domain));
    out.push_str(&format!("Stopped: {}\n\n", report.stop_reason));

    out.push_str(&format!("  Pages crawled: {}\n", stats.pages_crawled));
    out.push_str(&format!("  Pages queued: {}\n", stats.pages_queued));
    out.push_str(&format!("  Failed pages: {}\n", stats.failed_pages));
    out.push_str(&format!("  Unique URLs: {}\n", report.unique_urls));
    out.push_str(&format!(
        "  Downloaded: {:.2} MB\n",
        stats.megabytes_downloaded()
    ));
    out.push_str(&format!(
        "  Elapsed: {:.1}s ({:.2} pages/s)\n",
        stats.elapsed().as_secs_f64(),
        stats.pages_per_second
    ));

    if report.forced_cancellation {
        out.push_str("\nWarning: some workers were aborted during shutdown\n");
    }
    if report.flush_failed {
        out.push_str("\nWarning: results could not be fully written\n");
    }

    out
}
