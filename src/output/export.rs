//! File export sink
//!
//! Archives each crawled page as it arrives, collects page records in memory
//! and writes them out on flush:
//!
//! ```text
//! <directory>/
//!   pages/<name>.html          (written per page)
//!   content/<name>.txt         (written per page)
//!   data/crawl_results.csv
//!   data/crawl_results.json
//!   data/contact_info.txt
//!   reports/broken_links.txt   (only when some pages failed)
//!   reports/crawl_summary.md
//! ```

use crate::output::markdown::{generate_markdown_summary, CrawlSummary};
use crate::output::traits::{BrokenLink, OutputResult, PageRecord, Sink};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

const CSV_HEADERS: [&str; 13] = [
    "url",
    "title",
    "description",
    "word_count",
    "link_count",
    "image_count",
    "heading_count",
    "email_count",
    "phone_count",
    "domain",
    "has_contact_form",
    "depth",
    "crawled_at",
];

#[derive(Debug, Default)]
struct Collected {
    records: Vec<PageRecord>,
    broken_links: Vec<BrokenLink>,
}

/// Writes crawl results as CSV, JSON, and text reports
#[derive(Debug)]
pub struct ExportSink {
    directory: PathBuf,
    collected: Mutex<Collected>,
}

impl ExportSink {
    /// Creates the sink and its output directories
    pub fn new(directory: impl Into<PathBuf>) -> OutputResult<Self> {
        let directory = directory.into();
        for sub in ["pages", "content", "data", "reports"] {
            fs::create_dir_all(directory.join(sub))?;
        }

        Ok(Self {
            directory,
            collected: Mutex::new(Collected::default()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn lock(&self) -> MutexGuard<'_, Collected> {
        self.collected.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for ExportSink {
    fn accept(&self, record: PageRecord) -> OutputResult<()> {
        self.lock().records.push(record);
        Ok(())
    }

    fn report_broken_link(&self, url: &str, reason: &str) -> OutputResult<()> {
        self.lock().broken_links.push(BrokenLink::new(url, reason));
        Ok(())
    }

    fn archive_page(&self, url: &str, html: &str, text: &str) -> OutputResult<()> {
        let name = sanitize_file_name(url);
        fs::write(self.directory.join("pages").join(format!("{}.html", name)), html)?;
        fs::write(self.directory.join("content").join(format!("{}.txt", name)), text)?;
        tracing::debug!("Archived {} as {}", url, name);
        Ok(())
    }

    fn flush_all(&self) -> OutputResult<()> {
        let collected = self.lock();
        let data = self.directory.join("data");
        let reports = self.directory.join("reports");

        write_csv(&data.join("crawl_results.csv"), &collected.records)?;
        write_json(&data.join("crawl_results.json"), &collected.records)?;
        write_contact_info(&data.join("contact_info.txt"), &collected.records)?;
        if !collected.broken_links.is_empty() {
            write_broken_links(&reports.join("broken_links.txt"), &collected.broken_links)?;
        }

        let summary = CrawlSummary::from_records(&collected.records, &collected.broken_links);
        generate_markdown_summary(&summary, &reports.join("crawl_summary.md"))?;

        tracing::info!(
            "Exported {} pages to {}",
            collected.records.len(),
            self.directory.display()
        );
        Ok(())
    }
}

/// Turns a URL into a flat file name from its host and path
///
/// Characters other than ASCII letters, digits, `.` and `-` become `_`, runs
/// of `_` collapse to one, and leading or trailing `_` are dropped. Query and
/// fragment are ignored, so pages differing only in those share a name.
pub(crate) fn sanitize_file_name(url: &str) -> String {
    let raw = match Url::parse(url) {
        Ok(parsed) => format!("{}{}", parsed.host_str().unwrap_or_default(), parsed.path()),
        Err(_) => url.to_string(),
    };

    let mut name = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            c
        } else {
            '_'
        };
        if c == '_' && name.ends_with('_') {
            continue;
        }
        name.push(c);
    }

    let name = name.trim_matches('_');
    if name.is_empty() {
        "page".to_string()
    } else {
        name.to_string()
    }
}

fn write_csv(path: &Path, records: &[PageRecord]) -> OutputResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADERS)?;

    for record in records {
        writer.write_record([
            record.url.clone(),
            record.title.clone().unwrap_or_default(),
            record.description.clone().unwrap_or_default(),
            record.word_count.to_string(),
            record.link_count.to_string(),
            record.image_count.to_string(),
            record.heading_count.to_string(),
            record.emails.len().to_string(),
            record.phone_numbers.len().to_string(),
            record.domain.clone(),
            record.has_contact_form.to_string(),
            record.depth.to_string(),
            record.crawled_at.to_rfc3339(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, records: &[PageRecord]) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

fn write_contact_info(path: &Path, records: &[PageRecord]) -> OutputResult<()> {
    let emails: BTreeSet<&String> = records.iter().flat_map(|r| &r.emails).collect();
    let phones: BTreeSet<&String> = records.iter().flat_map(|r| &r.phone_numbers).collect();

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "CONTACT INFORMATION")?;
    writeln!(writer)?;
    writeln!(writer, "Email addresses ({}):", emails.len())?;
    for email in &emails {
        writeln!(writer, "{}", email)?;
    }
    writeln!(writer)?;
    writeln!(writer, "Phone numbers ({}):", phones.len())?;
    for phone in &phones {
        writeln!(writer, "{}", phone)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_broken_links(path: &Path, links: &[BrokenLink]) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "BROKEN LINKS")?;
    writeln!(writer, "Total: {}", links.len())?;
    writeln!(writer)?;
    for link in links {
        writeln!(writer, "{}", link.reason)?;
    }
    writer.flush()?;
    Ok(())
}
