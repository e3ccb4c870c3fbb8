//! SQLite sink
//!
//! Each sink instance records one crawl run. Pages and broken links are
//! written as they arrive; the run row is completed on flush.

use crate::output::traits::{OutputResult, PageRecord, Sink};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQL schema for the results database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per crawled page
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    domain TEXT NOT NULL,
    depth INTEGER NOT NULL,
    title TEXT,
    description TEXT,
    word_count INTEGER NOT NULL,
    link_count INTEGER NOT NULL,
    image_count INTEGER NOT NULL,
    heading_count INTEGER NOT NULL,
    content_length INTEGER NOT NULL,
    has_contact_form INTEGER NOT NULL,
    emails TEXT NOT NULL,
    phone_numbers TEXT NOT NULL,
    crawled_at TEXT NOT NULL,
    UNIQUE(run_id, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_domain ON pages(domain);

-- Pages that failed to fetch
CREATE TABLE IF NOT EXISTS broken_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    reason TEXT NOT NULL,
    reported_at TEXT NOT NULL
);
"#;

const STATUS_RUNNING: &str = "running";
const STATUS_COMPLETED: &str = "completed";

/// Stores crawl results in a SQLite database
pub struct SqliteSink {
    conn: Mutex<Connection>,
    run_id: i64,
}

impl SqliteSink {
    /// Opens (or creates) the database and starts a new run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration this run uses
    pub fn new(path: &Path, config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Self::with_connection(conn, config_hash)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, "test")
    }

    fn with_connection(conn: Connection, config_hash: &str) -> OutputResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![Utc::now().to_rfc3339(), config_hash, STATUS_RUNNING],
        )?;
        let run_id = conn.last_insert_rowid();
        tracing::debug!("Started run {} in results database", run_id);

        Ok(Self {
            conn: Mutex::new(conn),
            run_id,
        })
    }

    /// The run this sink writes to
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for SqliteSink {
    fn accept(&self, record: PageRecord) -> OutputResult<()> {
        let emails = join(&record.emails);
        let phones = join(&record.phone_numbers);

        self.conn().execute(
            "INSERT OR REPLACE INTO pages (
                run_id, url, domain, depth, title, description, word_count, link_count,
                image_count, heading_count, content_length, has_contact_form, emails,
                phone_numbers, crawled_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                self.run_id,
                record.url,
                record.domain,
                record.depth,
                record.title,
                record.description,
                record.word_count as i64,
                record.link_count as i64,
                record.image_count as i64,
                record.heading_count as i64,
                record.content_length as i64,
                record.has_contact_form,
                emails,
                phones,
                record.crawled_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn report_broken_link(&self, url: &str, reason: &str) -> OutputResult<()> {
        self.conn().execute(
            "INSERT INTO broken_links (run_id, url, reason, reported_at) VALUES (?1, ?2, ?3, ?4)",
            params![self.run_id, url, reason, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn flush_all(&self) -> OutputResult<()> {
        self.conn().execute(
            "UPDATE runs SET finished_at = ?1, status = ?2 WHERE id = ?3",
            params![Utc::now().to_rfc3339(), STATUS_COMPLETED, self.run_id],
        )?;
        tracing::debug!("Completed run {} in results database", self.run_id);
        Ok(())
    }
}

fn join<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(";")
}
