use serde::Deserialize;
use std::time::Duration;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("Kumo/", env!("CARGO_PKG_VERSION"));

/// Main configuration structure for Kumo
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// URL the crawl starts from; may also be given on the command line
    #[serde(default)]
    pub seed: Option<String>,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// How the orchestrator decides that no work is left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuiescenceMode {
    /// Stop once the frontier is empty and no worker holds a task
    #[default]
    InFlight,

    /// Stop once the frontier is empty, and still empty after the grace period
    GracePeriod,
}

/// How strictly admission respects `max-pages`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageCapMode {
    /// Compare crawled + queued against the cap; may overshoot under contention
    #[default]
    BestEffort,

    /// Reserve an admission slot per URL; never more than `max-pages` admissions
    Exact,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent workers
    #[serde(rename = "max-threads")]
    pub max_threads: usize,

    /// Upper bound on successfully crawled pages
    #[serde(rename = "max-pages")]
    pub max_pages: u64,

    /// Pages at this depth are fetched but their links are not followed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Pause before every fetch (milliseconds)
    ///
    /// The pause is taken by each worker before each of its own fetches, so
    /// the effective interval between requests to the host is roughly
    /// `delay-ms / max-threads`.
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Timeout handed to the fetcher for each request (milliseconds)
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    /// Hard bound a worker puts around a whole fetch (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// How long a worker waits on an empty frontier before re-checking the stop signal
    #[serde(rename = "poll-timeout-ms")]
    pub poll_timeout_ms: u64,

    /// Interval between monitoring ticks (milliseconds)
    #[serde(rename = "monitor-interval-ms")]
    pub monitor_interval_ms: u64,

    /// Re-check delay used by the grace-period quiescence mode (milliseconds)
    #[serde(rename = "quiescence-grace-ms")]
    pub quiescence_grace_ms: u64,

    /// How long shutdown waits for workers before cancelling them (milliseconds)
    #[serde(rename = "shutdown-grace-ms")]
    pub shutdown_grace_ms: u64,

    pub quiescence: QuiescenceMode,

    #[serde(rename = "page-cap")]
    pub page_cap: PageCapMode,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_threads: 5,
            max_pages: 100,
            max_depth: 2,
            delay_ms: 1000,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            poll_timeout_ms: 5_000,
            monitor_interval_ms: 5_000,
            quiescence_grace_ms: 2_000,
            shutdown_grace_ms: 30_000,
            quiescence: QuiescenceMode::default(),
            page_cap: PageCapMode::default(),
        }
    }
}

impl CrawlerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    pub fn quiescence_grace(&self) -> Duration {
        Duration::from_millis(self.quiescence_grace_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for CSV/JSON/report exports; exports are disabled when unset
    pub directory: Option<String>,

    /// Path to the SQLite database file; the database sink is disabled when unset
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}
