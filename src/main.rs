//! Kumo main entry point
//!
//! This is the command-line interface for the Kumo web crawler.

use anyhow::{bail, Context};
use clap::Parser;
use kumo::config::{load_config_with_hash, validate, Config};
use kumo::crawler::{HtmlExtractor, HttpFetcher};
use kumo::output::{print_report, ExportSink, FanOutSink, LogObserver, Sink, SqliteSink};
use kumo::Orchestrator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Kumo: a polite, domain-scoped web crawler
///
/// Kumo crawls a single site breadth-first from a seed URL with a fixed pool
/// of workers, extracts page data and contact details, and writes the
/// results to files and/or a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "kumo")]
#[command(version)]
#[command(about = "A polite, domain-scoped web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL (overrides the config file)
    #[arg(long)]
    seed: Option<String>,

    /// Number of concurrent workers
    #[arg(long)]
    threads: Option<usize>,

    /// Maximum number of pages to crawl
    #[arg(long)]
    max_pages: Option<u64>,

    /// Maximum link depth from the seed
    #[arg(long)]
    max_depth: Option<u32>,

    /// Delay before each fetch, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Directory for CSV/JSON/report exports
    #[arg(long)]
    output_dir: Option<String>,

    /// SQLite database for crawl results
    #[arg(long)]
    database: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => (Config::default(), "default".to_string()),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    let Some(seed) = config.seed.clone() else {
        bail!("No seed URL given; pass --seed or set `seed` in the config file");
    };

    if cli.dry_run {
        print_plan(&config, &seed);
        return Ok(());
    }

    handle_crawl(config, &seed, &config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kumo=info,warn"),
            1 => EnvFilter::new("kumo=debug,info"),
            2 => EnvFilter::new("kumo=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(seed) = &cli.seed {
        config.seed = Some(seed.clone());
    }
    if let Some(threads) = cli.threads {
        config.crawler.max_threads = threads;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.crawler.delay_ms = delay_ms;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = Some(dir.clone());
    }
    if let Some(db) = &cli.database {
        config.output.database_path = Some(db.clone());
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn print_plan(config: &Config, seed: &str) {
    let crawler = &config.crawler;

    println!("=== Kumo Dry Run ===\n");
    println!("Seed: {}\n", seed);

    println!("Crawler Configuration:");
    println!("  Workers: {}", crawler.max_threads);
    println!("  Max pages: {}", crawler.max_pages);
    println!("  Max depth: {}", crawler.max_depth);
    println!("  Delay: {}ms", crawler.delay_ms);
    println!("  Request timeout: {}ms", crawler.request_timeout_ms);
    println!("  User agent: {}", crawler.user_agent);
    println!("  Quiescence: {:?}", crawler.quiescence);
    println!("  Page cap: {:?}", crawler.page_cap);

    println!("\nOutput:");
    match &config.output.directory {
        Some(dir) => println!("  Exports: {}", dir),
        None => println!("  Exports: disabled"),
    }
    match &config.output.database_path {
        Some(db) => println!("  Database: {}", db),
        None => println!("  Database: disabled"),
    }

    println!("\n✓ Configuration is valid");
}

fn build_sink(config: &Config, config_hash: &str) -> anyhow::Result<FanOutSink> {
    let mut sink = FanOutSink::default();

    if let Some(dir) = &config.output.directory {
        let export = ExportSink::new(dir)
            .with_context(|| format!("Failed to create output directory {}", dir))?;
        sink.push(Arc::new(export));
    }
    if let Some(db) = &config.output.database_path {
        let sqlite = SqliteSink::new(Path::new(db), config_hash)
            .with_context(|| format!("Failed to open database {}", db))?;
        sink.push(Arc::new(sqlite));
    }
    if sink.is_empty() {
        tracing::warn!("No outputs configured; results will only be logged");
    }

    Ok(sink)
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, seed: &str, config_hash: &str) -> anyhow::Result<()> {
    let sink: Arc<dyn Sink> = Arc::new(build_sink(&config, config_hash)?);
    let fetcher = HttpFetcher::from_config(&config.crawler).context("Failed to build HTTP client")?;

    let orchestrator = Orchestrator::new(
        config.crawler,
        Arc::new(fetcher),
        Arc::new(HtmlExtractor::new()),
        sink,
    )
    .with_observer(Arc::new(LogObserver));

    let stop = orchestrator.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping crawl");
            stop.cancel();
        }
    });

    let report = orchestrator.run(seed).await.context("Crawl failed")?;
    print_report(&report);

    Ok(())
}
