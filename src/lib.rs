//! Kumo: a bounded, polite, domain-scoped web crawler
//!
//! Starting from a single seed URL, Kumo crawls breadth-first within the seed's
//! domain using a fixed pool of concurrent workers, stopping at a page-count or
//! depth limit, and routes extracted page data to pluggable sinks.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Kumo operations
#[derive(Debug, Error)]
pub enum KumoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("Invalid worker state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::WorkerState,
        to: state::WorkerState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Kumo operations
pub type Result<T> = std::result::Result<T, KumoError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Orchestrator, StopReason};
pub use state::WorkerState;
pub use crate::url::{extract_domain, normalize_url, DomainScope};
