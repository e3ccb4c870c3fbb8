//! Configuration module for Kumo
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every table and key is optional; anything left out falls back to the defaults
//! documented on [`CrawlerConfig`] and [`OutputConfig`].
//!
//! # Example
//!
//! ```no_run
//! use kumo::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("kumo.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.max_threads);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, PageCapMode, QuiescenceMode};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::{validate, validate_crawler_config, validate_seed};
