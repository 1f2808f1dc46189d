//! Configuration module for Wiki-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a crawl can run without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use wiki_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wiki-ripple.toml")).unwrap();
//! println!("Crawl will start at: {}", config.seed_url());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, SiteConfig, UserAgentConfig, DEFAULT_EXCLUDED_NAMESPACES,
    DEFAULT_FETCH_BUDGET, DEFAULT_LANGUAGE, DEFAULT_START_PAGE,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::{validate, MAX_FETCH_WORKERS};
