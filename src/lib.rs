//! Wiki-Ripple: a bounded breadth-first wiki crawler
//!
//! This crate crawls a wiki-style site from a single start page, strips every
//! fetched page down to its body text, follows in-wiki links breadth-first and
//! stops after a fixed number of fetch attempts.

pub mod config;
pub mod crawler;
pub mod output;
pub mod tokenizer;

use thiserror::Error;

/// Main error type for Wiki-Ripple operations
#[derive(Debug, Error)]
pub enum WikiRippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid fetch target '{target}': {source}")]
    InvalidTarget {
        target: String,
        source: ::url::ParseError,
    },

    #[error("Invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Pipeline stage '{stage}' failed: {message}")]
    StageFailed { stage: &'static str, message: String },
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

/// Result type alias for Wiki-Ripple operations
pub type Result<T> = std::result::Result<T, WikiRippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, PageTask};
pub use output::CrawlReport;
