//! Output generation for crawl results
//!
//! This module renders the report of a finished crawl.

pub mod stats;

pub use stats::{print_report, CrawlReport};
