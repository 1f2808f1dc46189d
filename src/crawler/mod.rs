//! Crawler module for wiki page fetching and processing
//!
//! This module contains the crawl pipeline:
//! - The frontier work-queue and the fetch budget
//! - HTTP fetching, one attempt per budget unit
//! - Body isolation, tag stripping and link discovery
//! - Link filtering, deduplication and re-queueing
//! - Overall pipeline coordination
//!
//! Data flows Frontier -> Fetcher -> Extractor -> Router -> Frontier, with the
//! extractor's text stream leaving the cycle for the tokenizer.

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod router;

pub use coordinator::{run_crawl, Coordinator, CrawlCompletion, CrawlRun};
pub use extractor::{
    collapse_whitespace, isolate_body, strip_all_tags, strip_tags_except_anchors,
    ContentExtractor, DiscoveredLink, ExtractStats, ExtractedPage, LinkEvent,
};
pub use fetcher::{build_http_client, fetch_page, FetchResult, FetchStats, Fetcher};
pub use frontier::{FetchBudget, Frontier, PageTask};
pub use router::{is_excluded_path, LinkRouter, RouteOutcome, RouteStats, VisitedSet};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl without a text consumer. It will:
/// 1. Validate the configuration and seed the frontier
/// 2. Build the HTTP client
/// 3. Fetch pages until the budget is spent
/// 4. Extract text and follow links
/// 5. Return the crawl report
pub async fn crawl(config: Config) -> Result<CrawlReport> {
    run_crawl(config).await
}
