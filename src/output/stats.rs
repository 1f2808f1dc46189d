//! Crawl report
//!
//! This module collects the per-stage counters of a finished crawl and
//! renders them for the terminal.

use crate::crawler::{ExtractStats, FetchStats, PageTask, RouteStats};
use std::time::Duration;

/// Number of unfetched targets listed by `print_report`
const PENDING_PREVIEW: usize = 10;

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Fetch stage counters
    pub fetch: FetchStats,

    /// Extract stage counters
    pub extract: ExtractStats,

    /// Route stage counters
    pub route: RouteStats,

    /// Size of the visited set at the end of the crawl
    pub visited: usize,

    /// Tasks left in the frontier when the budget ran out, in visit order
    pub pending: Vec<PageTask>,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Fetch attempts per second
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.fetch.attempts as f64 / secs
        } else {
            0.0
        }
    }

    /// Deepest level among the unfetched tasks
    pub fn max_pending_depth(&self) -> Option<u32> {
        self.pending.iter().map(|task| task.depth).max()
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Fetching:");
    println!("  Attempts: {}", report.fetch.attempts);
    println!("  Fetched: {}", report.fetch.fetched);
    println!("  Failed: {}", report.fetch.failed);
    println!(
        "  Duration: {:.1}s ({:.2} attempts/sec)",
        report.elapsed.as_secs_f64(),
        report.rate()
    );
    println!();

    println!("Extraction:");
    println!("  Pages: {}", report.extract.pages);
    println!("  Empty bodies: {}", report.extract.empty_bodies);
    println!("  Links found: {}", report.extract.links);
    println!();

    println!("Routing:");
    println!("  Scheduled: {}", report.route.scheduled);
    println!("  Duplicates: {}", report.route.duplicates);
    println!("  Excluded namespaces: {}", report.route.excluded);
    println!("  Visited set size: {}", report.visited);
    println!();

    println!("Unfetched ({}):", report.pending.len());
    if let Some(depth) = report.max_pending_depth() {
        println!("  Deepest level: {}", depth);
    }
    for task in report.pending.iter().take(PENDING_PREVIEW) {
        println!("  - [{}] {}", task.depth, task.target);
    }
    if report.pending.len() > PENDING_PREVIEW {
        println!("  ... and {} more", report.pending.len() - PENDING_PREVIEW);
    }
}
