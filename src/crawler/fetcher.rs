//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Error classification
//! - The budgeted fetch loop feeding the extractor
//!
//! There is no retry policy: a failed attempt drops its task and still
//! consumes one unit of the fetch budget.

use crate::config::UserAgentConfig;
use crate::crawler::frontier::{FetchBudget, Frontier, PageTask};
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Maximum redirect hops followed for a single fetch
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, TLS failure, broken body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Counters for the fetch stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Fetch attempts issued, successful or not
    pub attempts: usize,

    /// Attempts that produced a page for the extractor
    pub fetched: usize,

    /// Attempts that failed and dropped their task
    pub failed: usize,
}

impl FetchStats {
    /// Adds another loop's counters to this one
    pub fn merge(&mut self, other: FetchStats) {
        self.attempts += other.attempts;
        self.fetched += other.fetched;
        self.failed += other.failed;
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (the random-page endpoint answers with one); no
/// per-request timeout is set, so a slow page only delays its own attempt.
///
/// # Example
///
/// ```no_run
/// use wiki_ripple::config::UserAgentConfig;
/// use wiki_ripple::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs a single GET request and classifies the outcome
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_connect() {
                format!("Connection failed: {}", e)
            } else if e.is_redirect() {
                format!("Redirect error: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
        },
    }
}

/// One budgeted fetch loop
///
/// Each iteration claims a unit of the shared budget, pops the next task from
/// the frontier, fetches it and forwards the populated task downstream. The
/// loop ends when the budget is spent or the frontier can never yield another
/// task; dropping the sender then closes the page stream.
pub struct Fetcher {
    client: Client,
    frontier: Arc<Frontier>,
    budget: Arc<FetchBudget>,
    worker: usize,
}

impl Fetcher {
    /// Creates a fetch loop over the shared frontier and budget
    pub fn new(
        client: Client,
        frontier: Arc<Frontier>,
        budget: Arc<FetchBudget>,
        worker: usize,
    ) -> Self {
        Self {
            client,
            frontier,
            budget,
            worker,
        }
    }

    /// Runs the loop to completion
    pub async fn run(self, pages: UnboundedSender<PageTask>) -> FetchStats {
        let mut stats = FetchStats::default();

        while let Some(attempt) = self.budget.claim() {
            let Some(mut task) = self.frontier.pop().await else {
                if self.frontier.is_closed() {
                    tracing::debug!(worker = self.worker, "Frontier closed, stopping");
                } else {
                    tracing::warn!(
                        worker = self.worker,
                        unclaimed = self.budget.remaining(),
                        "Frontier exhausted before attempt {} of {}",
                        attempt,
                        self.budget.limit()
                    );
                }
                break;
            };

            stats.attempts += 1;

            match fetch_page(&self.client, &task.target).await {
                FetchResult::Success {
                    final_url,
                    status_code,
                    body,
                } => {
                    tracing::info!(
                        worker = self.worker,
                        attempt,
                        depth = task.depth,
                        status = status_code,
                        target = %task.target,
                        "Fetched {}",
                        final_url
                    );
                    stats.fetched += 1;
                    task.content = body;

                    if let Err(returned) = pages.send(task) {
                        tracing::warn!("Extractor stopped, dropping {}", returned.0.target);
                        self.frontier.complete();
                    }
                }
                FetchResult::HttpError { status_code } => {
                    tracing::warn!(
                        worker = self.worker,
                        attempt,
                        depth = task.depth,
                        status = status_code,
                        target = %task.target,
                        "Failed: {} (HTTP {})",
                        task.target,
                        status_code
                    );
                    stats.failed += 1;
                    self.frontier.complete();
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!(
                        worker = self.worker,
                        attempt,
                        depth = task.depth,
                        target = %task.target,
                        "Failed: {} ({})",
                        task.target,
                        error
                    );
                    stats.failed += 1;
                    self.frontier.complete();
                }
            }
        }

        tracing::debug!(
            worker = self.worker,
            attempts = stats.attempts,
            fetched = stats.fetched,
            failed = stats.failed,
            "Fetch loop finished"
        );

        stats
    }
}
