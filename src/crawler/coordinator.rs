//! Crawler coordinator - pipeline assembly and shutdown
//!
//! The coordinator wires the crawl stages together:
//! - Seeding the frontier and the visited set
//! - Spawning the fetch loops, the extractor and the link router
//! - Connecting them with unbounded channels
//! - Waiting for the pipeline to drain and collecting the report

use crate::config::{validate, Config};
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::fetcher::{build_http_client, FetchStats, Fetcher};
use crate::crawler::frontier::{FetchBudget, Frontier, PageTask};
use crate::crawler::router::{is_excluded_path, LinkRouter, VisitedSet};
use crate::output::CrawlReport;
use crate::{Result, WikiRippleError};
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::{JoinError, JoinHandle};
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    frontier: Arc<Frontier>,
    visited: Arc<VisitedSet>,
    budget: Arc<FetchBudget>,
    extractor: ContentExtractor,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Validates the configuration, builds the HTTP client and seeds the
    /// frontier with the start page at depth 0. The start page's wiki path is
    /// recorded as visited (unless it lies in an excluded namespace) so the
    /// router never schedules it a second time.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to start
    /// * `Err(WikiRippleError)` - Invalid configuration or client construction failure
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;

        let seed_url = config.seed_url();
        Url::parse(&seed_url).map_err(|source| WikiRippleError::InvalidTarget {
            target: seed_url.clone(),
            source,
        })?;

        let client = build_http_client(&config.user_agent)?;
        let extractor = ContentExtractor::new(&config.site)?;

        let visited = Arc::new(VisitedSet::new());
        if let Some(path) = config.seed_path() {
            if !is_excluded_path(
                &path,
                &config.site.content_prefix,
                &config.site.excluded_namespaces,
            ) {
                visited.insert_if_absent(&path);
            }
        }

        tracing::info!(
            "Seeding frontier with {} (budget {}, {} fetch worker(s))",
            seed_url,
            config.crawl.fetch_budget,
            config.crawl.fetch_workers
        );
        let frontier = Arc::new(Frontier::with_seed(PageTask::new(seed_url, 0)));
        let budget = Arc::new(FetchBudget::new(config.crawl.fetch_budget));

        Ok(Self {
            config: Arc::new(config),
            client,
            frontier,
            visited,
            budget,
            extractor,
        })
    }

    /// Shared handle to the frontier
    pub fn frontier(&self) -> Arc<Frontier> {
        Arc::clone(&self.frontier)
    }

    /// Shared handle to the visited set
    pub fn visited(&self) -> Arc<VisitedSet> {
        Arc::clone(&self.visited)
    }

    /// Spawns every stage and returns the text stream plus a completion handle
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> CrawlRun {
        let start_time = Instant::now();

        let (page_tx, page_rx) = mpsc::unbounded_channel();
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let (link_tx, link_rx) = mpsc::unbounded_channel();

        let fetchers: Vec<JoinHandle<FetchStats>> = (0..self.config.crawl.fetch_workers)
            .map(|worker| {
                let fetcher = Fetcher::new(
                    self.client.clone(),
                    Arc::clone(&self.frontier),
                    Arc::clone(&self.budget),
                    worker,
                );
                tokio::spawn(fetcher.run(page_tx.clone()))
            })
            .collect();
        // The page stream closes once every fetch loop has dropped its sender.
        drop(page_tx);

        let extractor = tokio::spawn(self.extractor.run(page_rx, line_tx, link_tx));

        let router = LinkRouter::new(
            &self.config,
            Arc::clone(&self.frontier),
            Arc::clone(&self.visited),
        );
        let router = tokio::spawn(router.run(link_rx));

        let frontier = self.frontier;
        let visited = self.visited;
        let completion = tokio::spawn(async move {
            let mut fetch = FetchStats::default();
            for handle in fetchers {
                fetch.merge(handle.await.map_err(|e| stage_failed("fetcher", e))?);
            }
            let extract = extractor.await.map_err(|e| stage_failed("extractor", e))?;
            let route = router.await.map_err(|e| stage_failed("router", e))?;

            frontier.close();
            let pending = frontier.drain_pending();

            let report = CrawlReport {
                fetch,
                extract,
                route,
                visited: visited.len(),
                pending,
                elapsed: start_time.elapsed(),
            };

            tracing::info!(
                "Crawl finished: {} attempts ({} fetched, {} failed) in {:?}",
                report.fetch.attempts,
                report.fetch.fetched,
                report.fetch.failed,
                report.elapsed
            );
            if !report.pending.is_empty() {
                tracing::info!(
                    "{} discovered page(s) left unfetched in the frontier",
                    report.pending.len()
                );
            }

            Ok::<_, WikiRippleError>(report)
        });

        CrawlRun {
            lines: line_rx,
            completion: CrawlCompletion { handle: completion },
        }
    }
}

fn stage_failed(stage: &'static str, error: JoinError) -> WikiRippleError {
    WikiRippleError::StageFailed {
        stage,
        message: error.to_string(),
    }
}

/// A running crawl
pub struct CrawlRun {
    lines: UnboundedReceiver<String>,
    completion: CrawlCompletion,
}

impl CrawlRun {
    /// Splits the run into its text stream and completion handle
    ///
    /// The text stream yields one line per extracted page and closes once the
    /// extractor has drained.
    pub fn into_parts(self) -> (UnboundedReceiver<String>, CrawlCompletion) {
        (self.lines, self.completion)
    }

    /// Drains the text stream and waits for the crawl to finish
    pub async fn collect(self) -> Result<(Vec<String>, CrawlReport)> {
        let (mut lines, completion) = self.into_parts();
        let mut collected = Vec::new();
        while let Some(line) = lines.recv().await {
            collected.push(line);
        }
        let report = completion.wait().await?;
        Ok((collected, report))
    }
}

/// Resolves once every stage has finished
pub struct CrawlCompletion {
    handle: JoinHandle<Result<CrawlReport>>,
}

impl CrawlCompletion {
    /// Waits for the pipeline to drain and returns the report
    pub async fn wait(self) -> Result<CrawlReport> {
        self.handle
            .await
            .map_err(|e| stage_failed("coordinator", e))?
    }
}

/// Runs a complete crawl, discarding the text stream
///
/// # Example
///
/// ```no_run
/// use wiki_ripple::config::Config;
/// use wiki_ripple::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default()).await?;
/// println!("{} pages fetched", report.fetch.fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
    let (lines, completion) = Coordinator::new(config)?.start().into_parts();
    drop(lines);
    completion.wait().await
}
