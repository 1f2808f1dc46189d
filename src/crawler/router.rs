//! Link routing: namespace filtering, deduplication and re-queueing
//!
//! The router is the only place new work enters the frontier after the seed.
//! Each discovered path is either rejected (excluded namespace), discarded
//! (already seen), or turned into an absolute fetch target and pushed.

use crate::config::Config;
use crate::crawler::extractor::{DiscoveredLink, LinkEvent};
use crate::crawler::frontier::{Frontier, PageTask};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedReceiver;

/// Every wiki path ever accepted for scheduling
///
/// Test-and-insert is atomic, so two concurrent discoveries of the same path
/// never both pass.
#[derive(Debug, Default)]
pub struct VisitedSet {
    paths: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `path`, returning `true` if it was not present before
    pub fn insert_if_absent(&self, path: &str) -> bool {
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        if paths.contains(path) {
            false
        } else {
            paths.insert(path.to_string())
        }
    }

    /// Returns whether `path` has been accepted
    pub fn contains(&self, path: &str) -> bool {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }

    /// Returns the number of accepted paths
    pub fn len(&self) -> usize {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether no path has been accepted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether `path` lies in one of the `excluded` namespaces below `content_prefix`
pub fn is_excluded_path(path: &str, content_prefix: &str, excluded: &[String]) -> bool {
    path.strip_prefix(content_prefix)
        .and_then(|rest| rest.split_once(':'))
        .is_some_and(|(label, _)| excluded.iter().any(|ns| ns == label))
}

/// What the router did with one discovered link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Path lies in an excluded namespace
    Excluded,
    /// Path was already scheduled or fetched
    Duplicate,
    /// Path was new and pushed to the frontier
    Scheduled,
}

/// Counters for the route stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteStats {
    /// Links received from the extractor
    pub discovered: usize,
    /// Links rejected by namespace
    pub excluded: usize,
    /// Links already in the visited set
    pub duplicates: usize,
    /// Links pushed to the frontier
    pub scheduled: usize,
}

impl RouteStats {
    fn record(&mut self, outcome: RouteOutcome) {
        self.discovered += 1;
        match outcome {
            RouteOutcome::Excluded => self.excluded += 1,
            RouteOutcome::Duplicate => self.duplicates += 1,
            RouteOutcome::Scheduled => self.scheduled += 1,
        }
    }
}

/// Filters, deduplicates and schedules discovered links
#[derive(Debug, Clone)]
pub struct LinkRouter {
    frontier: Arc<Frontier>,
    visited: Arc<VisitedSet>,
    base_url: String,
    content_prefix: String,
    excluded_namespaces: Vec<String>,
}

impl LinkRouter {
    /// Creates a router pushing into `frontier` and deduplicating against `visited`
    pub fn new(config: &Config, frontier: Arc<Frontier>, visited: Arc<VisitedSet>) -> Self {
        Self {
            frontier,
            visited,
            base_url: config.base_url(),
            content_prefix: config.site.content_prefix.clone(),
            excluded_namespaces: config.site.excluded_namespaces.clone(),
        }
    }

    /// Whether the path's leading `Label:` segment names an excluded namespace
    ///
    /// `/wiki/Special:Random` is excluded by the label `Special`;
    /// `/wiki/Talking_Heads` is not.
    pub fn is_excluded(&self, path: &str) -> bool {
        is_excluded_path(path, &self.content_prefix, &self.excluded_namespaces)
    }

    /// Routes one discovered link
    pub fn route(&self, link: DiscoveredLink) -> RouteOutcome {
        if self.is_excluded(&link.path) {
            tracing::trace!("Excluded namespace: {}", link.path);
            return RouteOutcome::Excluded;
        }

        if !self.visited.insert_if_absent(&link.path) {
            tracing::trace!("Already seen: {}", link.path);
            return RouteOutcome::Duplicate;
        }

        let target = format!("{}{}", self.base_url, link.path);
        tracing::debug!(depth = link.depth, "Scheduling {}", target);
        self.frontier.push(PageTask::new(target, link.depth));
        RouteOutcome::Scheduled
    }

    /// Runs the route stage until the link stream closes
    ///
    /// A `SourceDone` marker completes the source page's frontier task, after
    /// all of its links have been pushed.
    pub async fn run(self, mut links: UnboundedReceiver<LinkEvent>) -> RouteStats {
        let mut stats = RouteStats::default();

        while let Some(event) = links.recv().await {
            match event {
                LinkEvent::Discovered(link) => stats.record(self.route(link)),
                LinkEvent::SourceDone => self.frontier.complete(),
            }
        }

        stats
    }
}
