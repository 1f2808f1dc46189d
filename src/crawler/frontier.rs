//! Crawl frontier and fetch budget
//!
//! The frontier is the single source of traversal order: a FIFO queue of
//! pending page visits shared between the seed, the link router (producer)
//! and the fetch loops (consumers). The fetch budget caps the number of
//! attempts across every fetch loop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// A unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    /// Absolute URL to fetch
    pub target: String,

    /// Number of link hops from the start page
    pub depth: u32,

    /// Raw page payload once fetched, transformed in place by the extractor
    pub content: String,
}

impl PageTask {
    /// Creates an unfetched task
    pub fn new(target: impl Into<String>, depth: u32) -> Self {
        Self {
            target: target.into(),
            depth,
            content: String::new(),
        }
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<PageTask>,
    /// Popped tasks whose downstream processing has not finished yet
    in_flight: usize,
    closed: bool,
}

/// Blocking FIFO work-queue of pending page visits
///
/// `pop` suspends the caller until one of three things happens:
/// - a task is pushed (the head is returned)
/// - the frontier is closed (`None`)
/// - the crawl is starved: the queue is empty and no popped task is still
///   being processed, so no producer can ever add more work (`None`)
///
/// An empty queue with tasks still in flight is not a termination signal.
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding a single seed task
    pub fn with_seed(seed: PageTask) -> Self {
        let frontier = Self::new();
        frontier.push(seed);
        frontier
    }

    fn state(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a task at the tail and wakes waiting consumers
    pub fn push(&self, task: PageTask) {
        self.state().queue.push_back(task);
        self.changed.notify_waiters();
    }

    /// Removes and returns the head, waiting while the queue is empty
    ///
    /// Every task returned counts as in flight until `complete` is called for it.
    pub async fn pop(&self) -> Option<PageTask> {
        loop {
            // Register before inspecting state so a push between the check and
            // the await still wakes us.
            let changed = self.changed.notified();
            {
                let mut state = self.state();
                if state.closed {
                    return None;
                }
                if let Some(task) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(task);
                }
                if state.in_flight == 0 {
                    tracing::debug!("Frontier starved: no queued or in-flight tasks");
                    return None;
                }
            }
            changed.await;
        }
    }

    /// Marks one popped task as fully processed downstream
    pub fn complete(&self) {
        {
            let mut state = self.state();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.changed.notify_waiters();
    }

    /// Shuts the frontier down; waiting and future `pop` calls return `None`
    ///
    /// Queued tasks are kept for reporting but are never handed out again.
    pub fn close(&self) {
        self.state().closed = true;
        self.changed.notify_waiters();
    }

    /// Removes every task still queued
    pub fn drain_pending(&self) -> Vec<PageTask> {
        self.state().queue.drain(..).collect()
    }

    /// Returns the number of queued tasks
    pub fn len(&self) -> usize {
        self.state().queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.state().queue.is_empty()
    }

    /// Returns the number of popped tasks not yet completed
    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.state().in_flight
    }

    /// Returns whether the frontier has been closed
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

/// Fixed cap on fetch attempts, shared by every fetch loop
#[derive(Debug)]
pub struct FetchBudget {
    limit: usize,
    claimed: AtomicUsize,
}

impl FetchBudget {
    /// Creates a budget of `limit` attempts
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            claimed: AtomicUsize::new(0),
        }
    }

    /// Claims one attempt, returning its 1-based number
    ///
    /// Returns `None` once all `limit` attempts have been claimed. Concurrent
    /// callers never claim the same attempt and never exceed the limit.
    pub fn claim(&self) -> Option<usize> {
        self.claimed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |claimed| {
                (claimed < self.limit).then_some(claimed + 1)
            })
            .ok()
            .map(|previous| previous + 1)
    }

    /// Total number of attempts allowed
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of attempts claimed so far
    pub fn claimed(&self) -> usize {
        self.claimed.load(Ordering::Acquire)
    }

    /// Number of attempts still available
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.claimed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn task(path: &str, depth: u32) -> PageTask {
        PageTask::new(format!("https://en.wikipedia.org{}", path), depth)
    }

    #[test]
    fn test_new_frontier() {
        let frontier = Frontier::new();
        assert_eq!(frontier.len(), 0);
        assert!(frontier.is_empty());
        assert!(!frontier.is_closed());
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let frontier = Frontier::new();
        frontier.push(task("/wiki/A", 0));
        frontier.push(task("/wiki/B", 1));
        frontier.push(task("/wiki/C", 1));

        assert_eq!(frontier.pop().await.unwrap().target, task("/wiki/A", 0).target);
        assert_eq!(frontier.pop().await.unwrap().target, task("/wiki/B", 1).target);
        assert_eq!(frontier.pop().await.unwrap().target, task("/wiki/C", 1).target);
        assert_eq!(frontier.in_flight(), 3);
    }

    #[tokio::test]
    async fn test_pop_starved_returns_none() {
        let frontier = Frontier::new();
        assert!(frontier.pop().await.is_none());
    }

    #[tokio::test]
    async fn test_pop_waits_for_push_while_in_flight() {
        let frontier = Arc::new(Frontier::with_seed(task("/wiki/Seed", 0)));
        let seed = frontier.pop().await.unwrap();
        assert_eq!(seed.depth, 0);

        let consumer = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.pop().await })
        };

        // The consumer must still be parked: the seed is in flight.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!consumer.is_finished());

        frontier.push(task("/wiki/Next", 1));
        frontier.complete();

        let next = consumer.await.unwrap().unwrap();
        assert_eq!(next.target, task("/wiki/Next", 1).target);
        assert_eq!(next.depth, 1);
    }

    #[tokio::test]
    async fn test_complete_wakes_starved_consumer() {
        let frontier = Arc::new(Frontier::with_seed(task("/wiki/Seed", 0)));
        frontier.pop().await.unwrap();

        let consumer = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        frontier.complete();

        assert!(consumer.await.unwrap().is_none());
        assert_eq!(frontier.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_close_wakes_waiters_and_keeps_pending() {
        let frontier = Arc::new(Frontier::with_seed(task("/wiki/Seed", 0)));
        frontier.pop().await.unwrap();

        let consumer = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        frontier.close();
        assert!(consumer.await.unwrap().is_none());

        frontier.push(task("/wiki/Late", 1));
        assert!(frontier.pop().await.is_none());

        let pending = frontier.drain_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].depth, 1);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_budget_claims_exactly_limit() {
        let budget = FetchBudget::new(3);
        assert_eq!(budget.claim(), Some(1));
        assert_eq!(budget.claim(), Some(2));
        assert_eq!(budget.claim(), Some(3));
        assert_eq!(budget.claim(), None);
        assert_eq!(budget.claimed(), 3);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_zero_budget() {
        let budget = FetchBudget::new(0);
        assert_eq!(budget.claim(), None);
        assert_eq!(budget.limit(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_budget_concurrent_claims_never_exceed_limit() {
        let budget = Arc::new(FetchBudget::new(100));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let budget = Arc::clone(&budget);
            handles.push(tokio::spawn(async move {
                let mut claimed = 0;
                while budget.claim().is_some() {
                    claimed += 1;
                    tokio::task::yield_now().await;
                }
                claimed
            }));
        }

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }

        assert_eq!(total, 100);
        assert_eq!(budget.claimed(), 100);
    }
}
