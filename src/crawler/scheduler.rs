//! Scheduler for managing the crawl frontier and pacing
//!
//! This module handles:
//! - The FIFO frontier of `(url, depth)` targets (strict breadth-first order)
//! - The visited set, so no URL is dequeued twice
//! - The detected-document set, so no document is downloaded twice
//! - The enforced delay between network operations

use crate::state::{DocumentState, PageState};
use crate::HarvestError;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use url::Url;

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// The page to fetch
    pub url: Url,

    /// Link distance from the seed (the seed is 0)
    pub depth: u32,
}

/// Scheduler owns all mutable traversal state of one crawl
///
/// Nothing else mutates the frontier, the visited set or the document set;
/// the coordinator drives the scheduler and asks it before every step.
#[derive(Debug)]
pub struct Scheduler {
    /// Targets in discovery order
    frontier: VecDeque<CrawlTarget>,

    /// URLs that ever entered the frontier (queued or visited)
    seen: HashSet<Url>,

    /// URLs already dequeued
    visited: HashSet<Url>,

    /// Every URL classified as a document, with its download outcome
    documents: HashMap<Url, DocumentState>,

    /// Pages at this depth are fetched but not expanded
    max_depth: u32,

    /// Pause applied after each page fetch and download
    delay: Duration,
}

impl Scheduler {
    /// Creates a scheduler with `seed` queued at depth 0
    ///
    /// # Arguments
    ///
    /// * `seed` - The start URL
    /// * `max_depth` - Deepest level whose pages are still fetched
    /// * `delay` - Configured minimum pause between network operations
    pub fn new(seed: Url, max_depth: u32, delay: Duration) -> Self {
        let mut scheduler = Self {
            frontier: VecDeque::new(),
            seen: HashSet::new(),
            visited: HashSet::new(),
            documents: HashMap::new(),
            max_depth,
            delay,
        };
        scheduler.enqueue(seed, 0);
        scheduler
    }

    /// Adds a page to the back of the frontier
    ///
    /// Returns false if the URL was already queued or visited, or if `depth`
    /// exceeds the maximum depth.
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        if depth > self.max_depth || !self.page_state(&url).can_enqueue() {
            return false;
        }
        self.seen.insert(url.clone());
        self.frontier.push_back(CrawlTarget { url, depth });
        true
    }

    /// Pops the next target and marks it visited
    ///
    /// Returns `None` once the frontier is exhausted.
    pub fn next_target(&mut self) -> Option<CrawlTarget> {
        while let Some(target) = self.frontier.pop_front() {
            if self.visited.insert(target.url.clone()) {
                return Some(target);
            }
            tracing::trace!("Skipping already visited {}", target.url);
        }
        None
    }

    /// Whether links found at `depth` may still be followed
    pub fn can_expand(&self, depth: u32) -> bool {
        depth < self.max_depth
    }

    /// Where a URL is in the page traversal
    pub fn page_state(&self, url: &Url) -> PageState {
        if self.visited.contains(url) {
            PageState::Visited
        } else if self.seen.contains(url) {
            PageState::Queued
        } else {
            PageState::Unseen
        }
    }

    /// Shorthand for `page_state(url) == PageState::Visited`
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs dequeued so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Records `url` as a detected document
    ///
    /// Check and mark happen in one step: returns true only the first time a
    /// URL is seen, and the caller downloads only in that case.
    pub fn mark_detected(&mut self, url: &Url) -> bool {
        if self.documents.contains_key(url) {
            return false;
        }
        self.documents.insert(url.clone(), DocumentState::Detected);
        true
    }

    /// Records the outcome of a download
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The document moved from `Detected` to `outcome`
    /// * `Err(HarvestError::InvalidTransition)` - The document was not awaiting download
    pub fn record_download(&mut self, url: &Url, outcome: DocumentState) -> Result<(), HarvestError> {
        let current = self
            .documents
            .get_mut(url)
            .ok_or(HarvestError::InvalidTransition {
                from: DocumentState::Detected,
                to: outcome,
            })?;

        if !current.can_transition_to(outcome) {
            return Err(HarvestError::InvalidTransition {
                from: *current,
                to: outcome,
            });
        }
        *current = outcome;
        Ok(())
    }

    /// Lifecycle state of a document URL, if it was ever detected
    pub fn document_state(&self, url: &Url) -> Option<DocumentState> {
        self.documents.get(url).copied()
    }

    /// All detected document URLs (in no particular order)
    pub fn documents(&self) -> impl Iterator<Item = &Url> {
        self.documents.keys()
    }

    /// Raises the enforced delay to at least `delay`
    ///
    /// The enforced delay is the larger of the configured delay and the
    /// site's crawl delay.
    pub fn raise_delay(&mut self, delay: Duration) {
        self.delay = self.delay.max(delay);
    }

    /// The pause applied between network operations
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Blocks for the enforced delay
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Returns the number of targets in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }
}
