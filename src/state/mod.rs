//! Per-job crawl state: lifecycle status, frontier entries, the visited
//! set, and the accumulator of admitted pages.
//!
//! All of these are owned by a single [`crate::crawler::Engine`] and
//! mutated only from its control flow; two jobs never share state.

use std::collections::{BTreeMap, HashSet};

/// Lifecycle of one crawl job
///
/// `Idle -> Running -> {Completed, Failed}`. Per-URL errors never move a
/// job to `Failed`; only an unrecoverable setup error does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    Running,
    Completed,
    Failed,
}

/// A discovered-but-not-yet-fetched URL with its link depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized absolute URL
    pub url: String,

    /// Link distance from the start URL
    pub depth: u32,
}

/// Set of normalized URLs ever dequeued for fetch
///
/// Membership is checked and recorded before any network I/O, which gives
/// the at-most-once fetch guarantee for the lifetime of one job. The set
/// grows monotonically and is never persisted.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Marks a URL visited; returns false if it was already present
    pub fn insert(&mut self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// A page that passed admission, extraction, and the validity gate
#[derive(Debug, Clone)]
pub struct AdmittedPage {
    /// Normalized URL the text came from
    pub url: String,

    /// Extracted main-article text (post-processed)
    pub text: String,

    /// Extracted metadata fields
    pub metadata: BTreeMap<String, String>,

    /// Depth at which the page was fetched
    pub depth: u32,
}

/// Ordered collection of admitted pages
///
/// Append-only while the job runs; its length is the live article count
/// used by the termination bound. Read-only once the job completes.
#[derive(Debug, Default)]
pub struct Accumulator {
    pages: Vec<AdmittedPage>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: AdmittedPage) {
        self.pages.push(page);
    }

    /// Live article count used by bound checks
    pub fn count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[AdmittedPage] {
        &self.pages
    }

    /// Consumes the accumulator, yielding pages in discovery order
    pub fn drain(self) -> Vec<AdmittedPage> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visited_set_at_most_once() {
        let mut visited = VisitedSet::new();
        assert!(visited.insert("https://example.com/a"));
        assert!(!visited.insert("https://example.com/a"));
        assert!(visited.contains("https://example.com/a"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_accumulator_preserves_order() {
        let mut acc = Accumulator::new();
        for i in 0..3 {
            acc.push(AdmittedPage {
                url: format!("https://example.com/{}", i),
                text: format!("text {}", i),
                metadata: BTreeMap::new(),
                depth: 0,
            });
        }

        assert_eq!(acc.count(), 3);
        let pages = acc.drain();
        assert_eq!(pages[0].url, "https://example.com/0");
        assert_eq!(pages[2].url, "https://example.com/2");
    }
}
