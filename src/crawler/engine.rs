//! Traversal engine
//!
//! Walks the link graph of one site with an explicit frontier work-list.
//! All admission decisions (visited marking, bounds, scope, file type)
//! happen on the single control flow while a batch is assembled, before
//! any fetch future exists; the concurrent part of a batch only performs
//! network I/O. That ordering is what upholds the at-most-once-fetch
//! invariant under concurrent batches.

use crate::browser::ChallengeSolver;
use crate::config::CrawlJob;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::validity::has_valid_content;
use crate::crawler::StopFlag;
use crate::extract::{ArticleExtractor, ArticleText, LinkScanner, MetadataExtractor, MetadataFields};
use crate::output::process_text;
use crate::state::{Accumulator, AdmittedPage, FrontierEntry, JobStatus, VisitedSet};
use crate::url::AdmissionPolicy;
use crate::Result;
use futures::future::join_all;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Traversal engine for one crawl job
///
/// Owns the frontier, visited set, and accumulator for the job's
/// lifetime. Construct with [`Engine::new`], optionally attach a
/// challenge solver or replacement extractors, then call
/// [`Engine::start`].
pub struct Engine {
    job: CrawlJob,
    policy: AdmissionPolicy,
    scanner: LinkScanner,
    article: Box<dyn ArticleExtractor>,
    metadata: Box<dyn MetadataExtractor>,
    solver: Option<Arc<dyn ChallengeSolver>>,
    frontier: VecDeque<FrontierEntry>,
    visited: VisitedSet,
    accumulator: Accumulator,
    status: JobStatus,
    stop: StopFlag,
}

impl Engine {
    /// Creates an engine with the default scraper-based collaborators
    pub fn new(job: CrawlJob) -> Result<Self> {
        crate::config::validate_job(&job)?;

        let policy = AdmissionPolicy::from_job(&job)?;
        let base = Url::parse(&job.base_url)?;
        let scanner = LinkScanner::new(base);

        Ok(Self {
            job,
            policy,
            scanner,
            article: Box::new(ArticleText::new()),
            metadata: Box::new(MetadataFields::new()),
            solver: None,
            frontier: VecDeque::new(),
            visited: VisitedSet::new(),
            accumulator: Accumulator::new(),
            status: JobStatus::Idle,
            stop: StopFlag::new(),
        })
    }

    /// Attaches a challenge solver used on terminal HTTP 403
    pub fn with_solver(mut self, solver: Arc<dyn ChallengeSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Replaces the article extractor collaborator
    pub fn with_article_extractor(mut self, extractor: Box<dyn ArticleExtractor>) -> Self {
        self.article = extractor;
        self
    }

    /// Replaces the metadata extractor collaborator
    pub fn with_metadata_extractor(mut self, extractor: Box<dyn MetadataExtractor>) -> Self {
        self.metadata = extractor;
        self
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Consumes the engine, yielding admitted pages in discovery order
    pub fn finish(self) -> Vec<AdmittedPage> {
        self.accumulator.drain()
    }

    /// Runs the crawl to completion
    ///
    /// Per-URL failures are logged and skipped; only a setup failure
    /// (HTTP client construction) moves the job to `Failed`.
    pub async fn start(&mut self) -> Result<()> {
        self.status = JobStatus::Running;

        let fetcher = match Fetcher::new(&self.job, self.solver.clone()) {
            Ok(f) => f,
            Err(e) => {
                tracing::error!("Could not establish fetch capability: {}", e);
                self.status = JobStatus::Failed;
                return Err(e);
            }
        };

        let start = self.policy.normalize(self.job.start_url());
        tracing::info!(
            "Starting crawl of {} (max depth: {:?}, max articles: {:?})",
            start,
            self.job.max_depth,
            self.job.max_articles
        );
        self.frontier.push_back(FrontierEntry {
            url: start,
            depth: 0,
        });

        let mut first_batch = true;
        while !self.frontier.is_empty() {
            if self.bound_reached() {
                tracing::info!(
                    "Article bound reached ({} admitted), stopping",
                    self.accumulator.count()
                );
                break;
            }

            let batch = self.assemble_batch();
            if batch.is_empty() {
                continue;
            }

            // Courtesy delay between batches
            if !first_batch {
                tokio::time::sleep(Duration::from_millis(self.job.crawl_delay_ms)).await;
            }
            first_batch = false;

            let fetches = batch
                .iter()
                .map(|entry| fetcher.fetch(&entry.url, &self.stop));
            let results = join_all(fetches).await;

            for (entry, result) in batch.into_iter().zip(results) {
                match result {
                    Ok(Some(html)) => self.process_page(&entry, &html),
                    Ok(None) => {
                        tracing::debug!("Nothing to extract from {}", entry.url);
                    }
                    // One URL's failure never aborts the batch or the job
                    Err(e) => {
                        tracing::warn!("Failed to fetch {}: {}", entry.url, e);
                    }
                }
            }
        }

        self.status = JobStatus::Completed;
        tracing::info!(
            "Crawl completed: {} pages admitted, {} URLs visited",
            self.accumulator.count(),
            self.visited.len()
        );
        Ok(())
    }

    /// Pops up to `concurrency_limit` admissible entries from the
    /// frontier, marking each visited before any fetch is issued
    fn assemble_batch(&mut self) -> Vec<FrontierEntry> {
        let mut batch = Vec::new();

        while batch.len() < self.job.concurrency_limit {
            let entry = match self.frontier.pop_front() {
                Some(e) => e,
                None => break,
            };

            // Enqueue guards already enforce this; kept as the dequeue-side
            // invariant for entries seeded before bounds were known
            if !self.job.depth_fetchable(entry.depth) {
                continue;
            }

            if !self.visited.insert(&entry.url) {
                tracing::debug!("Already visited: {}", entry.url);
                continue;
            }

            if !self.policy.in_scope(&entry.url) {
                tracing::debug!("Out of scope: {}", entry.url);
                continue;
            }

            if !self.policy.allowed_file_type(&entry.url) {
                tracing::debug!("Blocked file type: {}", entry.url);
                continue;
            }

            batch.push(entry);
        }

        batch
    }

    /// Handles one fetched page: save if eligible, then discover links
    fn process_page(&mut self, entry: &FrontierEntry, html: &str) {
        if !self.policy.excluded_from_save(&entry.url) && !self.bound_reached() {
            match self.article.extract(html, &entry.url) {
                Some(raw) => {
                    let text = process_text(&raw);
                    if has_valid_content(&text) {
                        let metadata = self.metadata.extract(html, &entry.url);
                        self.accumulator.push(AdmittedPage {
                            url: entry.url.clone(),
                            text,
                            metadata,
                            depth: entry.depth,
                        });
                        tracing::info!(
                            "Admitted {} ({} articles)",
                            entry.url,
                            self.accumulator.count()
                        );
                        if self.bound_reached() {
                            self.stop.set();
                        }
                    } else {
                        tracing::warn!("Invalid content found at {}", entry.url);
                    }
                }
                None => {
                    tracing::warn!("No readable content found at {}", entry.url);
                }
            }
        }

        // Excluded and extraction-failed pages are still navigable hubs
        self.discover_links(entry, html);
    }

    /// Scans markup for links and enqueues unvisited ones, subject to the
    /// depth bound and the cooperative stop signal
    fn discover_links(&mut self, entry: &FrontierEntry, html: &str) {
        let child_depth = entry.depth + 1;
        if !self.job.depth_fetchable(child_depth) {
            return;
        }

        for link in self.scanner.scan(html) {
            if self.bound_reached() {
                return;
            }

            let normalized = self.policy.normalize(&link);
            if self.visited.contains(&normalized) {
                continue;
            }

            self.frontier.push_back(FrontierEntry {
                url: normalized,
                depth: child_depth,
            });
        }
    }

    fn bound_reached(&self) -> bool {
        self.job.article_bound_reached(self.accumulator.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeaveError;

    fn job_from(toml: &str) -> CrawlJob {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_engine_starts_idle() {
        let engine = Engine::new(job_from(r#"base-url = "https://example.com""#)).unwrap();
        assert_eq!(engine.status(), JobStatus::Idle);
        assert_eq!(engine.accumulator().count(), 0);
        assert_eq!(engine.visited_count(), 0);
    }

    #[test]
    fn test_engine_rejects_invalid_job() {
        let job = job_from(
            r#"
base-url = "https://example.com"
concurrency-limit = 0
"#,
        );
        assert!(matches!(
            Engine::new(job),
            Err(WeaveError::Config(_))
        ));
    }

    #[test]
    fn test_assemble_batch_marks_visited_once() {
        let mut engine = Engine::new(job_from(
            r#"
base-url = "https://example.com"
concurrency-limit = 4
"#,
        ))
        .unwrap();

        // Duplicate frontier entries collapse at batch assembly
        for _ in 0..3 {
            engine.frontier.push_back(FrontierEntry {
                url: "https://example.com/a".to_string(),
                depth: 0,
            });
        }
        engine.frontier.push_back(FrontierEntry {
            url: "https://example.com/b".to_string(),
            depth: 0,
        });

        let batch = engine.assemble_batch();
        assert_eq!(batch.len(), 2);
        assert_eq!(engine.visited_count(), 2);
    }

    #[test]
    fn test_assemble_batch_drops_out_of_scope_and_blocked_types() {
        let mut engine = Engine::new(job_from(r#"base-url = "https://example.com""#)).unwrap();

        engine.frontier.push_back(FrontierEntry {
            url: "https://other.com/x".to_string(),
            depth: 0,
        });
        engine.frontier.push_back(FrontierEntry {
            url: "https://example.com/file.pdf".to_string(),
            depth: 0,
        });
        engine.frontier.push_back(FrontierEntry {
            url: "https://example.com/page".to_string(),
            depth: 0,
        });

        let batch = engine.assemble_batch();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].url, "https://example.com/page");
        // Dropped entries still consumed a visit slot, so they are never
        // fetched later either
        assert_eq!(engine.visited_count(), 3);
    }

    #[test]
    fn test_assemble_batch_respects_depth_bound() {
        let mut engine = Engine::new(job_from(
            r#"
base-url = "https://example.com"
max-depth = 1
"#,
        ))
        .unwrap();

        engine.frontier.push_back(FrontierEntry {
            url: "https://example.com/deep".to_string(),
            depth: 2,
        });

        assert!(engine.assemble_batch().is_empty());
    }

    #[test]
    fn test_discover_links_respects_enqueue_depth() {
        let mut engine = Engine::new(job_from(
            r#"
base-url = "https://example.com"
max-depth = 1
"#,
        ))
        .unwrap();

        let html = r#"<html><body><a href="/next">Next</a></body></html>"#;

        // depth 0 -> children at depth 1 are enqueable
        engine.discover_links(
            &FrontierEntry {
                url: "https://example.com".to_string(),
                depth: 0,
            },
            html,
        );
        assert_eq!(engine.frontier.len(), 1);
        assert_eq!(engine.frontier[0].depth, 1);

        // depth 1 -> children at depth 2 exceed the bound
        engine.frontier.clear();
        engine.discover_links(
            &FrontierEntry {
                url: "https://example.com/next".to_string(),
                depth: 1,
            },
            html,
        );
        assert!(engine.frontier.is_empty());
    }
}
