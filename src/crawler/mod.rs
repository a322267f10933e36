//! Crawl traversal core
//!
//! This module contains the engine that walks a site's link graph, the
//! bounded-retry fetch layer it drives, and the validity gate both share.

mod engine;
pub mod fetcher;
mod validity;

pub use engine::Engine;
pub use fetcher::{build_http_client, Fetcher};
pub use validity::has_valid_content;

use crate::config::CrawlJob;
use crate::state::AdmittedPage;
use crate::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop signal shared between the engine and in-flight
/// fetches
///
/// Reaching the article bound sets the flag; fetch attempts and retries
/// check it before touching the network, while work already in flight is
/// allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs one crawl job end to end and writes its configured outputs
///
/// # Returns
///
/// The admitted pages, in discovery order, after output files are written.
pub async fn run_job(job: CrawlJob) -> Result<Vec<AdmittedPage>> {
    if job.solver.is_some() {
        // Solver settings only take effect when an embedder attaches a
        // ChallengeSolver implementation via Engine::with_solver
        tracing::warn!("Solver configured but no solver implementation is registered");
    }

    let output = job.output.clone();
    let mut engine = Engine::new(job)?;
    engine.start().await?;
    let pages = engine.finish();

    crate::output::write_job_outputs(&output, &pages)?;

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_flag_roundtrip() {
        let flag = StopFlag::new();
        assert!(!flag.is_set());

        let clone = flag.clone();
        clone.set();
        assert!(flag.is_set());
    }
}
