//! Challenge-solver seam
//!
//! When a fetch exhausts its retries on HTTP 403 and the job configures a
//! solver, the fetcher drives an external browser session: navigate, wait
//! for the page to settle, hand back the rendered HTML, and let the
//! validity gate decide whether the challenge was cleared. The automation
//! itself lives behind this trait; the crate only owns the retry-and-
//! recheck loop around it.

use crate::Result;
use async_trait::async_trait;

/// Interactive navigation capability used to clear bot challenges
///
/// Implementations own a single browser session per job; the fetcher
/// serializes access, so `navigate` is never called concurrently.
#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    /// Drives the browser to `url`, waits for network idle, and returns
    /// the rendered HTML
    async fn navigate(&self, url: &str) -> Result<String>;
}

#[cfg(test)]
pub mod test_support {
    //! Scripted solver used by fetcher and engine tests

    use super::*;
    use crate::WeaveError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns each scripted response in turn, then repeats the last one
    pub struct ScriptedSolver {
        responses: Vec<String>,
        calls: AtomicUsize,
    }

    impl ScriptedSolver {
        pub fn new(responses: Vec<String>) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChallengeSolver for ScriptedSolver {
        async fn navigate(&self, url: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(n.min(self.responses.len().saturating_sub(1)))
                .cloned()
                .ok_or_else(|| WeaveError::Solver {
                    url: url.to_string(),
                    message: "no scripted response".to_string(),
                })
        }
    }
}
