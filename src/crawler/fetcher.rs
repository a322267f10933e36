//! Bounded-retry HTTP fetch layer
//!
//! One fetch call wraps the whole per-URL network contract: cooperative
//! stop checks before every attempt, linear backoff between retries, the
//! content-type gate, and the challenge-solver recovery loop on a terminal
//! HTTP 403.

use crate::browser::ChallengeSolver;
use crate::config::CrawlJob;
use crate::crawler::validity::has_valid_content;
use crate::crawler::StopFlag;
use crate::{Result, WeaveError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use std::sync::Arc;
use std::time::Duration;

/// Bounded solver iterations while clearing a challenge
const MAX_SOLVER_ATTEMPTS: u32 = 10;

/// HTTP fetch client for one crawl job
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
    solver: Option<Arc<dyn ChallengeSolver>>,
}

/// What one attempt failed with; decides retry vs. solver escalation
enum AttemptError {
    Status(u16),
    Transport(String),
}

impl AttemptError {
    fn message(&self) -> String {
        match self {
            AttemptError::Status(code) => format!("HTTP {}", code),
            AttemptError::Transport(msg) => msg.clone(),
        }
    }
}

/// Builds the reqwest client from a job's network options
pub fn build_http_client(job: &CrawlJob) -> std::result::Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(Duration::from_millis(job.request_timeout_ms))
        .gzip(true)
        .brotli(true);

    if !job.headers.is_empty() {
        let mut headers = HeaderMap::new();
        for (name, value) in &job.headers {
            let name = match HeaderName::from_bytes(name.as_bytes()) {
                Ok(n) => n,
                Err(_) => {
                    tracing::warn!("Skipping invalid header name '{}'", name);
                    continue;
                }
            };
            match HeaderValue::from_str(value) {
                Ok(v) => {
                    headers.insert(name, v);
                }
                Err(_) => tracing::warn!("Skipping invalid header value for '{}'", name),
            }
        }
        builder = builder.default_headers(headers);
    }

    if let Some(proxy_config) = &job.proxy {
        let mut proxy = Proxy::all(&proxy_config.url)?;
        if let (Some(user), Some(pass)) = (&proxy_config.username, &proxy_config.password) {
            proxy = proxy.basic_auth(user, pass);
        }
        builder = builder.proxy(proxy);
    }

    builder.build()
}

impl Fetcher {
    /// Creates a fetcher for one job; client build failure is a setup
    /// error the caller surfaces as a failed job
    pub fn new(job: &CrawlJob, solver: Option<Arc<dyn ChallengeSolver>>) -> Result<Self> {
        let client = build_http_client(job)?;
        Ok(Self {
            client,
            max_retries: job.max_retries,
            retry_delay: Duration::from_millis(job.retry_delay_ms),
            solver,
        })
    }

    /// Fetches a URL's markup
    ///
    /// * `Ok(Some(html))` - text content was fetched
    /// * `Ok(None)` - non-text response, or the job's stop signal was
    ///   already set (both are normal non-results, not failures)
    /// * `Err(_)` - all attempts exhausted; the caller skips the page
    pub async fn fetch(&self, url: &str, stop: &StopFlag) -> Result<Option<String>> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            // Bound reached elsewhere means this fetch is wasted work
            if stop.is_set() {
                tracing::debug!("Stop signal set, skipping fetch of {}", url);
                return Ok(None);
            }

            match self.attempt(url).await {
                Ok(content) => return Ok(content),
                Err(error) => {
                    tracing::warn!(
                        "Fetch attempt {}/{} for {} failed: {}",
                        attempt,
                        self.max_retries,
                        url,
                        error.message()
                    );
                    if attempt < self.max_retries {
                        // Linear backoff scaled by attempt index
                        tokio::time::sleep(self.retry_delay * attempt).await;
                    }
                    last_error = Some(error);
                }
            }
        }

        let error = match last_error {
            Some(e) => e,
            None => AttemptError::Transport("no attempts made".to_string()),
        };

        // Terminal 403 with a configured solver escalates to the
        // interactive challenge-clearing loop
        if let (AttemptError::Status(403), Some(solver)) = (&error, &self.solver) {
            return self.solve_challenge(url, solver.as_ref()).await.map(Some);
        }

        Err(WeaveError::FetchExhausted {
            url: url.to_string(),
            attempts: self.max_retries,
            message: error.message(),
        })
    }

    /// One GET attempt with the content-type gate
    async fn attempt(&self, url: &str) -> std::result::Result<Option<String>, AttemptError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.starts_with("text") {
            tracing::debug!(
                "Skipping non-text content for {}: Content-Type is {}",
                url,
                content_type
            );
            drop(response);
            return Ok(None);
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|e| AttemptError::Transport(e.to_string()))
    }

    /// Repeatedly drives the solver until content passes the validity
    /// gate, bounded at [`MAX_SOLVER_ATTEMPTS`] iterations
    ///
    /// Never-valid content is returned best-effort; a solver error
    /// propagates as fatal for this page.
    async fn solve_challenge(&self, url: &str, solver: &dyn ChallengeSolver) -> Result<String> {
        let mut content = String::new();
        for attempt in 1..=MAX_SOLVER_ATTEMPTS {
            tracing::info!(
                "Challenge-solver attempt {}/{} for {}",
                attempt,
                MAX_SOLVER_ATTEMPTS,
                url
            );
            content = solver.navigate(url).await?;
            if has_valid_content(&content) {
                return Ok(content);
            }
        }

        tracing::warn!(
            "Challenge never cleared for {}, returning last content best-effort",
            url
        );
        Ok(content)
    }
}
