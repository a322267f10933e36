use serde::Deserialize;
use std::collections::BTreeMap;

/// Default blocked file extensions for link admission
pub const DEFAULT_EXCLUDED_FILE_TYPES: &[&str] = &[
    ".mp3", ".mp4", ".wav", ".avi", ".mov", ".pdf", ".zip", ".rar",
];

/// Top-level configuration: one or more crawl jobs plus an optional
/// combined-output directory
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory that receives the merged output of all jobs
    #[serde(rename = "combined-output-dir")]
    pub combined_output_dir: Option<String>,

    #[serde(rename = "job", default)]
    pub jobs: Vec<CrawlJob>,
}

/// Immutable per-site crawl configuration
///
/// Every recognized option is enumerated here with a documented default;
/// contradictory combinations are rejected at load time by
/// [`crate::config::validation::validate`].
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlJob {
    /// Base origin; links outside it are never followed in strict mode
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// URL the crawl starts from (defaults to `base-url`)
    #[serde(rename = "start-url")]
    pub start_url: Option<String>,

    /// When true, only URLs whose hostname equals the base origin's
    /// hostname are fetched
    #[serde(rename = "strict-base-url", default = "default_true")]
    pub strict_base_url: bool,

    /// Maximum link depth from the start URL; `None` means unbounded
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Maximum number of admitted articles; `None` means unbounded
    #[serde(rename = "max-articles")]
    pub max_articles: Option<usize>,

    /// Fan-out width of one fetch batch
    #[serde(rename = "concurrency-limit", default = "default_concurrency")]
    pub concurrency_limit: usize,

    /// Courtesy delay between fetch batches (milliseconds)
    #[serde(rename = "crawl-delay-ms", default = "default_crawl_delay")]
    pub crawl_delay_ms: u64,

    /// Total fetch attempts per URL (including the first)
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base retry delay; attempt N waits `retry-delay-ms * N` before
    /// retrying (linear backoff)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// URL prefixes whose pages are traversed but never saved
    #[serde(rename = "exclude-list", default)]
    pub exclude_list: Vec<String>,

    /// Exact URLs whose pages are traversed but never saved
    #[serde(rename = "exact-exclude-list", default)]
    pub exact_exclude_list: Vec<String>,

    /// Whether to drop links by file extension
    #[serde(rename = "filter-file-types", default = "default_true")]
    pub filter_file_types: bool,

    /// Blocked path suffixes (lowercased); defaults to common
    /// media/binary/archive extensions
    #[serde(rename = "excluded-file-types", default = "default_excluded_file_types")]
    pub excluded_file_types: Vec<String>,

    /// Strip `#fragment` during URL normalization
    #[serde(rename = "remove-url-fragment", default = "default_true")]
    pub remove_url_fragment: bool,

    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Optional HTTP proxy
    pub proxy: Option<ProxyConfig>,

    /// Optional challenge-solver fallback used on terminal HTTP 403
    pub solver: Option<SolverConfig>,

    /// Output locations and corpus options
    #[serde(default)]
    pub output: OutputConfig,
}

/// HTTP proxy settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `http://127.0.0.1:2080`
    pub url: String,

    pub username: Option<String>,
    pub password: Option<String>,
}

/// Challenge-solver (interactive browser) settings
#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
    /// Proxy passed through to the browser session
    pub proxy: Option<String>,

    /// Browser executable override
    #[serde(rename = "executable-path")]
    pub executable_path: Option<String>,

    /// Navigation timeout per solver attempt (milliseconds)
    #[serde(rename = "navigation-timeout-ms", default = "default_navigation_timeout")]
    pub navigation_timeout_ms: u64,
}

/// Output locations for one job
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory for the per-page file tree
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,

    /// Directory for numbered text files (defaults to `<output-dir>/texts`)
    #[serde(rename = "texts-dir")]
    pub texts_dir: Option<String>,

    /// Path of the JSONL corpus (defaults to `<output-dir>/train.jsonl`)
    #[serde(rename = "jsonl-path")]
    pub jsonl_path: Option<String>,

    /// Path of the CSV table (defaults to `<output-dir>/train.csv`)
    #[serde(rename = "csv-path")]
    pub csv_path: Option<String>,

    /// Also emit `*_with_metadata` variants of every format
    #[serde(rename = "include-metadata", default)]
    pub include_metadata: bool,

    /// Metadata fields carried into the with-metadata outputs
    #[serde(rename = "metadata-fields", default)]
    pub metadata_fields: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            texts_dir: None,
            jsonl_path: None,
            csv_path: None,
            include_metadata: false,
            metadata_fields: Vec::new(),
        }
    }
}

impl CrawlJob {
    /// The URL the crawl starts from
    pub fn start_url(&self) -> &str {
        self.start_url.as_deref().unwrap_or(&self.base_url)
    }

    /// Whether `count` admitted articles satisfies the article bound
    pub fn article_bound_reached(&self, count: usize) -> bool {
        match self.max_articles {
            Some(max) => count >= max,
            None => false,
        }
    }

    /// Whether a page at `depth` may be fetched
    pub fn depth_fetchable(&self, depth: u32) -> bool {
        match self.max_depth {
            Some(max) => depth <= max,
            None => true,
        }
    }
}

impl OutputConfig {
    pub fn texts_dir(&self) -> String {
        self.texts_dir
            .clone()
            .unwrap_or_else(|| format!("{}/texts", self.output_dir))
    }

    pub fn jsonl_path(&self) -> String {
        self.jsonl_path
            .clone()
            .unwrap_or_else(|| format!("{}/train.jsonl", self.output_dir))
    }

    pub fn csv_path(&self) -> String {
        self.csv_path
            .clone()
            .unwrap_or_else(|| format!("{}/train.csv", self.output_dir))
    }

    /// Derives the `_with_metadata` sibling of a path, inserted before the
    /// extension when one exists
    pub fn with_metadata_variant(path: &str) -> String {
        match path.rfind('.') {
            Some(dot) if dot > path.rfind('/').map_or(0, |s| s + 1) => {
                format!("{}_with_metadata{}", &path[..dot], &path[dot..])
            }
            _ => format!("{}_with_metadata", path),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    2
}

fn default_crawl_delay() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    40_000
}

fn default_request_timeout() -> u64 {
    70_000
}

fn default_navigation_timeout() -> u64 {
    10_000
}

fn default_output_dir() -> String {
    "./dataset".to_string()
}

fn default_excluded_file_types() -> Vec<String> {
    DEFAULT_EXCLUDED_FILE_TYPES
        .iter()
        .map(|s| s.to_string())
        .collect()
}
