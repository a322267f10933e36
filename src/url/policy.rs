use crate::config::CrawlJob;
use crate::{UrlError, UrlResult};
use std::collections::HashSet;
use url::Url;

/// Pure URL-admission decision logic for one crawl job
///
/// Decides which discovered URLs are fetched (scope and file-type checks)
/// and which fetched pages are persisted (exclude lists). Exclusion is
/// two-tiered on purpose: hub pages (tag indexes, pagination) must stay
/// crawlable for reachability but are never saved as content.
#[derive(Debug)]
pub struct AdmissionPolicy {
    base: Url,
    strict_base_url: bool,
    remove_url_fragment: bool,
    filter_file_types: bool,
    excluded_file_types: Vec<String>,
    exclude_prefixes: Vec<String>,
    exact_excludes: HashSet<String>,
}

impl AdmissionPolicy {
    /// Builds the policy from a job's filtering options
    pub fn from_job(job: &CrawlJob) -> UrlResult<Self> {
        let base = Url::parse(&job.base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
        if base.host_str().is_none() {
            return Err(UrlError::MissingHost);
        }

        Ok(Self {
            base,
            strict_base_url: job.strict_base_url,
            remove_url_fragment: job.remove_url_fragment,
            filter_file_types: job.filter_file_types,
            excluded_file_types: job
                .excluded_file_types
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            exclude_prefixes: slash_variants(&job.exclude_list).into_iter().collect(),
            exact_excludes: slash_variants(&job.exact_exclude_list),
        })
    }

    /// Normalizes a URL: resolves relative/protocol-relative hrefs against
    /// the base origin, strips the fragment (when configured), and removes
    /// exactly one trailing slash. Idempotent.
    pub fn normalize(&self, raw: &str) -> String {
        let mut normal = match self.base.join(raw.trim()) {
            Ok(mut url) => {
                if self.remove_url_fragment {
                    url.set_fragment(None);
                }
                url.to_string()
            }
            // Unresolvable input falls back to plain string cleanup
            Err(_) => {
                let raw = raw.trim();
                match (self.remove_url_fragment, raw.split_once('#')) {
                    (true, Some((before, _))) => before.to_string(),
                    _ => raw.to_string(),
                }
            }
        };

        if normal.ends_with('/') {
            normal.pop();
        }
        normal
    }

    /// Whether a URL is inside the job's domain scope
    ///
    /// Malformed URLs are rejected rather than surfaced as errors.
    pub fn in_scope(&self, url: &str) -> bool {
        if !self.strict_base_url {
            return true;
        }
        match Url::parse(url) {
            Ok(parsed) => parsed.host_str() == self.base.host_str(),
            Err(_) => {
                tracing::debug!("Rejecting malformed URL: {}", url);
                false
            }
        }
    }

    /// Whether a URL's path suffix passes the file-type filter
    pub fn allowed_file_type(&self, url: &str) -> bool {
        if !self.filter_file_types {
            return true;
        }
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_lowercase(),
            Err(_) => url.to_lowercase(),
        };
        !self
            .excluded_file_types
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }

    /// Whether a page's content is excluded from saving
    ///
    /// Governs save eligibility only; excluded pages are still traversed
    /// for their outbound links.
    pub fn excluded_from_save(&self, url: &str) -> bool {
        if self.exact_excludes.contains(url) {
            return true;
        }
        self.exclude_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
    }
}

/// Registers every exclude entry both with and without its trailing slash,
/// so list entries match regardless of how links are written
fn slash_variants(list: &[String]) -> HashSet<String> {
    let mut set = HashSet::new();
    for item in list {
        let stripped = item.strip_suffix('/').unwrap_or(item);
        set.insert(stripped.to_string());
        set.insert(format!("{}/", stripped));
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_for(toml: &str) -> AdmissionPolicy {
        let job: CrawlJob = toml::from_str(toml).unwrap();
        AdmissionPolicy::from_job(&job).unwrap()
    }

    fn default_policy() -> AdmissionPolicy {
        policy_for(r#"base-url = "https://example.com""#)
    }

    #[test]
    fn test_normalize_strips_fragment() {
        let policy = default_policy();
        assert_eq!(
            policy.normalize("https://example.com/page#section"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_normalize_keeps_fragment_when_disabled() {
        let policy = policy_for(
            r#"
base-url = "https://example.com"
remove-url-fragment = false
"#,
        );
        assert_eq!(
            policy.normalize("https://example.com/page#section"),
            "https://example.com/page#section"
        );
    }

    #[test]
    fn test_normalize_strips_one_trailing_slash() {
        let policy = default_policy();
        assert_eq!(
            policy.normalize("https://example.com/page/"),
            "https://example.com/page"
        );
        assert_eq!(policy.normalize("https://example.com/"), "https://example.com");
    }

    #[test]
    fn test_normalize_resolves_root_relative() {
        let policy = default_policy();
        assert_eq!(policy.normalize("/about"), "https://example.com/about");
    }

    #[test]
    fn test_normalize_resolves_protocol_relative() {
        let policy = default_policy();
        assert_eq!(
            policy.normalize("//example.com/about"),
            "https://example.com/about"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let policy = default_policy();
        for raw in [
            "https://example.com/page/",
            "https://example.com/page#frag",
            "/relative/path/",
            "https://example.com",
        ] {
            let once = policy.normalize(raw);
            assert_eq!(policy.normalize(&once), once, "not idempotent for {}", raw);
        }
    }

    #[test]
    fn test_in_scope_strict() {
        let policy = default_policy();
        assert!(policy.in_scope("https://example.com/page"));
        assert!(!policy.in_scope("https://other.com/page"));
        assert!(!policy.in_scope("https://sub.example.com/page"));
    }

    #[test]
    fn test_in_scope_malformed_rejects() {
        let policy = default_policy();
        assert!(!policy.in_scope("not a url"));
    }

    #[test]
    fn test_in_scope_lenient() {
        let policy = policy_for(
            r#"
base-url = "https://example.com"
strict-base-url = false
"#,
        );
        assert!(policy.in_scope("https://anything.org/page"));
    }

    #[test]
    fn test_file_type_filter() {
        let policy = default_policy();
        assert!(policy.allowed_file_type("https://example.com/page"));
        assert!(!policy.allowed_file_type("https://example.com/file.pdf"));
        assert!(!policy.allowed_file_type("https://example.com/FILE.PDF"));
        assert!(!policy.allowed_file_type("https://example.com/song.mp3"));
        // Extension in the query string does not count
        assert!(policy.allowed_file_type("https://example.com/page?file=.pdf"));
    }

    #[test]
    fn test_file_type_filter_disabled() {
        let policy = policy_for(
            r#"
base-url = "https://example.com"
filter-file-types = false
"#,
        );
        assert!(policy.allowed_file_type("https://example.com/file.pdf"));
    }

    #[test]
    fn test_exact_exclude_both_slash_variants() {
        let policy = policy_for(
            r#"
base-url = "https://example.com"
exact-exclude-list = ["https://example.com/hub/"]

[output]
"#,
        );
        assert!(policy.excluded_from_save("https://example.com/hub"));
        assert!(policy.excluded_from_save("https://example.com/hub/"));
        assert!(!policy.excluded_from_save("https://example.com/hub/post"));
    }

    #[test]
    fn test_prefix_exclude() {
        let policy = policy_for(
            r#"
base-url = "https://example.com"
exclude-list = ["https://example.com/tags"]
"#,
        );
        assert!(policy.excluded_from_save("https://example.com/tags"));
        assert!(policy.excluded_from_save("https://example.com/tags/rust"));
        assert!(!policy.excluded_from_save("https://example.com/posts/rust"));
    }
}
