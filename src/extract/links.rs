use scraper::{Html, Selector};
use url::Url;

/// Href discovery over raw markup
///
/// Walks anchor elements in document order, resolves each href against the
/// page URL, and keeps only same-origin links (prefix match on the base
/// origin, as the save/traverse decisions expect). Trailing slashes are
/// stripped so discovered links line up with normalized visited-set keys.
#[derive(Debug, Clone)]
pub struct LinkScanner {
    base: Url,
}

impl LinkScanner {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Scans markup for candidate same-origin absolute URLs, in the order
    /// hrefs appear
    pub fn scan(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();
        let mut seen = std::collections::HashSet::new();

        let selector = match Selector::parse("a[href]") {
            Ok(s) => s,
            Err(_) => return links,
        };

        for element in document.select(&selector) {
            // Download links point at files, not pages
            if element.value().attr("download").is_some() {
                continue;
            }

            let href = match element.value().attr("href") {
                Some(h) => h.trim(),
                None => continue,
            };

            if let Some(absolute) = self.resolve(href) {
                if seen.insert(absolute.clone()) {
                    links.push(absolute);
                }
            }
        }

        links
    }

    /// Resolves one href to an absolute same-origin URL, or None when the
    /// link should be dropped
    fn resolve(&self, href: &str) -> Option<String> {
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        if href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with("data:")
        {
            return None;
        }

        let absolute = self.base.join(href).ok()?;
        if absolute.scheme() != "http" && absolute.scheme() != "https" {
            return None;
        }

        let mut text = absolute.to_string();
        if text.ends_with('/') {
            text.pop();
        }

        // Same-origin filter: candidate must extend the base origin
        let base_str = self.base.as_str().trim_end_matches('/');
        if text.starts_with(base_str) {
            Some(text)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> LinkScanner {
        LinkScanner::new(Url::parse("https://example.com").unwrap())
    }

    #[test]
    fn test_scan_relative_and_absolute() {
        let html = r#"<html><body>
            <a href="/a">A</a>
            <a href="https://example.com/b">B</a>
        </body></html>"#;
        assert_eq!(
            scanner().scan(html),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_scan_drops_foreign_origin() {
        let html = r#"<html><body><a href="https://other.com/x">X</a></body></html>"#;
        assert!(scanner().scan(html).is_empty());
    }

    #[test]
    fn test_scan_strips_trailing_slash() {
        let html = r#"<html><body><a href="/a/">A</a></body></html>"#;
        assert_eq!(scanner().scan(html), vec!["https://example.com/a"]);
    }

    #[test]
    fn test_scan_skips_special_schemes() {
        let html = r##"<html><body>
            <a href="javascript:void(0)">J</a>
            <a href="mailto:x@example.com">M</a>
            <a href="tel:+123">T</a>
            <a href="data:text/html,hi">D</a>
            <a href="#anchor">F</a>
        </body></html>"##;
        assert!(scanner().scan(html).is_empty());
    }

    #[test]
    fn test_scan_skips_download_links() {
        let html = r#"<html><body><a href="/file" download>F</a></body></html>"#;
        assert!(scanner().scan(html).is_empty());
    }

    #[test]
    fn test_scan_preserves_document_order_and_dedupes() {
        let html = r#"<html><body>
            <a href="/b">B</a>
            <a href="/a">A</a>
            <a href="/b">B again</a>
        </body></html>"#;
        assert_eq!(
            scanner().scan(html),
            vec!["https://example.com/b", "https://example.com/a"]
        );
    }

    #[test]
    fn test_scan_with_base_path() {
        // Base origins can carry a path; candidates must extend it
        let scanner = LinkScanner::new(Url::parse("https://example.com/news").unwrap());
        let html = r#"<html><body>
            <a href="https://example.com/news/article-1">In</a>
            <a href="https://example.com/about">Out</a>
        </body></html>"#;
        assert_eq!(scanner.scan(html), vec!["https://example.com/news/article-1"]);
    }
}
