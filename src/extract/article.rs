use crate::extract::ArticleExtractor;
use scraper::{Html, Selector};

/// Minimum character count before a container is considered the article
pub const DEFAULT_CHAR_THRESHOLD: usize = 500;

/// Default readability-style extractor
///
/// Tries semantic main-content containers first, then falls back to the
/// paragraph text of the whole body. A container only wins if its text
/// clears the char threshold, which keeps navigation shells from being
/// mistaken for articles.
#[derive(Debug, Clone)]
pub struct ArticleText {
    char_threshold: usize,
}

impl ArticleText {
    pub fn new() -> Self {
        Self {
            char_threshold: DEFAULT_CHAR_THRESHOLD,
        }
    }

    pub fn with_char_threshold(char_threshold: usize) -> Self {
        Self { char_threshold }
    }

    fn container_text(&self, document: &Html, css: &str) -> Option<String> {
        let selector = Selector::parse(css).ok()?;
        let element = document.select(&selector).next()?;
        let text = collect_text(element);
        if text.len() >= self.char_threshold {
            Some(text)
        } else {
            None
        }
    }
}

impl Default for ArticleText {
    fn default() -> Self {
        Self::new()
    }
}

impl ArticleExtractor for ArticleText {
    fn extract(&self, html: &str, url: &str) -> Option<String> {
        let document = Html::parse_document(html);

        for css in ["article", "main", "[role='main']", "#content", ".post-content"] {
            if let Some(text) = self.container_text(&document, css) {
                return Some(text);
            }
        }

        // Fall back to paragraph text across the body
        let p = Selector::parse("body p").ok()?;
        let text = document
            .select(&p)
            .map(|el| collect_text(el))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        if text.trim().is_empty() {
            tracing::debug!("No readable content found at {}", url);
            None
        } else {
            Some(text)
        }
    }
}

fn collect_text(element: scraper::ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_paragraph() -> String {
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(12)
    }

    #[test]
    fn test_prefers_article_container() {
        let body = long_paragraph();
        let html = format!(
            "<html><body><nav>Menu Menu Menu</nav><article><p>{}</p></article></body></html>",
            body
        );
        let text = ArticleText::new()
            .extract(&html, "https://example.com/post")
            .unwrap();
        assert!(text.contains("Lorem ipsum"));
        assert!(!text.contains("Menu"));
    }

    #[test]
    fn test_falls_back_to_body_paragraphs() {
        let html = "<html><body><div><p>Short standalone paragraph.</p></div></body></html>";
        let text = ArticleText::new()
            .extract(html, "https://example.com/x")
            .unwrap();
        assert_eq!(text, "Short standalone paragraph.");
    }

    #[test]
    fn test_no_content_yields_none() {
        let html = "<html><body><div>bare div text only</div></body></html>";
        assert!(ArticleText::new()
            .extract(html, "https://example.com/x")
            .is_none());
    }

    #[test]
    fn test_small_article_container_is_skipped() {
        // Container below the threshold; paragraph fallback still applies
        let html = "<html><body><article><p>tiny</p></article></body></html>";
        let text = ArticleText::new()
            .extract(html, "https://example.com/x")
            .unwrap();
        assert_eq!(text, "tiny");
    }
}
