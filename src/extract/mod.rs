//! Content extraction collaborators
//!
//! The traversal engine treats extraction as a set of capabilities: given
//! raw markup and the originating URL, produce article text, candidate
//! links, or metadata. The default implementations here parse the DOM with
//! `scraper`; callers can substitute their own.

mod article;
mod links;
mod metadata;

pub use article::{ArticleText, DEFAULT_CHAR_THRESHOLD};
pub use links::LinkScanner;
pub use metadata::MetadataFields;

use std::collections::BTreeMap;

/// Readability-style main-content extraction
pub trait ArticleExtractor: Send + Sync {
    /// Returns the main article text, or `None` when the page has no
    /// readable content
    fn extract(&self, html: &str, url: &str) -> Option<String>;
}

/// Title/description/OpenGraph metadata extraction
pub trait MetadataExtractor: Send + Sync {
    /// Returns a field -> value map for the page
    fn extract(&self, html: &str, url: &str) -> BTreeMap<String, String>;
}
