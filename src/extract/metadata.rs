use crate::extract::MetadataExtractor;
use chrono::Utc;
use scraper::{Html, Selector};
use std::collections::BTreeMap;

/// Default metadata extractor: title, standard meta tags, OpenGraph
/// properties, language, canonical URL, and a scrape timestamp
#[derive(Debug, Clone, Default)]
pub struct MetadataFields;

impl MetadataFields {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataExtractor for MetadataFields {
    fn extract(&self, html: &str, url: &str) -> BTreeMap<String, String> {
        let document = Html::parse_document(html);
        let mut fields = BTreeMap::new();

        fields.insert("url".to_string(), url.to_string());

        if let Some(title) = select_text(&document, "title") {
            fields.insert("title".to_string(), title);
        }

        for (field, name) in [
            ("description", "description"),
            ("keywords", "keywords"),
            ("author", "author"),
        ] {
            if let Some(content) = select_attr(
                &document,
                &format!("meta[name=\"{}\"]", name),
                "content",
            ) {
                fields.insert(field.to_string(), content);
            }
        }

        for (field, property) in [
            ("og_title", "og:title"),
            ("og_description", "og:description"),
            ("og_image", "og:image"),
            ("og_type", "og:type"),
        ] {
            if let Some(content) = select_attr(
                &document,
                &format!("meta[property=\"{}\"]", property),
                "content",
            ) {
                fields.insert(field.to_string(), content);
            }
        }

        if let Some(lang) = select_attr(&document, "html", "lang") {
            fields.insert("language".to_string(), lang);
        }

        if let Some(canonical) = select_attr(&document, "link[rel=\"canonical\"]", "href") {
            fields.insert("canonical_url".to_string(), canonical);
        }

        fields.insert("date_scraped".to_string(), Utc::now().to_rfc3339());

        fields
    }
}

fn select_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn select_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
}
