use crate::config::OutputConfig;
use crate::output::{filter_metadata, OutputError, OutputResult};
use crate::state::AdmittedPage;
use std::path::{Path, PathBuf};
use url::Url;

/// Writes the per-page file tree: for each admitted page, a `.txt` with
/// the article text and a `.json` with its full metadata, laid out under
/// the output directory following the URL path
pub fn write_page_tree(output: &OutputConfig, pages: &[AdmittedPage]) -> OutputResult<()> {
    for page in pages {
        let file_stem = page_file_stem(Path::new(&output.output_dir), &page.url)?;
        if let Some(parent) = file_stem.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(file_stem.with_extension("txt"), &page.text)?;
        std::fs::write(
            file_stem.with_extension("json"),
            serde_json::to_string_pretty(&page.metadata)?,
        )?;
        tracing::debug!("Saved {}", file_stem.with_extension("txt").display());
    }
    Ok(())
}

/// Writes numbered text files (`1.txt`, `2.txt`, ...) in discovery order,
/// plus a `_with_metadata` sibling directory when metadata is enabled
pub fn write_numbered_texts(output: &OutputConfig, pages: &[AdmittedPage]) -> OutputResult<()> {
    let texts_dir = PathBuf::from(output.texts_dir());
    std::fs::create_dir_all(&texts_dir)?;

    let meta_dir = if output.include_metadata {
        let dir = PathBuf::from(OutputConfig::with_metadata_variant(&output.texts_dir()));
        std::fs::create_dir_all(&dir)?;
        Some(dir)
    } else {
        None
    };

    for (index, page) in pages.iter().enumerate() {
        let file_name = format!("{}.txt", index + 1);
        std::fs::write(texts_dir.join(&file_name), &page.text)?;

        if let Some(meta_dir) = &meta_dir {
            let mut content = String::new();
            for (field, value) in filter_metadata(&page.metadata, &output.metadata_fields) {
                content.push_str(&format!("{}: {}\n", field, value));
            }
            content.push_str("\n---\n\n");
            content.push_str(&page.text);
            std::fs::write(meta_dir.join(&file_name), content)?;
        }
    }

    Ok(())
}

/// Maps a page URL to its file stem inside the output tree
///
/// The URL path becomes the relative file path; the root path becomes
/// `index`. Dot segments are dropped so a hostile path cannot climb out
/// of the output directory.
fn page_file_stem(output_dir: &Path, url: &str) -> OutputResult<PathBuf> {
    let parsed =
        Url::parse(url).map_err(|e| OutputError::Write(format!("unwritable URL {}: {}", url, e)))?;

    let mut stem = output_dir.to_path_buf();
    let segments: Vec<&str> = parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();

    if segments.is_empty() {
        stem.push("index");
    } else {
        for segment in segments {
            stem.push(segment);
        }
    }

    Ok(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn page(url: &str, text: &str) -> AdmittedPage {
        let mut metadata = BTreeMap::new();
        metadata.insert("title".to_string(), "A title".to_string());
        metadata.insert("author".to_string(), "An author".to_string());
        AdmittedPage {
            url: url.to_string(),
            text: text.to_string(),
            metadata,
            depth: 0,
        }
    }

    fn output_for(dir: &TempDir, include_metadata: bool) -> OutputConfig {
        OutputConfig {
            output_dir: dir.path().to_str().unwrap().to_string(),
            texts_dir: None,
            jsonl_path: None,
            csv_path: None,
            include_metadata,
            metadata_fields: vec!["title".to_string()],
        }
    }

    #[test]
    fn test_page_tree_layout() {
        let dir = TempDir::new().unwrap();
        let output = output_for(&dir, false);
        let pages = vec![
            page("https://example.com", "root text"),
            page("https://example.com/posts/hello", "post text"),
        ];

        write_page_tree(&output, &pages).unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("index.txt")).unwrap(),
            "root text"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("posts/hello.txt")).unwrap(),
            "post text"
        );
        let json = std::fs::read_to_string(dir.path().join("posts/hello.json")).unwrap();
        assert!(json.contains("A title"));
    }

    #[test]
    fn test_page_stem_ignores_dot_segments() {
        let stem = page_file_stem(Path::new("/out"), "https://example.com/../../etc/passwd").unwrap();
        assert_eq!(stem, PathBuf::from("/out/etc/passwd"));
    }

    #[test]
    fn test_numbered_texts() {
        let dir = TempDir::new().unwrap();
        let output = output_for(&dir, false);
        let pages = vec![
            page("https://example.com/a", "first"),
            page("https://example.com/b", "second"),
        ];

        write_numbered_texts(&output, &pages).unwrap();

        let texts = dir.path().join("texts");
        assert_eq!(std::fs::read_to_string(texts.join("1.txt")).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(texts.join("2.txt")).unwrap(), "second");
    }

    #[test]
    fn test_numbered_texts_with_metadata() {
        let dir = TempDir::new().unwrap();
        let output = output_for(&dir, true);
        let pages = vec![page("https://example.com/a", "body")];

        write_numbered_texts(&output, &pages).unwrap();

        let meta_file = dir.path().join("texts_with_metadata/1.txt");
        let content = std::fs::read_to_string(meta_file).unwrap();
        assert!(content.starts_with("title: A title\n"));
        assert!(content.contains("\n---\n\nbody"));
        // Only configured fields are carried
        assert!(!content.contains("author"));
    }
}
