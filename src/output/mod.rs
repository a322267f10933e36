//! Corpus output generation
//!
//! Runs after a crawl completes: drains the accumulator into a per-page
//! file tree, numbered text files, a line-delimited JSON corpus, and a
//! CSV table, each with an optional `_with_metadata` variant. Multiple
//! jobs' outputs can be merged with [`combine_outputs`].

mod combine;
mod corpus;
mod writer;

pub use combine::combine_outputs;
pub use corpus::{write_csv, write_jsonl};
pub use writer::{write_numbered_texts, write_page_tree};

use crate::config::OutputConfig;
use crate::state::AdmittedPage;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Words stripped from the end of extracted articles; social-media
/// footers that survive readability extraction
const TRAILING_BOILERPLATE: &[&str] = &["Facebook", "Twitter", "Donate Now", "Instagram"];

/// Cleans extracted article text before it enters the corpus
///
/// Trims every line, collapses runs of blank lines to one, removes
/// known link-farm phrases, and repeatedly strips trailing social-media
/// boilerplate words.
pub fn process_text(content: &str) -> String {
    let stripped = content.replace("[You can read more about this here]", "");

    // Trim lines and collapse 2+ consecutive blank lines into one
    let mut lines = Vec::new();
    let mut blank_run = 0;
    for line in stripped.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }
    let mut text = lines.join("\n").trim().to_string();

    loop {
        let mut changed = false;
        for word in TRAILING_BOILERPLATE {
            let trimmed = text.trim_end();
            if let Some(rest) = trimmed.strip_suffix(word) {
                text = rest.trim_end().to_string();
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    text.trim().to_string()
}

/// Keeps only the configured metadata fields of a page
pub(crate) fn filter_metadata<'a>(
    metadata: &'a BTreeMap<String, String>,
    fields: &[String],
) -> BTreeMap<&'a str, &'a str> {
    fields
        .iter()
        .filter_map(|field| {
            metadata
                .get_key_value(field)
                .map(|(k, v)| (k.as_str(), v.as_str()))
        })
        .collect()
}

/// Writes every configured output format for one job
///
/// Recreates the output directory from scratch, then emits the per-page
/// tree, numbered texts, JSONL corpus, and CSV table.
pub fn write_job_outputs(output: &OutputConfig, pages: &[AdmittedPage]) -> OutputResult<()> {
    prepare_output_dir(Path::new(&output.output_dir))?;

    write_page_tree(output, pages)?;
    write_numbered_texts(output, pages)?;
    write_jsonl(output, pages)?;
    write_csv(output, pages)?;

    tracing::info!(
        "Wrote {} pages to {}",
        pages.len(),
        output.output_dir
    );
    Ok(())
}

/// Clears and recreates an output directory
fn prepare_output_dir(dir: &Path) -> OutputResult<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}
