use crate::config::OutputConfig;
use crate::output::{filter_metadata, OutputResult};
use crate::state::AdmittedPage;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One `{"text": ...}` corpus record
#[derive(Serialize)]
struct SimpleRecord<'a> {
    text: &'a str,
}

/// Corpus record with the configured metadata fields attached
#[derive(Serialize)]
struct MetaRecord<'a> {
    text: &'a str,
    metadata: BTreeMap<&'a str, &'a str>,
}

/// Writes the line-delimited JSON corpus, and its `_with_metadata`
/// variant when enabled
pub fn write_jsonl(output: &OutputConfig, pages: &[AdmittedPage]) -> OutputResult<()> {
    let path = output.jsonl_path();
    ensure_parent(Path::new(&path))?;
    let mut simple = BufWriter::new(File::create(&path)?);

    let mut meta = if output.include_metadata {
        let meta_path = OutputConfig::with_metadata_variant(&path);
        Some(BufWriter::new(File::create(meta_path)?))
    } else {
        None
    };

    for page in pages {
        let record = SimpleRecord { text: &page.text };
        serde_json::to_writer(&mut simple, &record)?;
        simple.write_all(b"\n")?;

        if let Some(meta) = &mut meta {
            let record = MetaRecord {
                text: &page.text,
                metadata: filter_metadata(&page.metadata, &output.metadata_fields),
            };
            serde_json::to_writer(&mut *meta, &record)?;
            meta.write_all(b"\n")?;
        }
    }

    simple.flush()?;
    if let Some(mut meta) = meta {
        meta.flush()?;
    }
    tracing::info!("Created JSONL corpus at {}", path);
    Ok(())
}

/// Writes the CSV table (`text` column), and its `_with_metadata`
/// variant with one column per configured metadata field
pub fn write_csv(output: &OutputConfig, pages: &[AdmittedPage]) -> OutputResult<()> {
    let path = output.csv_path();
    ensure_parent(Path::new(&path))?;
    let mut simple = BufWriter::new(File::create(&path)?);
    writeln!(simple, "text")?;

    let mut meta = if output.include_metadata {
        let meta_path = OutputConfig::with_metadata_variant(&path);
        let mut writer = BufWriter::new(File::create(meta_path)?);
        writeln!(writer, "text,{}", output.metadata_fields.join(","))?;
        Some(writer)
    } else {
        None
    };

    for page in pages {
        writeln!(simple, "{}", csv_quote(&page.text))?;

        if let Some(meta) = &mut meta {
            let mut row = csv_quote(&page.text);
            for field in &output.metadata_fields {
                row.push(',');
                match page.metadata.get(field) {
                    Some(value) => row.push_str(&csv_quote(value)),
                    None => row.push_str("\"\""),
                }
            }
            writeln!(meta, "{}", row)?;
        }
    }

    simple.flush()?;
    if let Some(mut meta) = meta {
        meta.flush()?;
    }
    tracing::info!("Created CSV table at {}", path);
    Ok(())
}

/// Quotes a CSV field, doubling embedded quotes
fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn ensure_parent(path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
