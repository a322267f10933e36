use crate::config::OutputConfig;
use crate::output::OutputResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Merges the outputs of several completed jobs into one directory
///
/// Produces `combined.jsonl`, `combined.csv`, their `_with_metadata`
/// variants (when any job carries metadata), and a renumbered `texts/`
/// tree. Reads the files the jobs already wrote; call only after every
/// job has finished.
pub fn combine_outputs(target_dir: &Path, jobs: &[OutputConfig]) -> OutputResult<()> {
    match std::fs::remove_dir_all(target_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    std::fs::create_dir_all(target_dir)?;

    combine_jsonl(target_dir, jobs)?;
    combine_csv(target_dir, jobs)?;
    combine_texts(target_dir, jobs)?;

    tracing::info!(
        "Combined {} job outputs into {}",
        jobs.len(),
        target_dir.display()
    );
    Ok(())
}

fn combine_jsonl(target_dir: &Path, jobs: &[OutputConfig]) -> OutputResult<()> {
    let mut simple = BufWriter::new(File::create(target_dir.join("combined.jsonl"))?);
    let mut meta = if jobs.iter().any(|j| j.include_metadata) {
        Some(BufWriter::new(File::create(
            target_dir.join("combined_with_metadata.jsonl"),
        )?))
    } else {
        None
    };

    for job in jobs {
        let content = std::fs::read_to_string(job.jsonl_path())?;
        simple.write_all(content.as_bytes())?;

        if job.include_metadata {
            if let Some(meta) = &mut meta {
                let meta_path = OutputConfig::with_metadata_variant(&job.jsonl_path());
                let content = std::fs::read_to_string(meta_path)?;
                meta.write_all(content.as_bytes())?;
            }
        }
    }

    simple.flush()?;
    if let Some(mut meta) = meta {
        meta.flush()?;
    }
    Ok(())
}

fn combine_csv(target_dir: &Path, jobs: &[OutputConfig]) -> OutputResult<()> {
    let mut simple = BufWriter::new(File::create(target_dir.join("combined.csv"))?);
    writeln!(simple, "text")?;

    // Metadata columns come from the first metadata-carrying job
    let meta_fields = jobs
        .iter()
        .find(|j| j.include_metadata)
        .map(|j| j.metadata_fields.clone());

    let mut meta = match &meta_fields {
        Some(fields) => {
            let mut writer = BufWriter::new(File::create(
                target_dir.join("combined_with_metadata.csv"),
            )?);
            writeln!(writer, "text,{}", fields.join(","))?;
            Some(writer)
        }
        None => None,
    };

    for job in jobs {
        append_csv_body(&mut simple, &job.csv_path())?;

        if job.include_metadata {
            if let Some(meta) = &mut meta {
                let meta_path = OutputConfig::with_metadata_variant(&job.csv_path());
                append_csv_body(meta, &meta_path)?;
            }
        }
    }

    simple.flush()?;
    if let Some(mut meta) = meta {
        meta.flush()?;
    }
    Ok(())
}

/// Copies CSV rows, skipping the source file's header line
fn append_csv_body(writer: &mut BufWriter<File>, path: &str) -> OutputResult<()> {
    let content = std::fs::read_to_string(path)?;
    for line in content.lines().skip(1).filter(|l| !l.trim().is_empty()) {
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

fn combine_texts(target_dir: &Path, jobs: &[OutputConfig]) -> OutputResult<()> {
    let texts_dir = target_dir.join("texts");
    std::fs::create_dir_all(&texts_dir)?;

    let meta_texts_dir = target_dir.join("texts_with_metadata");
    if jobs.iter().any(|j| j.include_metadata) {
        std::fs::create_dir_all(&meta_texts_dir)?;
    }

    let mut counter = 1u64;
    for job in jobs {
        let source = job.texts_dir();
        let mut files: Vec<_> = std::fs::read_dir(&source)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        // Numbered files sort by their number, not lexically
        files.sort_by_key(|name| {
            Path::new(name)
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(u64::MAX)
        });

        for file in files {
            let content = std::fs::read(Path::new(&source).join(&file))?;
            std::fs::write(texts_dir.join(format!("{}.txt", counter)), content)?;

            if job.include_metadata {
                let meta_source =
                    Path::new(&OutputConfig::with_metadata_variant(&source)).join(&file);
                let content = std::fs::read(meta_source)?;
                std::fs::write(meta_texts_dir.join(format!("{}.txt", counter)), content)?;
            }

            counter += 1;
        }
    }

    Ok(())
}
