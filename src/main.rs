//! Textweave main entry point
//!
//! Command-line interface: load a TOML job file, crawl each configured
//! site, write its corpus outputs, and optionally merge everything into
//! a combined dataset directory.

use clap::Parser;
use std::path::{Path, PathBuf};
use textweave::config::{load_config, Config};
use textweave::crawler::run_job;
use textweave::output::combine_outputs;
use tracing_subscriber::EnvFilter;

/// Textweave: a site-to-corpus web crawler
///
/// Textweave walks one or more websites within configured depth and
/// article bounds, extracts main-article text, and emits the corpus as
/// per-page files, JSONL, and CSV for training-data pipelines.
#[derive(Parser, Debug)]
#[command(name = "textweave")]
#[command(version = "1.0.0")]
#[command(about = "A site-to-corpus web crawler", long_about = None)]
struct Cli {
    /// Path to TOML job configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Skip merging job outputs even when a combined directory is set
    #[arg(long)]
    no_combine: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.no_combine).await
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("textweave=info,warn"),
            1 => EnvFilter::new("textweave=debug,info"),
            2 => EnvFilter::new("textweave=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: prints what each job would do
fn handle_dry_run(config: &Config) {
    println!("=== Textweave Dry Run ===\n");

    for (index, job) in config.jobs.iter().enumerate() {
        println!("Job {}: {}", index + 1, job.base_url);
        println!("  Start URL: {}", job.start_url());
        println!("  Strict domain scope: {}", job.strict_base_url);
        println!(
            "  Max depth: {}",
            job.max_depth.map_or("unbounded".to_string(), |d| d.to_string())
        );
        println!(
            "  Max articles: {}",
            job.max_articles
                .map_or("unbounded".to_string(), |a| a.to_string())
        );
        println!("  Concurrency: {}", job.concurrency_limit);
        println!(
            "  Delays: {}ms between batches, {}ms retry base",
            job.crawl_delay_ms, job.retry_delay_ms
        );
        println!(
            "  Exclusions: {} prefix, {} exact",
            job.exclude_list.len(),
            job.exact_exclude_list.len()
        );
        if job.proxy.is_some() {
            println!("  Proxy: configured");
        }
        if job.solver.is_some() {
            println!("  Challenge solver: configured");
        }
        println!("  Output: {}", job.output.output_dir);
        println!();
    }

    if let Some(dir) = &config.combined_output_dir {
        println!("Combined output: {}", dir);
    }
    println!("✓ Configuration is valid ({} jobs)", config.jobs.len());
}

/// Runs every job in order, then merges outputs when configured
async fn handle_crawl(config: Config, no_combine: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut completed = Vec::new();

    for job in config.jobs {
        let base_url = job.base_url.clone();
        let output = job.output.clone();

        tracing::info!("Starting job for {}", base_url);
        match run_job(job).await {
            Ok(pages) => {
                tracing::info!("Job for {} admitted {} pages", base_url, pages.len());
                completed.push(output);
            }
            Err(e) => {
                // A failed job does not stop the remaining jobs
                tracing::error!("Job for {} failed: {}", base_url, e);
            }
        }
    }

    if completed.is_empty() {
        return Err("all jobs failed".into());
    }

    if let (Some(dir), false) = (&config.combined_output_dir, no_combine) {
        combine_outputs(Path::new(dir), &completed)?;
    }

    tracing::info!("All jobs finished ({} completed)", completed.len());
    Ok(())
}
