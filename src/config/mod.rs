//! Configuration module for Textweave
//!
//! This module handles loading, parsing, and validating TOML job files.
//! A job file declares one or more `[[job]]` tables, each describing one
//! site crawl, plus an optional combined-output directory.

mod parser;
mod types;
pub mod validation;

// Re-export types
pub use types::{
    Config, CrawlJob, OutputConfig, ProxyConfig, SolverConfig, DEFAULT_EXCLUDED_FILE_TYPES,
};

// Re-export parser functions
pub use parser::load_config;
pub use validation::{validate, validate_job};
