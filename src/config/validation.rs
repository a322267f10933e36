use crate::config::types::{Config, CrawlJob, OutputConfig, ProxyConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.jobs.is_empty() {
        return Err(ConfigError::Validation(
            "configuration must define at least one [[job]]".to_string(),
        ));
    }

    for job in &config.jobs {
        validate_job(job)?;
    }

    Ok(())
}

/// Validates a single crawl job
pub fn validate_job(job: &CrawlJob) -> Result<(), ConfigError> {
    let base = Url::parse(&job.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", job.base_url, e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be http(s), got '{}'",
            job.base_url
        )));
    }

    if base.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            job.base_url
        )));
    }

    if let Some(start) = &job.start_url {
        Url::parse(start)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url '{}': {}", start, e)))?;
    }

    if job.concurrency_limit < 1 || job.concurrency_limit > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency-limit must be between 1 and 64, got {}",
            job.concurrency_limit
        )));
    }

    if job.max_retries < 1 {
        return Err(ConfigError::Validation(
            "max-retries must be >= 1".to_string(),
        ));
    }

    if job.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-ms must be >= 100ms, got {}ms",
            job.request_timeout_ms
        )));
    }

    if let Some(max) = job.max_articles {
        if max == 0 {
            return Err(ConfigError::Validation(
                "max-articles of 0 would admit nothing; omit it for unbounded".to_string(),
            ));
        }
    }

    for ext in &job.excluded_file_types {
        if !ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "excluded-file-types entries must start with '.', got '{}'",
                ext
            )));
        }
    }

    for entry in job.exclude_list.iter().chain(&job.exact_exclude_list) {
        Url::parse(entry).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid exclude-list entry '{}': {}", entry, e))
        })?;
    }

    if let Some(proxy) = &job.proxy {
        validate_proxy(proxy)?;
    }

    validate_output(&job.output)?;

    Ok(())
}

fn validate_proxy(proxy: &ProxyConfig) -> Result<(), ConfigError> {
    Url::parse(&proxy.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy url '{}': {}", proxy.url, e)))?;

    // Credentials come as a pair or not at all
    if proxy.username.is_some() != proxy.password.is_some() {
        return Err(ConfigError::Validation(
            "proxy username and password must be set together".to_string(),
        ));
    }

    Ok(())
}

fn validate_output(output: &OutputConfig) -> Result<(), ConfigError> {
    if output.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    if output.include_metadata && output.metadata_fields.is_empty() {
        return Err(ConfigError::Validation(
            "include-metadata requires a non-empty metadata-fields list".to_string(),
        ));
    }

    if !output.include_metadata && !output.metadata_fields.is_empty() {
        return Err(ConfigError::Validation(
            "metadata-fields is set but include-metadata is false".to_string(),
        ));
    }

    Ok(())
}
