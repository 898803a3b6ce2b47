use crate::config::types::{Config, CrawlerConfig, OutputConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// This is the one place a run may fail before any fetching begins: with
/// nothing to crawl or an unusable crawler setup, there is no work to do.
/// Malformed start URLs are deliberately NOT rejected here - a bad entry
/// among several start URLs is skipped at seed time instead.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.start_urls.is_empty() && config.keywords.is_empty() {
        return Err(ConfigError::NothingToCrawl);
    }

    if config.max_items < 1 {
        return Err(ConfigError::Validation(
            "max_items must be >= 1".to_string(),
        ));
    }

    if config.split_by_location && config.target_country.is_none() {
        return Err(ConfigError::Validation(
            "split-by-location requires target-country".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use HTTP or HTTPS, got '{}'",
            base.scheme()
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 16 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 16, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.retry_initial_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "retry_initial_delay_ms must be >= 100ms, got {}ms",
            config.retry_initial_delay_ms
        )));
    }

    for proxy in &config.proxies {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.records_path.is_empty() {
        return Err(ConfigError::Validation(
            "records_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
