use crate::config::types::{Config, FetcherConfig, PoolConfig, SearchConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

const MAX_TIMEOUT_MS: u64 = 120_000;
const MAX_POOL_THREADS: usize = 512;
const MAX_SHUTDOWN_GRACE_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_pool_config(&config.pool)?;
    Ok(())
}

/// Validates search endpoint and selectors
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.query_param.is_empty() {
        return Err(ConfigError::Validation(
            "query-param cannot be empty".to_string(),
        ));
    }

    validate_selector("result-selector", &config.result_selector)?;
    validate_selector("script-selector", &config.script_selector)?;

    Ok(())
}

/// Validates HTTP fetcher settings
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("timeout-ms", config.timeout_ms),
        ("connect-timeout-ms", config.connect_timeout_ms),
    ] {
        if value < 1 || value > MAX_TIMEOUT_MS {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_TIMEOUT_MS, value
            )));
        }
    }

    Ok(())
}

/// Validates worker pool sizing
fn validate_pool_config(config: &PoolConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("io-threads", config.io_threads),
        ("compute-threads", config.compute_threads),
    ] {
        if value > MAX_POOL_THREADS {
            return Err(ConfigError::Validation(format!(
                "{} must be <= {}, got {}",
                name, MAX_POOL_THREADS, value
            )));
        }
    }

    if config.shutdown_grace_ms > MAX_SHUTDOWN_GRACE_MS {
        return Err(ConfigError::Validation(format!(
            "shutdown-grace-ms must be <= {}, got {}",
            MAX_SHUTDOWN_GRACE_MS, config.shutdown_grace_ms
        )));
    }

    Ok(())
}

fn validate_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "{} cannot be empty",
            name
        )));
    }

    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {:?}", name, selector, e)))
}
