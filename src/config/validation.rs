use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig};
use crate::rules::CompiledRules;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_rule_sets(config)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_details < 1 || config.max_concurrent_details > 64 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-details must be between 1 and 64, got {}",
            config.max_concurrent_details
        )));
    }

    if config.keyword_concurrency < 1 || config.keyword_concurrency > 16 {
        return Err(ConfigError::Validation(format!(
            "keyword-concurrency must be between 1 and 16, got {}",
            config.keyword_concurrency
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates request headers and proxy URLs
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    for proxy in &config.proxies {
        validate_proxy_url(proxy)?;
    }

    Ok(())
}

/// Checks that a proxy is an absolute http(s) or socks5 URL with a host
pub fn validate_proxy_url(proxy: &str) -> Result<(), ConfigError> {
    let url = Url::parse(proxy.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy URL '{}': {}", proxy, e)))?;

    if !matches!(url.scheme(), "http" | "https" | "socks5" | "socks5h") {
        return Err(ConfigError::InvalidUrl(format!(
            "Proxy URL '{}' has unsupported scheme '{}'",
            proxy,
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Proxy URL '{}' has no host",
            proxy
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Compiles every custom rule set and rejects duplicate names
fn validate_rule_sets(config: &Config) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for rules in &config.retailer {
        if rules.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "retailer rule set name cannot be empty".to_string(),
            ));
        }

        if !names.insert(rules.name.to_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate retailer rule set '{}'",
                rules.name
            )));
        }

        Url::parse(&rules.search_url.replace("{keyword}", "x")).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid search-url in rule set '{}': {}",
                rules.name, e
            ))
        })?;

        CompiledRules::compile(rules.clone())?;
    }

    Ok(())
}
