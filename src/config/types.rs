use crate::rules::{builtin_rule_set, ExtractionRuleSet};
use crate::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Shoe-Scout
///
/// Every table and key is optional; an empty file is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Custom rule sets; a name shared with a built-in replaces it
    #[serde(default)]
    pub retailer: Vec<ExtractionRuleSet>,
}

impl Config {
    /// Resolves a rule set by name, config file first, then built-ins
    ///
    /// # Returns
    ///
    /// * `Ok(Some(rules))` - Rule set found
    /// * `Ok(None)` - No rule set with that name
    /// * `Err(ConfigError)` - A built-in preset failed to parse
    pub fn rule_set(&self, name: &str) -> Result<Option<ExtractionRuleSet>, ConfigError> {
        if let Some(custom) = self
            .retailer
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
        {
            return Ok(Some(custom.clone()));
        }
        builtin_rule_set(name)
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Detail pages fetched concurrently per keyword run
    pub max_concurrent_details: u32,

    /// Keyword runs executed in parallel
    pub keyword_concurrency: u32,

    /// Minimum time between the start of two requests (milliseconds)
    pub min_request_interval_ms: u64,

    /// Listing pages followed per keyword; 0 means no limit
    pub max_listing_pages: u32,

    pub request_timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Retries for timeouts, connection failures and 5xx responses
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each further attempt
    pub retry_delay_ms: u64,

    /// Time limit for one keyword run; 0 means none
    pub run_timeout_secs: u64,

    pub respect_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_details: 4,
            keyword_concurrency: 1,
            min_request_interval_ms: 250,
            max_listing_pages: 0,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 2,
            retry_delay_ms: 1000,
            run_timeout_secs: 0,
            respect_robots: false,
        }
    }
}

impl CrawlerConfig {
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        (self.run_timeout_secs > 0).then(|| Duration::from_secs(self.run_timeout_secs))
    }

    pub fn max_listing_pages(&self) -> Option<u32> {
        (self.max_listing_pages > 0).then_some(self.max_listing_pages)
    }
}

/// Request identity and proxy pool
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,

    /// Proxy URLs used in round-robin order; direct connection when empty
    pub proxies: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            proxies: Vec::new(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Directory for default-named output files
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Sqlite,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Sqlite => "db",
        }
    }
}
