//! Shoe-Scout: a retailer catalog extractor
//!
//! This crate crawls retailer search results for free-text keywords, visits
//! every product detail page once, decodes the retailer-specific embedded
//! payloads and flattens each product's variants into one row per
//! (variant, size) pair.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod output;
pub mod robots;
pub mod rules;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Shoe-Scout operations
///
/// Only resource acquisition failures surface here. Per-page and per-product
/// failures are reported through [`crawler::FetchError`] and
/// [`extract::ExtractionFailure`] and never abort a run.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Unknown retailer '{0}'")]
    UnknownRetailer(String),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}' in rule set '{rule_set}': {message}")]
    InvalidSelector {
        rule_set: String,
        selector: String,
        message: String,
    },

    #[error("Invalid pattern in rule set '{rule_set}': {source}")]
    InvalidPattern {
        rule_set: String,
        source: regex::Error,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Search URL template has no {{keyword}} placeholder: {0}")]
    MissingPlaceholder(String),
}

/// Result type alias for Shoe-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, HttpFetcher};
pub use extract::{extract, ExtractionFailure};
pub use model::{ProductReference, ProductVariantRecord};
pub use rules::{CompiledRules, ExtractionRuleSet};
pub use state::{RunControl, VisitedSet};
