//! Configuration module for Shoe-Scout
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so a run without a config
//! file uses [`Config::default`].
//!
//! # Example
//!
//! ```no_run
//! use shoe_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shoe-scout.toml")).unwrap();
//! println!("Detail workers: {}", config.crawler.max_concurrent_details);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig, OutputFormat};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_proxy_url};
