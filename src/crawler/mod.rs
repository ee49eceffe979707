//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - The fetch boundary and its reqwest implementation
//! - Request pacing across all workers
//! - Listing page parsing
//! - Keyword run coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, CrawlReport, CrawlSettings, RecordStream};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use parser::parse_listing;
pub use scheduler::RequestPacer;
