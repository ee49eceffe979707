//! Integration tests for Shoe-Scout

mod common;
mod crawl_tests;
mod output_tests;
