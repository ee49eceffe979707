//! Output module: where extracted records end up
//!
//! This module handles:
//! - The `RowSink` boundary and its CSV and SQLite implementations
//! - The single writer task that serializes all appends
//! - Default output file naming
//! - Run statistics

mod csv_sink;
mod sqlite_sink;
pub mod stats;
mod traits;
mod writer;

pub use csv_sink::CsvSink;
pub use sqlite_sink::SqliteSink;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputResult, RowSink};
pub use writer::spawn_writer;

use crate::config::OutputFormat;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Opens the sink for `format` at `path`
///
/// This is the one fatal point of a run: if the file cannot be created,
/// nothing is crawled.
pub fn open_sink(format: OutputFormat, path: &Path) -> OutputResult<Box<dyn RowSink>> {
    let sink: Box<dyn RowSink> = match format {
        OutputFormat::Csv => Box::new(CsvSink::create(path)?),
        OutputFormat::Sqlite => Box::new(SqliteSink::open(path)?),
    };
    tracing::info!("Writing {} output to {}", format.extension(), path.display());
    Ok(sink)
}

/// Builds `<directory>/<prefix>_YYYY_MM_DD_HH_MM_SS.<ext>`
pub fn default_output_path(
    directory: &Path,
    file_prefix: &str,
    format: OutputFormat,
    now: DateTime<Local>,
) -> PathBuf {
    directory.join(format!(
        "{}_{}.{}",
        file_prefix,
        now.format("%Y_%m_%d_%H_%M_%S"),
        format.extension()
    ))
}
