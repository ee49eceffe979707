//! Delimited text output

use crate::model::{ProductVariantRecord, RECORD_HEADER};
use crate::output::traits::{OutputError, OutputResult, RowSink};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a header row followed by one row per record
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Creates (or truncates) the file at `path` and writes the header
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(inner: W) -> OutputResult<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(RECORD_HEADER)?;
        Ok(Self { writer })
    }

    /// Returns the underlying writer after flushing
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))
    }
}

impl<W: Write + Send> RowSink for CsvSink<W> {
    fn append(&mut self, record: &ProductVariantRecord) -> OutputResult<()> {
        self.writer.write_record(record.to_row())?;
        // Keep completed rows on disk if the run is interrupted
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
