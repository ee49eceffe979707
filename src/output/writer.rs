//! The single writer task
//!
//! Every keyword run sends its records through one channel; this task owns
//! the sink and is the only place rows are written.

use crate::model::ProductVariantRecord;
use crate::output::traits::{OutputResult, RowSink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Drains `rx` into `sink` on a blocking thread until every sender is dropped
///
/// Resolves to the number of rows written. On a write error the channel is
/// closed, so senders see failed sends and stop producing.
pub fn spawn_writer<S>(
    mut sink: S,
    mut rx: mpsc::Receiver<ProductVariantRecord>,
) -> JoinHandle<OutputResult<u64>>
where
    S: RowSink + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut written = 0u64;

        while let Some(record) = rx.blocking_recv() {
            if let Err(e) = sink.append(&record) {
                tracing::error!("Failed to write record for {}: {}", record.url, e);
                rx.close();
                return Err(e);
            }
            written += 1;
        }

        sink.finish()?;
        tracing::debug!("Writer finished after {} rows", written);
        Ok(written)
    })
}
