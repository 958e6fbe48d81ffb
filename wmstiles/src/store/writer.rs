//! Batched single-writer persistence.
//!
//! Records accumulate in memory and are flushed to the database in one
//! transaction per batch. The writer is the only owner of the store
//! connection while a run is in progress.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::error::StoreResult;
use super::mbtiles::MbtilesStore;
use super::TileRecord;

/// Default number of records per transaction.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Largest accepted number of records per transaction.
pub const MAX_BATCH_SIZE: usize = 100_000;

/// Totals reported by a finished writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Records written, counting overwrites of the same address.
    pub records: usize,
    /// Sum of payload sizes of all written records.
    pub bytes: u64,
    /// Committed transactions.
    pub batches: usize,
}

/// Buffers records and writes them in batches.
pub struct TileStoreWriter {
    store: MbtilesStore,
    batch: Vec<TileRecord>,
    batch_size: usize,
    stats: WriteStats,
}

impl TileStoreWriter {
    /// Creates a writer flushing every `batch_size` records.
    ///
    /// The batch size is clamped to `1..=MAX_BATCH_SIZE`.
    pub fn new(store: MbtilesStore, batch_size: usize) -> Self {
        let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        Self {
            store,
            batch: Vec::new(),
            batch_size,
            stats: WriteStats::default(),
        }
    }

    /// Adds a record, flushing when the batch is full.
    pub fn push(&mut self, record: TileRecord) -> StoreResult<()> {
        self.batch.push(record);
        if self.batch.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Writes the pending batch, if any, in one transaction.
    pub fn flush(&mut self) -> StoreResult<()> {
        if self.batch.is_empty() {
            return Ok(());
        }

        self.store.insert_tiles(&self.batch)?;

        let bytes: u64 = self.batch.iter().map(|r| r.len() as u64).sum();
        self.stats.records += self.batch.len();
        self.stats.bytes += bytes;
        self.stats.batches += 1;
        debug!(
            records = self.batch.len(),
            total = self.stats.records,
            "Flushed tile batch"
        );
        self.batch.clear();
        Ok(())
    }

    /// Records written so far, excluding the pending batch.
    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    /// Flushes the final batch and closes the store.
    pub fn finish(mut self) -> StoreResult<WriteStats> {
        self.flush()?;
        let stats = self.stats;
        self.store.close()?;
        Ok(stats)
    }
}

/// Runs a writer on a blocking thread, draining `rx` until it closes.
///
/// The task ends with the final statistics once every sender is dropped, or
/// with the first store error. On error the receiver is dropped, so senders
/// observe a closed channel.
pub fn spawn_writer(
    store: MbtilesStore,
    batch_size: usize,
    mut rx: mpsc::Receiver<TileRecord>,
) -> JoinHandle<StoreResult<WriteStats>> {
    tokio::task::spawn_blocking(move || {
        let mut writer = TileStoreWriter::new(store, batch_size);
        while let Some(record) = rx.blocking_recv() {
            if let Err(e) = writer.push(record) {
                error!(
                    error = %e,
                    written = writer.stats().records,
                    "Tile batch flush failed"
                );
                return Err(e);
            }
        }
        writer.finish()
    })
}
