//! MBTiles tile store.
//!
//! The store is a SQLite file following the MBTiles 1.3 layout:
//!
//! - `metadata(name, value)`: dataset description, written once up front
//! - `tiles(zoom_level, tile_column, tile_row, tile_data)`: one row per
//!   [`TileAddress`], rows counted from the south (TMS)
//!
//! [`MbtilesStore`] owns the connection. During a run it is moved into a
//! [`TileStoreWriter`] running on a blocking thread, which is the only code
//! that touches the database until the run ends. [`StoreInspector`] opens a
//! finished store read-only.

mod error;
mod inspect;
mod mbtiles;
mod writer;

pub use error::{StoreError, StoreResult};
pub use inspect::StoreInspector;
pub use mbtiles::MbtilesStore;
pub use writer::{
    spawn_writer, TileStoreWriter, WriteStats, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE,
};

use bytes::Bytes;

use crate::coord::TileAddress;

/// A downloaded tile ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRecord {
    pub address: TileAddress,
    pub data: Bytes,
}

impl TileRecord {
    pub fn new(address: TileAddress, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            data: data.into(),
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
