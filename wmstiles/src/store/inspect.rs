//! Read-only access to a finished store.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};

use super::error::{StoreError, StoreResult};
use crate::coord::TileAddress;

/// Opens an MBTiles file read-only for inspection.
pub struct StoreInspector {
    conn: Connection,
}

impl StoreInspector {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// All metadata rows, ordered by name.
    pub fn metadata(&self) -> StoreResult<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value FROM metadata ORDER BY name")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Value of a single metadata key.
    pub fn metadata_value(&self, name: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM metadata WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn tile_count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Tile counts per zoom level, ascending.
    pub fn zoom_counts(&self) -> StoreResult<Vec<(u8, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT zoom_level, COUNT(*) FROM tiles GROUP BY zoom_level ORDER BY zoom_level",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let zoom: u8 = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((zoom, count as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Payload stored at `address`, if any.
    pub fn tile(&self, address: TileAddress) -> StoreResult<Option<Vec<u8>>> {
        let data = self
            .conn
            .query_row(
                "SELECT tile_data FROM tiles
                 WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
                [address.zoom as u32, address.column, address.row],
                |row| row.get(0),
            )
            .optional()?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MbtilesStore, TileRecord};
    use tempfile::TempDir;

    fn populated(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("inspect.mbtiles");
        let mut store = MbtilesStore::create(&path).unwrap();
        store
            .write_metadata(&[("name", "crops"), ("minzoom", "1"), ("maxzoom", "2")])
            .unwrap();
        let records = vec![
            TileRecord::new(TileAddress { zoom: 1, column: 0, row: 0 }, vec![1u8; 3]),
            TileRecord::new(TileAddress { zoom: 2, column: 1, row: 2 }, vec![2u8; 3]),
            TileRecord::new(TileAddress { zoom: 2, column: 2, row: 2 }, vec![3u8; 3]),
        ];
        store.insert_tiles(&records).unwrap();
        store.close().unwrap();
        path
    }

    #[test]
    fn test_counts() {
        let dir = TempDir::new().unwrap();
        let inspector = StoreInspector::open(populated(&dir)).unwrap();
        assert_eq!(inspector.tile_count().unwrap(), 3);
        assert_eq!(inspector.zoom_counts().unwrap(), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_metadata() {
        let dir = TempDir::new().unwrap();
        let inspector = StoreInspector::open(populated(&dir)).unwrap();
        let rows = inspector.metadata().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], ("maxzoom".to_string(), "2".to_string()));
        assert_eq!(
            inspector.metadata_value("name").unwrap(),
            Some("crops".to_string())
        );
        assert_eq!(inspector.metadata_value("missing").unwrap(), None);
    }

    #[test]
    fn test_tile_lookup() {
        let dir = TempDir::new().unwrap();
        let inspector = StoreInspector::open(populated(&dir)).unwrap();
        let address = TileAddress { zoom: 2, column: 2, row: 2 };
        assert_eq!(inspector.tile(address).unwrap(), Some(vec![3u8; 3]));
        let missing = TileAddress { zoom: 2, column: 0, row: 0 };
        assert_eq!(inspector.tile(missing).unwrap(), None);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = StoreInspector::open(dir.path().join("nope.mbtiles"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
