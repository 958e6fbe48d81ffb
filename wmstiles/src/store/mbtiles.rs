//! MBTiles database creation and writes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tracing::{debug, info};

use super::error::{StoreError, StoreResult};
use super::TileRecord;

const SCHEMA: &str = "
    CREATE TABLE metadata (name TEXT, value TEXT, UNIQUE (name));
    CREATE TABLE tiles (
        zoom_level INTEGER,
        tile_column INTEGER,
        tile_row INTEGER,
        tile_data BLOB,
        UNIQUE (zoom_level, tile_column, tile_row)
    );
    CREATE UNIQUE INDEX tile_index ON tiles (zoom_level, tile_column, tile_row);
";

/// SQLite side files that belong to a database path.
const SIDE_FILE_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// An MBTiles database open for writing.
pub struct MbtilesStore {
    conn: Connection,
    path: PathBuf,
}

impl MbtilesStore {
    /// Creates a fresh, empty store at `path`.
    ///
    /// Any previous database at the path is deleted together with its
    /// journal and WAL files, so each run starts from an empty store.
    /// Missing parent directories are created.
    pub fn create(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        remove_if_exists(&path)?;
        for suffix in SIDE_FILE_SUFFIXES {
            let mut side = path.clone().into_os_string();
            side.push(suffix);
            remove_if_exists(Path::new(&side))?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path.display(), "Created tile store");

        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes all metadata rows in one transaction.
    pub fn write_metadata<K, V>(&mut self, rows: &[(K, V)]) -> StoreResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)")?;
            for (name, value) in rows {
                stmt.execute(params![name.as_ref(), value.as_ref()])?;
            }
        }
        tx.commit()?;
        debug!(rows = rows.len(), "Wrote store metadata");
        Ok(())
    }

    /// Inserts `records` in one transaction.
    ///
    /// A record for an address that already has a row replaces it.
    pub fn insert_tiles(&mut self, records: &[TileRecord]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO tiles (zoom_level, tile_column, tile_row, tile_data)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for record in records {
                let a = record.address;
                stmt.execute(params![a.zoom, a.column, a.row, &record.data[..]])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Closes the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }
}

fn remove_if_exists(path: &Path) -> StoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed previous store file");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StoreError::Reset {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileAddress;
    use tempfile::TempDir;

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_create_builds_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.mbtiles");
        MbtilesStore::create(&path).unwrap().close().unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "tiles"), 0);
        assert_eq!(count(&conn, "metadata"), 0);
        let index: String = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'index' AND name = 'tile_index'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(index, "tile_index");
    }

    #[test]
    fn test_create_removes_previous_store_and_side_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.mbtiles");

        let mut store = MbtilesStore::create(&path).unwrap();
        store
            .insert_tiles(&[TileRecord::new(
                TileAddress {
                    zoom: 1,
                    column: 0,
                    row: 1,
                },
                vec![1u8; 10],
            )])
            .unwrap();
        store.close().unwrap();
        fs::write(dir.path().join("out.mbtiles-journal"), b"stale").unwrap();

        MbtilesStore::create(&path).unwrap().close().unwrap();

        assert!(!dir.path().join("out.mbtiles-journal").exists());
        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "tiles"), 0);
    }

    #[test]
    fn test_create_makes_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/out.mbtiles");
        MbtilesStore::create(&path).unwrap().close().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_insert_replaces_existing_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.mbtiles");
        let address = TileAddress {
            zoom: 2,
            column: 1,
            row: 3,
        };

        let mut store = MbtilesStore::create(&path).unwrap();
        store
            .insert_tiles(&[TileRecord::new(address, vec![1u8; 4])])
            .unwrap();
        store
            .insert_tiles(&[TileRecord::new(address, vec![2u8; 4])])
            .unwrap();
        store.close().unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "tiles"), 1);
        let data: Vec<u8> = conn
            .query_row("SELECT tile_data FROM tiles", [], |r| r.get(0))
            .unwrap();
        assert_eq!(data, vec![2u8; 4]);
    }

    #[test]
    fn test_metadata_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.mbtiles");
        let mut store = MbtilesStore::create(&path).unwrap();
        store
            .write_metadata(&[("name", "crops"), ("format", "png")])
            .unwrap();
        store.close().unwrap();

        let conn = Connection::open(&path).unwrap();
        let name: String = conn
            .query_row("SELECT value FROM metadata WHERE name = 'name'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(name, "crops");
    }
}
