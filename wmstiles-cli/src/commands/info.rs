//! Info command - describe a finished MBTiles file.

use std::path::Path;

use wmstiles::store::StoreInspector;

use crate::error::CliError;

/// Run the info command.
pub fn run(store: &Path) -> Result<(), CliError> {
    let inspector = StoreInspector::open(store)?;

    println!("Store: {}", store.display());
    println!();
    println!("Metadata:");
    for (name, value) in inspector.metadata()? {
        println!("  {:<12} {}", name, value);
    }

    println!();
    println!("Tiles:");
    let zooms = inspector.zoom_counts()?;
    if zooms.is_empty() {
        println!("  (none)");
    }
    for (zoom, count) in zooms {
        println!("  zoom {:>2}: {:>10}", zoom, count);
    }
    println!("  total:   {:>10}", inspector.tile_count()?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wmstiles::coord::TileCoord;
    use wmstiles::store::{MbtilesStore, TileRecord};

    #[test]
    fn test_info_on_written_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crops.mbtiles");
        let mut store = MbtilesStore::create(&path).unwrap();
        store.write_metadata(&[("name", "crops")]).unwrap();
        let address = TileCoord::new(3, 4, 2).unwrap().to_address();
        store
            .insert_tiles(&[TileRecord::new(address, vec![1u8; 128])])
            .unwrap();
        store.close().unwrap();

        assert!(run(&path).is_ok());
    }

    #[test]
    fn test_info_on_missing_store() {
        let dir = TempDir::new().unwrap();
        let err = run(&dir.path().join("absent.mbtiles")).unwrap_err();
        assert!(matches!(err, CliError::Store(_)));
    }
}
