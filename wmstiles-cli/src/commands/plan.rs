//! Plan command - show the tile pyramid of a dataset.

use std::path::Path;

use wmstiles::config::DatasetFile;
use wmstiles::dataset::DatasetDescriptor;
use wmstiles::planner::{level_range, LevelRange};

use crate::error::CliError;

/// Run the plan command.
///
/// Only index ranges are computed, so large pyramids are cheap to inspect.
pub fn run(dataset: &Path, year: Option<u16>) -> Result<(), CliError> {
    let file = DatasetFile::load_with_year(dataset, year)?;
    let descriptor = file.descriptor();

    println!("Dataset: {}", descriptor.name());
    if let Some(year) = file.year() {
        println!("  Year:   {}", year);
    }
    println!("  Layer:  {}", descriptor.source().layer());
    println!("  Bounds: {}", descriptor.bounds());
    println!("  Output: {}", file.output().display());
    println!();

    let levels = plan_levels(file.descriptor());
    for level in &levels {
        println!(
            "  zoom {:>2}: {:>10} tiles  (x {}..={}, y {}..={})",
            level.zoom,
            level.count(),
            level.x_min,
            level.x_max,
            level.y_min,
            level.y_max
        );
    }
    println!();
    println!("Total: {} tiles", total_tiles(&levels));

    Ok(())
}

fn plan_levels(descriptor: &DatasetDescriptor) -> Vec<LevelRange> {
    descriptor
        .zooms()
        .levels()
        .map(|zoom| level_range(descriptor.bounds(), zoom))
        .collect()
}

fn total_tiles(levels: &[LevelRange]) -> u64 {
    levels.iter().map(|l| l.count() as u64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DATASET: &str = "\
[dataset]
name = crops_{year}
year = 2020

[wms]
url = https://maps.example.org/wms
layer = crops_{year}

[bounds]
west = 0.1
south = 0.1
east = 56.0
north = 15.0

[zoom]
min = 4
max = 5
";

    #[test]
    fn test_levels_match_dataset_zooms() {
        let file = DatasetFile::parse(DATASET, None).unwrap();
        let levels = plan_levels(file.descriptor());

        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].zoom, 5);
        assert_eq!(levels[1].count(), 10);
        assert_eq!(total_tiles(&levels), levels[0].count() as u64 + 10);
    }

    #[test]
    fn test_run_reads_dataset_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crops.ini");
        fs::write(&path, DATASET).unwrap();

        assert!(run(&path, Some(2021)).is_ok());
    }

    #[test]
    fn test_missing_dataset_file() {
        let dir = TempDir::new().unwrap();
        let err = run(&dir.path().join("absent.ini"), None).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
