//! Tile pyramid planning.
//!
//! Turns a geographic bounding box and an inclusive zoom range into the
//! complete, ordered list of XYZ tiles whose footprint intersects the box.
//! Planning is pure: the same inputs always produce the same plan, and the
//! resulting [`TilePlan`] is immutable so it can be shared by every worker
//! without locking.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::coord::{lat_to_tile_y, lon_to_tile_x, BoundingBox, CoordError, TileCoord, MAX_ZOOM};

/// Inclusive zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    min: u8,
    max: u8,
}

impl ZoomRange {
    /// Creates a zoom range, requiring `min <= max <= MAX_ZOOM`.
    pub fn new(min: u8, max: u8) -> Result<Self, CoordError> {
        if max > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(max));
        }
        if min > max {
            return Err(CoordError::InvalidZoom(min));
        }
        Ok(Self { min, max })
    }

    /// A range covering a single zoom level.
    pub fn single(zoom: u8) -> Result<Self, CoordError> {
        Self::new(zoom, zoom)
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn levels(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }
}

/// Tile index rectangle at a single zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
    pub zoom: u8,
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl LevelRange {
    /// Number of tiles in the rectangle.
    pub fn count(&self) -> usize {
        let cols = (self.x_max - self.x_min + 1) as usize;
        let rows = (self.y_max - self.y_min + 1) as usize;
        cols * rows
    }
}

/// The full set of tiles to fetch for one run.
#[derive(Debug, Clone)]
pub struct TilePlan {
    tiles: Arc<[TileCoord]>,
    levels: Vec<LevelRange>,
}

impl TilePlan {
    /// Tiles ordered by zoom, then row, then column.
    pub fn tiles(&self) -> &Arc<[TileCoord]> {
        &self.tiles
    }

    /// Per-zoom index rectangles, in zoom order.
    pub fn levels(&self) -> &[LevelRange] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl fmt::Display for TilePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in &self.levels {
            writeln!(
                f,
                "zoom {:>2}: x {}..={}, y {}..={} ({} tiles)",
                level.zoom,
                level.x_min,
                level.x_max,
                level.y_min,
                level.y_max,
                level.count()
            )?;
        }
        write!(f, "total: {} tiles", self.tiles.len())
    }
}

/// Index rectangle of the tiles intersecting `bbox` at `zoom`.
///
/// Only the enclosing tile rectangle is computed; tiles are not trimmed to
/// the exact shape of the box.
pub fn level_range(bbox: &BoundingBox, zoom: u8) -> LevelRange {
    LevelRange {
        zoom,
        x_min: lon_to_tile_x(bbox.west(), zoom),
        x_max: lon_to_tile_x(bbox.east(), zoom),
        // North maps to the smaller XYZ row
        y_min: lat_to_tile_y(bbox.north(), zoom),
        y_max: lat_to_tile_y(bbox.south(), zoom),
    }
}

/// Plans every tile intersecting `bbox` for each zoom in `zooms`.
pub fn plan(bbox: &BoundingBox, zooms: ZoomRange) -> TilePlan {
    let levels: Vec<LevelRange> = zooms.levels().map(|z| level_range(bbox, z)).collect();

    let total: usize = levels.iter().map(LevelRange::count).sum();
    let mut tiles = Vec::with_capacity(total);

    for level in &levels {
        for y in level.y_min..=level.y_max {
            for x in level.x_min..=level.x_max {
                tiles.push(TileCoord {
                    zoom: level.zoom,
                    x,
                    y,
                });
            }
        }
    }

    TilePlan {
        tiles: tiles.into(),
        levels,
    }
}
