//! Coordinate type definitions

use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Supported zoom levels
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 24;

/// Tile coordinates in the XYZ (slippy map) scheme.
///
/// The origin is the top-left (north-west) corner of the projection and
/// `y` increases southward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Zoom level (0-24)
    pub zoom: u8,
    /// Column, 0 at west
    pub x: u32,
    /// Row, 0 at north
    pub y: u32,
}

impl TileCoord {
    /// Creates a tile coordinate, checking that `x` and `y` fit the zoom level.
    pub fn new(zoom: u8, x: u32, y: u32) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let n = tiles_per_axis(zoom);
        if x >= n || y >= n {
            return Err(CoordError::TileOutOfRange { zoom, x, y });
        }
        Ok(Self { zoom, x, y })
    }

    /// The TMS row of this tile.
    #[inline]
    pub fn tms_row(&self) -> u32 {
        flip_row(self.zoom, self.y)
    }

    /// The store-row key for this tile.
    #[inline]
    pub fn to_address(&self) -> TileAddress {
        TileAddress {
            zoom: self.zoom,
            column: self.x,
            row: self.tms_row(),
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Tile address in the TMS scheme, the key of a tile store row.
///
/// `row` counts from the bottom (south) of the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileAddress {
    pub zoom: u8,
    pub column: u32,
    pub row: u32,
}

impl TileAddress {
    /// Converts back to XYZ addressing.
    #[inline]
    pub fn to_coord(&self) -> TileCoord {
        TileCoord {
            zoom: self.zoom,
            x: self.column,
            y: flip_row(self.zoom, self.row),
        }
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "z{} c{} r{}", self.zoom, self.column, self.row)
    }
}

/// Number of tiles along one axis at `zoom`.
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom
}

/// Flips a row between XYZ and TMS addressing.
///
/// The mapping is its own inverse.
#[inline]
pub fn flip_row(zoom: u8, row: u32) -> u32 {
    (tiles_per_axis(zoom) - 1) - row
}

/// Geographic bounding box in degrees.
///
/// Boxes that cross the antimeridian (`west > east`) are rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl BoundingBox {
    /// Creates a validated bounding box.
    ///
    /// Latitudes beyond the Web Mercator limit are accepted here; the planner
    /// clamps them to the projection.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, CoordError> {
        for lon in [west, east] {
            if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }
        for lat in [south, north] {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        if west > east {
            return Err(CoordError::AntimeridianCrossing { west, east });
        }
        if south > north {
            return Err(CoordError::InvertedLatitudes { south, north });
        }
        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north(&self) -> f64 {
        self.north
    }
}

impl fmt::Display for BoundingBox {
    /// Formats as `west,south,east,north`, the MBTiles `bounds` layout.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude outside the accepted range
    InvalidLatitude(f64),
    /// Longitude outside -180..=180
    InvalidLongitude(f64),
    /// Zoom level above `MAX_ZOOM`
    InvalidZoom(u8),
    /// Tile index outside `0..2^zoom`
    TileOutOfRange { zoom: u8, x: u32, y: u32 },
    /// South edge lies north of the north edge
    InvertedLatitudes { south: f64, north: f64 },
    /// West edge lies east of the east edge
    AntimeridianCrossing { west: f64, east: f64 },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(f, "Invalid latitude: {} (must be between -90 and 90)", lat)
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::TileOutOfRange { zoom, x, y } => {
                write!(f, "Tile {}/{}/{} is outside the zoom {} grid", zoom, x, y, zoom)
            }
            CoordError::InvertedLatitudes { south, north } => {
                write!(f, "South edge {} lies north of north edge {}", south, north)
            }
            CoordError::AntimeridianCrossing { west, east } => {
                write!(
                    f,
                    "Bounding box crosses the antimeridian (west {} > east {}), \
                     which is not supported",
                    west, east
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
