//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude),
//! Web Mercator tile indices, and projected tile extents used when building
//! WMS requests.

mod types;

pub use types::{
    flip_row, tiles_per_axis, BoundingBox, CoordError, TileAddress, TileCoord, MAX_LAT, MAX_LON,
    MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// WGS84 semi-major axis used by spherical Web Mercator (EPSG:3857).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Axis-aligned rectangle in some spatial reference.
///
/// For geographic extents `x` is longitude and `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Converts a longitude to a tile column, clamped to the zoom grid.
///
/// A longitude of exactly 180° would land one past the last column and is
/// clamped onto it.
#[inline]
pub fn lon_to_tile_x(lon: f64, zoom: u8) -> u32 {
    let n = tiles_per_axis(zoom) as f64;
    let x = ((lon + 180.0) / 360.0 * n).floor();
    clamp_index(x, zoom)
}

/// Converts a latitude to a tile row (XYZ), clamped to the zoom grid.
///
/// Latitudes beyond the Web Mercator limit map outside the grid and are
/// clamped to the first or last row.
#[inline]
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> u32 {
    let n = tiles_per_axis(zoom) as f64;
    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor();
    clamp_index(y, zoom)
}

fn clamp_index(value: f64, zoom: u8) -> u32 {
    let max = (tiles_per_axis(zoom) - 1) as f64;
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, max) as u32
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    corner_to_lat_lon(tile.x, tile.y, tile.zoom)
}

fn corner_to_lat_lon(x: u32, y: u32, zoom: u8) -> (f64, f64) {
    let n = tiles_per_axis(zoom) as f64;

    let lon = x as f64 / n * 360.0 - 180.0;

    let y = y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();

    (lat_rad.to_degrees(), lon)
}

/// Geographic extent of a tile in degrees.
pub fn tile_extent_degrees(tile: &TileCoord) -> Extent {
    let (north, west) = corner_to_lat_lon(tile.x, tile.y, tile.zoom);
    let (south, east) = corner_to_lat_lon(tile.x + 1, tile.y + 1, tile.zoom);
    Extent {
        min_x: west,
        min_y: south,
        max_x: east,
        max_y: north,
    }
}

/// Extent of a tile in Web Mercator metres.
///
/// Goes through the tile's geographic corners, so it is consistent with
/// [`tile_extent_degrees`].
pub fn tile_extent_mercator(tile: &TileCoord) -> Extent {
    let geo = tile_extent_degrees(tile);
    let (min_x, min_y) = lon_lat_to_mercator(geo.min_x, geo.min_y);
    let (max_x, max_y) = lon_lat_to_mercator(geo.max_x, geo.max_y);
    Extent {
        min_x,
        min_y,
        max_x,
        max_y,
    }
}

/// Projects a geographic position to Web Mercator metres.
#[inline]
pub fn lon_lat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        assert_eq!(lon_to_tile_x(-74.0060, 16), 19295);
        assert_eq!(lat_to_tile_y(40.7128, 16), 24640);
    }

    #[test]
    fn test_clamps_polar_latitudes() {
        assert_eq!(lat_to_tile_y(90.0, 4), 0);
        assert_eq!(lat_to_tile_y(-90.0, 4), 15);
        assert_eq!(lat_to_tile_y(89.0, 10), 0);
    }

    #[test]
    fn test_clamps_east_edge() {
        assert_eq!(lon_to_tile_x(180.0, 3), 7);
        assert_eq!(lon_to_tile_x(-180.0, 3), 0);
    }

    #[test]
    fn test_tile_to_lat_lon_northwest_corner() {
        let tile = TileCoord {
            zoom: 16,
            x: 19295,
            y: 24640,
        };

        let (lat, lon) = tile_to_lat_lon(&tile);

        assert!((lat - 40.713).abs() < 0.01, "Latitude should be close to 40.713");
        assert!(
            (lon - (-74.007)).abs() < 0.01,
            "Longitude should be close to -74.007"
        );
    }

    #[test]
    fn test_world_tile_mercator_extent() {
        let tile = TileCoord { zoom: 0, x: 0, y: 0 };
        let extent = tile_extent_mercator(&tile);
        let half = 20_037_508.342_789_244;
        assert!((extent.min_x + half).abs() < 1e-3);
        assert!((extent.max_x - half).abs() < 1e-3);
        assert!((extent.min_y + half).abs() < 1e-3);
        assert!((extent.max_y - half).abs() < 1e-3);
    }

    #[test]
    fn test_quadrant_extent_degrees() {
        // Zoom 1, top-right quadrant
        let tile = TileCoord { zoom: 1, x: 1, y: 0 };
        let extent = tile_extent_degrees(&tile);
        assert!((extent.min_x - 0.0).abs() < 1e-9);
        assert!((extent.max_x - 180.0).abs() < 1e-9);
        assert!(extent.min_y.abs() < 1e-9);
        assert!((extent.max_y - MAX_LAT).abs() < 1e-6);
    }

    #[test]
    fn test_mercator_origin() {
        let (x, y) = lon_lat_to_mercator(0.0, 0.0);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_indices_in_bounds(
                lat in -90.0..90.0_f64,
                lon in -180.0..=180.0_f64,
                zoom in 0u8..=MAX_ZOOM
            ) {
                let max_tile = tiles_per_axis(zoom);
                prop_assert!(lon_to_tile_x(lon, zoom) < max_tile);
                prop_assert!(lat_to_tile_y(lat, zoom) < max_tile);
            }

            #[test]
            fn test_flip_row_is_involution(
                row_raw in 0u32..u32::MAX,
                zoom in 0u8..=MAX_ZOOM
            ) {
                let row = row_raw % tiles_per_axis(zoom);
                prop_assert_eq!(flip_row(zoom, flip_row(zoom, row)), row);
            }

            #[test]
            fn test_position_lies_inside_its_tile(
                lat in -85.0..85.0_f64,
                lon in -179.9..179.9_f64,
                zoom in 0u8..=18
            ) {
                let tile = TileCoord {
                    zoom,
                    x: lon_to_tile_x(lon, zoom),
                    y: lat_to_tile_y(lat, zoom),
                };
                let extent = tile_extent_degrees(&tile);
                prop_assert!(extent.min_x <= lon + 1e-9 && lon <= extent.max_x + 1e-9);
                prop_assert!(extent.min_y <= lat + 1e-9 && lat <= extent.max_y + 1e-9);
            }

            #[test]
            fn test_longitude_monotonic(
                lon1 in -180.0..-90.0_f64,
                lon2 in -90.0..0.0_f64,
                zoom in 10u8..=15
            ) {
                prop_assert!(lon_to_tile_x(lon1, zoom) < lon_to_tile_x(lon2, zoom));
            }
        }
    }
}
