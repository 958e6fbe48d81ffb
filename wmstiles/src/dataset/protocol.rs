//! WMS protocol versions and supported spatial references.

use std::fmt;
use std::str::FromStr;

use super::DatasetError;

/// WMS protocol version.
///
/// The version decides the name of the spatial reference parameter and, for
/// geographic references, the axis order of `BBOX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WmsVersion {
    /// WMS 1.1.1: `SRS=` parameter, always x/y (lon/lat) axis order
    V1_1_1,
    /// WMS 1.3.0: `CRS=` parameter, lat/lon axis order for EPSG:4326
    #[default]
    V1_3_0,
}

impl WmsVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            WmsVersion::V1_1_1 => "1.1.1",
            WmsVersion::V1_3_0 => "1.3.0",
        }
    }

    /// Name of the request parameter carrying the spatial reference.
    pub fn srs_param(&self) -> &'static str {
        match self {
            WmsVersion::V1_1_1 => "SRS",
            WmsVersion::V1_3_0 => "CRS",
        }
    }
}

impl fmt::Display for WmsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WmsVersion {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.1.1" => Ok(WmsVersion::V1_1_1),
            "1.3.0" => Ok(WmsVersion::V1_3_0),
            other => Err(DatasetError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// Spatial reference the remote service renders tiles in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpatialRef {
    /// Spherical Web Mercator
    #[default]
    Epsg3857,
    /// Legacy alias of Web Mercator still required by some servers
    Epsg900913,
    /// Geographic WGS84 (degrees)
    Epsg4326,
}

impl SpatialRef {
    pub fn code(&self) -> &'static str {
        match self {
            SpatialRef::Epsg3857 => "EPSG:3857",
            SpatialRef::Epsg900913 => "EPSG:900913",
            SpatialRef::Epsg4326 => "EPSG:4326",
        }
    }

    /// Whether coordinates are in degrees rather than projected metres.
    pub fn is_geographic(&self) -> bool {
        matches!(self, SpatialRef::Epsg4326)
    }
}

impl fmt::Display for SpatialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SpatialRef {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EPSG:3857" => Ok(SpatialRef::Epsg3857),
            "EPSG:900913" => Ok(SpatialRef::Epsg900913),
            "EPSG:4326" => Ok(SpatialRef::Epsg4326),
            _ => Err(DatasetError::UnsupportedSrs(s.trim().to_string())),
        }
    }
}
