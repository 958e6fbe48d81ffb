//! Dataset descriptors.
//!
//! A [`DatasetDescriptor`] is the immutable description of one acquisition
//! run: where to fetch from, which area and zoom levels, and how the result
//! is labelled in the tile store. It is built once (usually by
//! [`crate::config::DatasetFile`]) and shared read-only by every component.

mod naming;
mod protocol;

pub use naming::{substitute_year, LayerNaming, YEAR_PLACEHOLDER};
pub use protocol::{SpatialRef, WmsVersion};

use thiserror::Error;

use crate::coord::{BoundingBox, CoordError};
use crate::planner::ZoomRange;

/// Default tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default image MIME type.
pub const DEFAULT_FORMAT: &str = "image/png";

/// Default MBTiles `type`.
pub const DEFAULT_TILESET_TYPE: &str = "overlay";

/// Errors raised while assembling a dataset descriptor.
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("{field} contains a {{year}} placeholder but no year is configured")]
    MissingYear { field: &'static str },

    #[error("Unsupported WMS version '{0}' (expected 1.1.1 or 1.3.0)")]
    UnsupportedVersion(String),

    #[error("Unsupported spatial reference '{0}' (expected EPSG:3857, EPSG:900913 or EPSG:4326)")]
    UnsupportedSrs(String),

    #[error("Tile size must be greater than zero")]
    InvalidTileSize,

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error(transparent)]
    Coord(#[from] CoordError),
}

/// Remote WMS source of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct WmsSource {
    endpoint: String,
    layer: String,
    version: WmsVersion,
    srs: SpatialRef,
    format: String,
    tile_size: u32,
    time: Option<String>,
}

impl WmsSource {
    /// Creates a source with default version, SRS, format and tile size.
    ///
    /// `layer` must already be resolved; see [`LayerNaming`].
    pub fn new(
        endpoint: impl Into<String>,
        layer: impl Into<String>,
    ) -> Result<Self, DatasetError> {
        let endpoint = endpoint.into();
        let layer = layer.into();
        if endpoint.trim().is_empty() {
            return Err(DatasetError::Empty("WMS url"));
        }
        if layer.trim().is_empty() {
            return Err(DatasetError::Empty("WMS layer"));
        }
        Ok(Self {
            endpoint,
            layer,
            version: WmsVersion::default(),
            srs: SpatialRef::default(),
            format: DEFAULT_FORMAT.to_string(),
            tile_size: DEFAULT_TILE_SIZE,
            time: None,
        })
    }

    pub fn with_version(mut self, version: WmsVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_srs(mut self, srs: SpatialRef) -> Self {
        self.srs = srs;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Result<Self, DatasetError> {
        if tile_size == 0 {
            return Err(DatasetError::InvalidTileSize);
        }
        self.tile_size = tile_size;
        Ok(self)
    }

    /// Sets the value of the `TIME` dimension.
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn version(&self) -> WmsVersion {
        self.version
    }

    pub fn srs(&self) -> SpatialRef {
        self.srs
    }

    /// Image MIME type requested from the server.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    /// Short format name recorded in MBTiles metadata (`png`, `jpg`, ...).
    pub fn tile_format(&self) -> &str {
        let subtype = self
            .format
            .split_once('/')
            .map(|(_, sub)| sub)
            .unwrap_or(&self.format);
        // Strip parameters like "png; mode=8bit"
        let subtype = subtype.split(';').next().unwrap_or(subtype).trim();
        match subtype {
            "jpeg" => "jpg",
            other => other,
        }
    }
}

/// Everything needed to acquire one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDescriptor {
    name: String,
    bounds: BoundingBox,
    zooms: ZoomRange,
    source: WmsSource,
    tileset_type: String,
    description: Option<String>,
    attribution: Option<String>,
}

impl DatasetDescriptor {
    pub fn new(
        name: impl Into<String>,
        bounds: BoundingBox,
        zooms: ZoomRange,
        source: WmsSource,
    ) -> Result<Self, DatasetError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DatasetError::Empty("dataset name"));
        }
        Ok(Self {
            name,
            bounds,
            zooms,
            source,
            tileset_type: DEFAULT_TILESET_TYPE.to_string(),
            description: None,
            attribution: None,
        })
    }

    /// Sets the MBTiles `type` (`overlay` or `baselayer`).
    pub fn with_tileset_type(mut self, tileset_type: impl Into<String>) -> Self {
        self.tileset_type = tileset_type.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = Some(attribution.into());
        self
    }

    /// Replaces the zoom range, e.g. from a command-line override.
    pub fn with_zooms(mut self, zooms: ZoomRange) -> Self {
        self.zooms = zooms;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn zooms(&self) -> ZoomRange {
        self.zooms
    }

    pub fn source(&self) -> &WmsSource {
        &self.source
    }

    pub fn tileset_type(&self) -> &str {
        &self.tileset_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }

    /// Metadata rows written to the tile store, in insertion order.
    pub fn metadata(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("name", self.name.clone()),
            ("format", self.source.tile_format().to_string()),
            ("type", self.tileset_type.clone()),
            ("bounds", self.bounds.to_string()),
            ("minzoom", self.zooms.min().to_string()),
            ("maxzoom", self.zooms.max().to_string()),
        ];
        if let Some(description) = &self.description {
            rows.push(("description", description.clone()));
        }
        if let Some(attribution) = &self.attribution {
            rows.push(("attribution", attribution.clone()));
        }
        rows
    }
}
