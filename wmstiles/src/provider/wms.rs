//! WMS GetMap request construction.
//!
//! # Request Parameters
//!
//! For every tile the builder emits:
//!
//! - `SERVICE=WMS`, `VERSION`, `REQUEST=GetMap`
//! - `LAYERS`, `STYLES=` (empty, server default style)
//! - `SRS` (1.1.1) or `CRS` (1.3.0)
//! - `BBOX` in the target reference, see below
//! - `WIDTH`, `HEIGHT`, `FORMAT`, `TRANSPARENT=TRUE`
//! - `TIME` when the dataset has a time dimension
//!
//! # Axis Order
//!
//! WMS 1.3.0 follows the EPSG axis order, which is latitude first for
//! EPSG:4326. Every other combination uses x/y (easting/northing or lon/lat).

use reqwest::Url;

use super::types::ProviderError;
use crate::coord::{tile_extent_degrees, tile_extent_mercator, Extent, TileCoord};
use crate::dataset::{WmsSource, WmsVersion};

/// Builds GetMap URLs for the tiles of one dataset.
///
/// The endpoint is parsed once; any query string it already carries is
/// preserved and the GetMap parameters are appended after it.
#[derive(Debug, Clone)]
pub struct GetMapBuilder {
    base: Url,
    source: WmsSource,
}

impl GetMapBuilder {
    pub fn new(source: &WmsSource) -> Result<Self, ProviderError> {
        let base = Url::parse(source.endpoint()).map_err(|e| ProviderError::InvalidUrl {
            url: source.endpoint().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base,
            source: source.clone(),
        })
    }

    /// The `BBOX` value for `tile`.
    pub fn bbox_param(&self, tile: &TileCoord) -> String {
        let srs = self.source.srs();
        if srs.is_geographic() {
            let e = tile_extent_degrees(tile);
            if self.source.version() == WmsVersion::V1_3_0 {
                // lat/lon
                return format!("{},{},{},{}", e.min_y, e.min_x, e.max_y, e.max_x);
            }
            return format_xy(&e);
        }
        format_xy(&tile_extent_mercator(tile))
    }

    /// The complete GetMap URL for `tile`.
    pub fn url(&self, tile: &TileCoord) -> String {
        let source = &self.source;
        let size = source.tile_size().to_string();
        let bbox = self.bbox_param(tile);

        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("SERVICE", "WMS")
                .append_pair("VERSION", source.version().as_str())
                .append_pair("REQUEST", "GetMap")
                .append_pair("LAYERS", source.layer())
                .append_pair("STYLES", "")
                .append_pair(source.version().srs_param(), source.srs().code())
                .append_pair("BBOX", &bbox)
                .append_pair("WIDTH", &size)
                .append_pair("HEIGHT", &size)
                .append_pair("FORMAT", source.format())
                .append_pair("TRANSPARENT", "TRUE");
            if let Some(time) = source.time() {
                query.append_pair("TIME", time);
            }
        }
        url.into()
    }
}

fn format_xy(e: &Extent) -> String {
    format!("{},{},{},{}", e.min_x, e.min_y, e.max_x, e.max_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SpatialRef;
    use std::collections::HashMap;

    fn params(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn source(version: WmsVersion, srs: SpatialRef) -> WmsSource {
        WmsSource::new("https://maps.example.org/wms", "crops:2020")
            .unwrap()
            .with_version(version)
            .with_srs(srs)
    }

    #[test]
    fn test_version_1_1_1_uses_srs() {
        let builder =
            GetMapBuilder::new(&source(WmsVersion::V1_1_1, SpatialRef::Epsg3857)).unwrap();
        let p = params(&builder.url(&TileCoord { zoom: 3, x: 4, y: 2 }));
        assert_eq!(p.get("VERSION").map(String::as_str), Some("1.1.1"));
        assert_eq!(p.get("SRS").map(String::as_str), Some("EPSG:3857"));
        assert!(!p.contains_key("CRS"));
    }

    #[test]
    fn test_version_1_3_0_uses_crs() {
        let builder =
            GetMapBuilder::new(&source(WmsVersion::V1_3_0, SpatialRef::Epsg3857)).unwrap();
        let p = params(&builder.url(&TileCoord { zoom: 3, x: 4, y: 2 }));
        assert_eq!(p.get("CRS").map(String::as_str), Some("EPSG:3857"));
        assert!(!p.contains_key("SRS"));
    }

    #[test]
    fn test_fixed_parameters() {
        let builder = GetMapBuilder::new(
            &source(WmsVersion::V1_3_0, SpatialRef::Epsg3857).with_time("2020-01-01"),
        )
        .unwrap();
        let p = params(&builder.url(&TileCoord { zoom: 0, x: 0, y: 0 }));
        assert_eq!(p["SERVICE"], "WMS");
        assert_eq!(p["REQUEST"], "GetMap");
        assert_eq!(p["LAYERS"], "crops:2020");
        assert_eq!(p["STYLES"], "");
        assert_eq!(p["WIDTH"], "256");
        assert_eq!(p["HEIGHT"], "256");
        assert_eq!(p["FORMAT"], "image/png");
        assert_eq!(p["TRANSPARENT"], "TRUE");
        assert_eq!(p["TIME"], "2020-01-01");
    }

    #[test]
    fn test_time_omitted_when_unset() {
        let builder =
            GetMapBuilder::new(&source(WmsVersion::V1_3_0, SpatialRef::Epsg3857)).unwrap();
        let p = params(&builder.url(&TileCoord { zoom: 0, x: 0, y: 0 }));
        assert!(!p.contains_key("TIME"));
    }

    #[test]
    fn test_existing_query_is_kept() {
        let source = WmsSource::new("https://maps.example.org/wms?map=crops&token=abc", "crops")
            .unwrap();
        let builder = GetMapBuilder::new(&source).unwrap();
        let p = params(&builder.url(&TileCoord { zoom: 1, x: 0, y: 0 }));
        assert_eq!(p["map"], "crops");
        assert_eq!(p["token"], "abc");
        assert_eq!(p["REQUEST"], "GetMap");
    }

    #[test]
    fn test_layer_is_percent_encoded() {
        let source = WmsSource::new("https://maps.example.org/wms", "land use & cover").unwrap();
        let url = GetMapBuilder::new(&source)
            .unwrap()
            .url(&TileCoord { zoom: 0, x: 0, y: 0 });
        assert!(!url.contains("land use & cover"));
        assert_eq!(params(&url)["LAYERS"], "land use & cover");
    }

    #[test]
    fn test_mercator_bbox_of_world_tile() {
        let builder =
            GetMapBuilder::new(&source(WmsVersion::V1_3_0, SpatialRef::Epsg3857)).unwrap();
        let bbox = builder.bbox_param(&TileCoord { zoom: 0, x: 0, y: 0 });
        let values: Vec<f64> = bbox.split(',').map(|v| v.parse().unwrap()).collect();
        let half = 20_037_508.342_789_244;
        assert!((values[0] + half).abs() < 1e-3);
        assert!((values[1] + half).abs() < 1e-3);
        assert!((values[2] - half).abs() < 1e-3);
        assert!((values[3] - half).abs() < 1e-3);
    }

    #[test]
    fn test_geographic_axis_order() {
        let tile = TileCoord { zoom: 1, x: 1, y: 0 };

        let v111 = GetMapBuilder::new(&source(WmsVersion::V1_1_1, SpatialRef::Epsg4326))
            .unwrap()
            .bbox_param(&tile);
        let xy: Vec<f64> = v111.split(',').map(|v| v.parse().unwrap()).collect();
        // lon first
        assert!(xy[0].abs() < 1e-9);
        assert!((xy[2] - 180.0).abs() < 1e-9);

        let v130 = GetMapBuilder::new(&source(WmsVersion::V1_3_0, SpatialRef::Epsg4326))
            .unwrap()
            .bbox_param(&tile);
        let yx: Vec<f64> = v130.split(',').map(|v| v.parse().unwrap()).collect();
        // lat first
        assert!(yx[0].abs() < 1e-9);
        assert!(yx[1].abs() < 1e-9);
        assert!((yx[2] - 85.0511).abs() < 1e-3);
        assert!((yx[3] - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_endpoint() {
        let source = WmsSource::new("not a url", "layer").unwrap();
        assert!(matches!(
            GetMapBuilder::new(&source),
            Err(ProviderError::InvalidUrl { .. })
        ));
    }
}
