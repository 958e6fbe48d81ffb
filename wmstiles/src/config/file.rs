//! Dataset descriptor files.
//!
//! A dataset is described by an INI file:
//!
//! ```ini
//! [dataset]
//! name = crops
//! year = 2020
//!
//! [wms]
//! url = https://maps.example.org/wms
//! layer = crops_{year}
//! version = 1.3.0
//! srs = EPSG:3857
//!
//! [bounds]
//! west = 5.0
//! south = 45.0
//! east = 10.0
//! north = 48.0
//!
//! [zoom]
//! min = 5
//! max = 12
//! ```
//!
//! Optional sections are `[layer_naming]` (a year cutoff between two layer
//! templates), `[download]` (overrides of [`DownloadConfig`]) and
//! `[output]`. `{year}` placeholders in the dataset name, url, layer, time
//! and output path are substituted while loading.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, Properties};
use thiserror::Error;

use super::download::{Backoff, DownloadConfig};
use crate::coord::BoundingBox;
use crate::dataset::{
    substitute_year, DatasetDescriptor, DatasetError, LayerNaming, SpatialRef, WmsSource,
    WmsVersion,
};
use crate::planner::ZoomRange;
use crate::store::MAX_BATCH_SIZE;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Dataset file does not exist
    #[error("Dataset file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read dataset file
    #[error("Failed to read dataset file: {0}")]
    ReadError(#[from] ini::Error),

    /// Dataset file is not valid INI
    #[error("Failed to parse dataset file: {0}")]
    ParseError(#[from] ini::ParseError),

    /// Required key is absent or empty
    #[error("Missing required setting: {section}.{key}")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Values are individually valid but do not form a dataset
    #[error("Invalid dataset: {0}")]
    Dataset(#[from] DatasetError),
}

/// A loaded dataset file.
#[derive(Debug, Clone)]
pub struct DatasetFile {
    descriptor: DatasetDescriptor,
    download: DownloadConfig,
    output: PathBuf,
    year: Option<u16>,
}

impl DatasetFile {
    /// Loads a dataset file using the year it configures, if any.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_year(path, None)
    }

    /// Loads a dataset file; `year` replaces the `[dataset] year` setting.
    pub fn load_with_year(path: &Path, year: Option<u16>) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let ini = Ini::load_from_file(path)?;
        Self::from_ini(&ini, year)
    }

    /// Parses dataset file content.
    pub fn parse(content: &str, year: Option<u16>) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content)?;
        Self::from_ini(&ini, year)
    }

    pub fn descriptor(&self) -> &DatasetDescriptor {
        &self.descriptor
    }

    pub fn download(&self) -> &DownloadConfig {
        &self.download
    }

    /// Store path: `[output] path`, or `<name>.mbtiles` in the working
    /// directory.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Year the placeholders were resolved with.
    pub fn year(&self) -> Option<u16> {
        self.year
    }

    /// Splits the file into its parts.
    pub fn into_parts(self) -> (DatasetDescriptor, DownloadConfig, PathBuf) {
        (self.descriptor, self.download, self.output)
    }

    fn from_ini(ini: &Ini, year_override: Option<u16>) -> Result<Self, ConfigError> {
        let dataset = section(ini, "dataset")?;
        let year = match year_override {
            Some(year) => Some(year),
            None => optional(dataset, "year")
                .map(|v| parse_value("dataset", "year", v, "expected a year like 2020"))
                .transpose()?,
        };

        let name = substitute_year(required(dataset, "dataset", "name")?, year, "name")?;
        let source = parse_source(ini, year)?;
        let bounds = parse_bounds(ini)?;
        let zooms = parse_zooms(ini)?;

        let mut descriptor = DatasetDescriptor::new(name, bounds, zooms, source)?;
        if let Some(v) = optional(dataset, "type") {
            if v != "overlay" && v != "baselayer" {
                return Err(invalid("dataset", "type", v, "must be overlay or baselayer"));
            }
            descriptor = descriptor.with_tileset_type(v);
        }
        if let Some(v) = optional(dataset, "description") {
            descriptor = descriptor.with_description(v);
        }
        if let Some(v) = optional(dataset, "attribution") {
            descriptor = descriptor.with_attribution(v);
        }

        let download = parse_download(ini)?;

        let output = match ini.section(Some("output")).and_then(|s| optional(s, "path")) {
            Some(path) => expand_tilde(&substitute_year(path, year, "output path")?),
            None => PathBuf::from(format!("{}.mbtiles", descriptor.name())),
        };

        Ok(Self {
            descriptor,
            download,
            output,
            year,
        })
    }
}

fn parse_source(ini: &Ini, year: Option<u16>) -> Result<WmsSource, ConfigError> {
    let wms = section(ini, "wms")?;

    let url = substitute_year(required(wms, "wms", "url")?, year, "url")?;

    let naming = match ini.section(Some("layer_naming")) {
        Some(naming) => LayerNaming::YearCutoff {
            cutoff_year: parse_value(
                "layer_naming",
                "cutoff_year",
                required(naming, "layer_naming", "cutoff_year")?,
                "expected a year like 2018",
            )?,
            before: required(naming, "layer_naming", "before")?.to_string(),
            after: required(naming, "layer_naming", "after")?.to_string(),
        },
        None => LayerNaming::Template(required(wms, "wms", "layer")?.to_string()),
    };
    let layer = naming.resolve(year)?;

    let mut source = WmsSource::new(url, layer)?;
    if let Some(v) = optional(wms, "version") {
        source = source.with_version(v.parse::<WmsVersion>()?);
    }
    if let Some(v) = optional(wms, "srs") {
        source = source.with_srs(v.parse::<SpatialRef>()?);
    }
    if let Some(v) = optional(wms, "format") {
        if !v.contains('/') {
            return Err(invalid("wms", "format", v, "expected a MIME type like image/png"));
        }
        source = source.with_format(v);
    }
    if let Some(v) = optional(wms, "tile_size") {
        let size: u32 = parse_value("wms", "tile_size", v, "expected a pixel size like 256")?;
        source = source.with_tile_size(size)?;
    }
    if let Some(v) = optional(wms, "time") {
        source = source.with_time(substitute_year(v, year, "time")?);
    }
    Ok(source)
}

fn parse_bounds(ini: &Ini) -> Result<BoundingBox, ConfigError> {
    let bounds = section(ini, "bounds")?;
    let edge = |key: &'static str| -> Result<f64, ConfigError> {
        parse_value("bounds", key, required(bounds, "bounds", key)?, "expected degrees")
    };
    let (west, south, east, north) = (edge("west")?, edge("south")?, edge("east")?, edge("north")?);
    BoundingBox::new(west, south, east, north).map_err(|e| ConfigError::Dataset(e.into()))
}

fn parse_zooms(ini: &Ini) -> Result<ZoomRange, ConfigError> {
    let zoom = section(ini, "zoom")?;
    let min: u8 = parse_value("zoom", "min", required(zoom, "zoom", "min")?, "expected 0-24")?;
    let max: u8 = parse_value("zoom", "max", required(zoom, "zoom", "max")?, "expected 0-24")?;
    ZoomRange::new(min, max).map_err(|e| ConfigError::Dataset(e.into()))
}

fn parse_download(ini: &Ini) -> Result<DownloadConfig, ConfigError> {
    let mut config = DownloadConfig::default();
    let Some(s) = ini.section(Some("download")) else {
        return Ok(config);
    };

    if let Some(v) = optional(s, "parallel") {
        let parallel: usize = parse_value("download", "parallel", v, "expected a positive count")?;
        if parallel == 0 {
            return Err(invalid("download", "parallel", v, "must be at least 1"));
        }
        config = config.with_parallel_downloads(parallel);
    }
    if let Some(v) = optional(s, "max_attempts") {
        let attempts: u32 = parse_value("download", "max_attempts", v, "expected a count")?;
        if attempts == 0 {
            return Err(invalid("download", "max_attempts", v, "must be at least 1"));
        }
        config = config.with_max_attempts(attempts);
    }
    if let Some(v) = optional(s, "retry_delay_ms") {
        config = config.with_retry_delay_ms(parse_value(
            "download",
            "retry_delay_ms",
            v,
            "expected milliseconds",
        )?);
    }
    if let Some(v) = optional(s, "timeout_secs") {
        config = config.with_timeout_secs(parse_value(
            "download",
            "timeout_secs",
            v,
            "expected seconds",
        )?);
    }
    if let Some(v) = optional(s, "min_payload_bytes") {
        config = config.with_min_payload_bytes(parse_value(
            "download",
            "min_payload_bytes",
            v,
            "expected a byte count",
        )?);
    }
    if let Some(v) = optional(s, "batch_size") {
        let batch: usize = parse_value("download", "batch_size", v, "expected a count")?;
        if !(1..=MAX_BATCH_SIZE).contains(&batch) {
            return Err(invalid(
                "download",
                "batch_size",
                v,
                &format!("must be between 1 and {}", MAX_BATCH_SIZE),
            ));
        }
        config = config.with_batch_size(batch);
    }
    if let Some(v) = optional(s, "backoff") {
        let backoff: Backoff = v
            .parse()
            .map_err(|_| invalid("download", "backoff", v, "must be fixed or exponential"))?;
        config = config.with_backoff(backoff);
    }
    if let Some(v) = optional(s, "progress_interval") {
        config = config.with_progress_interval(parse_value(
            "download",
            "progress_interval",
            v,
            "expected a count",
        )?);
    }
    Ok(config)
}

fn section<'a>(ini: &'a Ini, name: &'static str) -> Result<&'a Properties, ConfigError> {
    ini.section(Some(name)).ok_or(ConfigError::MissingKey {
        section: name,
        key: "*",
    })
}

fn optional<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(
    props: &'a Properties,
    section: &'static str,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    optional(props, key).ok_or(ConfigError::MissingKey { section, key })
}

fn parse_value<T: FromStr>(
    section: &'static str,
    key: &'static str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(section, key, value, reason))
}

fn invalid(section: &'static str, key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expands a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
