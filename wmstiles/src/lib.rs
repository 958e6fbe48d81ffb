//! WmsTiles - WMS imagery acquisition into MBTiles stores
//!
//! This library downloads the tile pyramid of a dataset from an OGC Web Map
//! Service and persists it as a single MBTiles file.
//!
//! # High-Level API
//!
//! The [`pipeline`] module drives a complete run:
//!
//! ```ignore
//! use wmstiles::config::DatasetFile;
//! use wmstiles::pipeline::Pipeline;
//!
//! let (descriptor, download, output) = DatasetFile::load(path)?.into_parts();
//! let summary = Pipeline::for_wms(descriptor, download, output)?.run().await?;
//! println!("{}", summary);
//! ```

pub mod config;
pub mod coord;
pub mod dataset;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod planner;
pub mod pool;
pub mod progress;
pub mod provider;
pub mod store;

/// Version of the WmsTiles library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
