//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`fetch`] - Download a dataset into an MBTiles file
//! - [`plan`] - Show the tile pyramid of a dataset without downloading
//! - [`info`] - Describe a finished MBTiles file

pub mod fetch;
pub mod info;
pub mod plan;
