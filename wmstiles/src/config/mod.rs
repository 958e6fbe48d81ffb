//! Configuration module
//!
//! Provides the download settings and the loader for dataset descriptor
//! files (INI).

mod download;
mod file;

pub use download::{Backoff, DownloadConfig};
pub use file::{expand_tilde, ConfigError, DatasetFile};
