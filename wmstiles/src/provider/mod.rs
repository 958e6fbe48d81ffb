//! WMS provider layer
//!
//! Builds GetMap requests for individual tiles and performs them through an
//! [`AsyncHttpClient`], which can be swapped for a mock in tests.

mod http;
mod types;
mod wms;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use types::ProviderError;
pub use wms::GetMapBuilder;

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
