//! Provider error types

use thiserror::Error;

/// Errors that can occur while requesting a tile from a remote service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Transport failure or non-success HTTP status
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request exceeded the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response body shorter than the accepted minimum
    #[error("Response too small: {len} bytes (minimum {min})")]
    TooSmall { len: usize, min: usize },

    /// Endpoint URL could not be parsed
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
