//! Tile fetching with retries.
//!
//! A [`TileFetcher`] turns one [`TileCoord`] into a [`TileOutcome`]: it
//! builds the GetMap request, performs it through an [`AsyncHttpClient`],
//! rejects undersized bodies and retries according to a [`RetryPolicy`].
//! A failed tile is reported as data and never aborts the run.

mod retry;

pub use retry::{
    RetryPolicy, BACKOFF_MULTIPLIER, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS,
    MAX_BACKOFF_DELAY,
};

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::coord::TileCoord;
use crate::dataset::WmsSource;
use crate::provider::{AsyncHttpClient, GetMapBuilder, ProviderError};
use crate::store::TileRecord;

/// Smallest response body accepted as a tile, in bytes.
///
/// Servers commonly answer errors with a tiny image or an XML exception
/// that still carries a 200 status.
pub const DEFAULT_MIN_PAYLOAD_BYTES: usize = 100;

/// A tile that could not be fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub coord: TileCoord,
    /// Attempts made, including the first.
    pub attempts: u32,
    /// Error of the last attempt.
    pub error: ProviderError,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} attempt(s): {}",
            self.coord, self.attempts, self.error
        )
    }
}

/// Result of fetching one tile.
#[derive(Debug, Clone, PartialEq)]
pub enum TileOutcome {
    Fetched(TileRecord),
    Failed(FetchFailure),
}

impl TileOutcome {
    /// XYZ coordinate the outcome belongs to.
    pub fn coord(&self) -> TileCoord {
        match self {
            TileOutcome::Fetched(record) => record.address.to_coord(),
            TileOutcome::Failed(failure) => failure.coord,
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, TileOutcome::Fetched(_))
    }
}

/// Something that can fetch a tile.
///
/// Implemented by [`TileFetcher`]; tests and alternative sources can provide
/// their own implementation to drive the pool and pipeline.
pub trait TileFetch: Send + Sync {
    fn fetch(&self, tile: TileCoord) -> impl Future<Output = TileOutcome> + Send;
}

/// Fetches tiles from a WMS source.
pub struct TileFetcher<C: AsyncHttpClient> {
    client: C,
    requests: GetMapBuilder,
    retry: RetryPolicy,
    min_payload_bytes: usize,
}

impl<C: AsyncHttpClient> TileFetcher<C> {
    /// Creates a fetcher with the default retry policy and payload minimum.
    pub fn new(client: C, source: &WmsSource) -> Result<Self, ProviderError> {
        Ok(Self {
            client,
            requests: GetMapBuilder::new(source)?,
            retry: RetryPolicy::default(),
            min_payload_bytes: DEFAULT_MIN_PAYLOAD_BYTES,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_min_payload_bytes(mut self, min: usize) -> Self {
        self.min_payload_bytes = min;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn attempt(&self, url: &str) -> Result<Bytes, ProviderError> {
        let body = self.client.get(url).await?;
        if body.len() < self.min_payload_bytes {
            return Err(ProviderError::TooSmall {
                len: body.len(),
                min: self.min_payload_bytes,
            });
        }
        Ok(body)
    }
}

impl<C: AsyncHttpClient> TileFetch for TileFetcher<C> {
    async fn fetch(&self, tile: TileCoord) -> TileOutcome {
        let url = self.requests.url(&tile);
        let mut attempt = 1u32;

        loop {
            match self.attempt(&url).await {
                Ok(data) => {
                    debug!(
                        zoom = tile.zoom,
                        x = tile.x,
                        y = tile.y,
                        bytes = data.len(),
                        attempt,
                        "Tile fetched"
                    );
                    return TileOutcome::Fetched(TileRecord::new(tile.to_address(), data));
                }
                Err(error) => match self.retry.delay_for_attempt(attempt) {
                    Some(delay) => {
                        debug!(
                            zoom = tile.zoom,
                            x = tile.x,
                            y = tile.y,
                            attempt,
                            error = %error,
                            delay_ms = delay.as_millis() as u64,
                            "Tile fetch failed, retrying"
                        );
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        attempt += 1;
                    }
                    None => {
                        warn!(
                            zoom = tile.zoom,
                            x = tile.x,
                            y = tile.y,
                            attempts = attempt,
                            error = %error,
                            "Tile fetch failed"
                        );
                        return TileOutcome::Failed(FetchFailure {
                            coord: tile,
                            attempts: attempt,
                            error,
                        });
                    }
                },
            }
        }
    }
}
