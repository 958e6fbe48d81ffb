//! Bounded-concurrency fetch driver.
//!
//! The pool runs a [`TileFetch`] over every tile of a plan with at most
//! `concurrency` requests in flight and yields outcomes in completion order.
//! A slow tile never holds back others while there is free capacity.

use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::coord::TileCoord;
use crate::fetch::{TileFetch, TileOutcome};

/// Default number of concurrent tile requests.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Runs tile fetches with a concurrency ceiling.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    concurrency: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl WorkerPool {
    /// Creates a pool; a concurrency of zero is treated as one.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches `tiles`, yielding each outcome as soon as it completes.
    ///
    /// Once `cancel` fires no new fetch is started; fetches already in
    /// flight still run to completion and are yielded.
    pub fn run<'a, F: TileFetch>(
        &self,
        fetcher: &'a F,
        tiles: Arc<[TileCoord]>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = TileOutcome> + Send + 'a {
        let count = tiles.len();
        stream::iter((0..count).map(move |i| tiles[i]))
            .take_until(cancel.cancelled_owned())
            .map(move |tile| fetcher.fetch(tile))
            .buffer_unordered(self.concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use crate::fetch::FetchFailure;
    use crate::store::TileRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fetcher that tracks how many fetches overlap.
    #[derive(Default)]
    struct GaugeFetcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        started: AtomicUsize,
    }

    impl TileFetch for GaugeFetcher {
        async fn fetch(&self, tile: TileCoord) -> TileOutcome {
            self.started.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            // Later tiles finish sooner
            let delay = 50u64.saturating_sub(tile.x as u64 * 5);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if tile.x % 2 == 0 {
                TileOutcome::Fetched(TileRecord::new(tile.to_address(), vec![0u8; 4]))
            } else {
                TileOutcome::Failed(FetchFailure {
                    coord: tile,
                    attempts: 1,
                    error: ProviderError::HttpError("odd".to_string()),
                })
            }
        }
    }

    fn row_of_tiles(n: u32) -> Arc<[TileCoord]> {
        (0..n).map(|x| TileCoord { zoom: 5, x, y: 0 }).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_respects_concurrency_ceiling() {
        let fetcher = GaugeFetcher::default();
        let pool = WorkerPool::new(3);

        let outcomes: Vec<TileOutcome> = pool
            .run(&fetcher, row_of_tiles(10), CancellationToken::new())
            .collect()
            .await;

        assert_eq!(outcomes.len(), 10);
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 3);
        assert_eq!(outcomes.iter().filter(|o| o.is_fetched()).count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_yields_in_completion_order() {
        let fetcher = GaugeFetcher::default();
        let pool = WorkerPool::new(4);

        let order: Vec<u32> = pool
            .run(&fetcher, row_of_tiles(4), CancellationToken::new())
            .map(|o| o.coord().x)
            .collect()
            .await;

        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_pool_starts_nothing() {
        let fetcher = GaugeFetcher::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcomes: Vec<TileOutcome> = WorkerPool::new(2)
            .run(&fetcher, row_of_tiles(10), cancel)
            .collect()
            .await;

        assert!(outcomes.is_empty());
        assert_eq!(fetcher.started.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        assert_eq!(WorkerPool::new(0).concurrency(), 1);
        assert_eq!(WorkerPool::default().concurrency(), 8);
    }
}
