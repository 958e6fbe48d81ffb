//! Acquisition pipeline.
//!
//! A [`Pipeline`] plans the tile pyramid of one dataset, fetches the tiles
//! through a [`WorkerPool`] and streams every fetched tile to a single store
//! writer. Fetching and writing overlap; the summary is built only after the
//! pool is drained and the writer's last batch is committed.
//!
//! Progress of the run is published as a [`PipelineState`] on a
//! `tokio::sync::watch` channel, see [`Pipeline::subscribe`].

mod error;
mod state;
mod summary;

pub use error::PipelineError;
pub use state::PipelineState;
pub use summary::{RunSummary, MAX_LISTED_FAILURES};

use std::mem;
use std::path::{Path, PathBuf};
use std::pin::pin;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DownloadConfig;
use crate::dataset::DatasetDescriptor;
use crate::fetch::{TileFetch, TileFetcher, TileOutcome};
use crate::planner;
use crate::pool::WorkerPool;
use crate::progress::{ProgressReporter, ProgressSink, TracingProgressSink};
use crate::provider::AsyncReqwestClient;
use crate::store::{spawn_writer, MbtilesStore, MAX_BATCH_SIZE};

/// Upper bound of records queued between the fetchers and the writer.
const MAX_QUEUED_RECORDS: usize = 1024;

/// Downloads one dataset into one MBTiles file.
pub struct Pipeline<F: TileFetch> {
    descriptor: Arc<DatasetDescriptor>,
    fetcher: F,
    output: PathBuf,
    config: DownloadConfig,
    sink: Box<dyn ProgressSink>,
    state: watch::Sender<PipelineState>,
    cancel: Option<CancellationToken>,
}

impl Pipeline<TileFetcher<AsyncReqwestClient>> {
    /// Creates a pipeline fetching from the descriptor's WMS source over HTTP.
    ///
    /// Timeout, retry policy and payload minimum are taken from `config`.
    pub fn for_wms(
        descriptor: DatasetDescriptor,
        config: DownloadConfig,
        output: impl Into<PathBuf>,
    ) -> Result<Self, PipelineError> {
        let client = AsyncReqwestClient::with_timeout(config.timeout_secs())?;
        let fetcher = TileFetcher::new(client, descriptor.source())?
            .with_retry_policy(config.retry_policy())
            .with_min_payload_bytes(config.min_payload_bytes());
        Ok(Self::new(descriptor, fetcher, output).with_config(config))
    }
}

impl<F: TileFetch> Pipeline<F> {
    pub fn new(
        descriptor: impl Into<Arc<DatasetDescriptor>>,
        fetcher: F,
        output: impl Into<PathBuf>,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            descriptor: descriptor.into(),
            fetcher,
            output: output.into(),
            config: DownloadConfig::default(),
            sink: Box::new(TracingProgressSink),
            state,
            cancel: None,
        }
    }

    /// Sets concurrency, batch size and progress interval.
    ///
    /// Retry and timeout settings belong to the fetcher and are not applied
    /// here.
    pub fn with_config(mut self, config: DownloadConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_progress_sink(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Lets `cancel` stop the run early.
    ///
    /// After cancellation no new fetch is started. Tiles already fetched are
    /// still written and the run ends with [`PipelineError::Cancelled`].
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Watches the state of the run.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn descriptor(&self) -> &DatasetDescriptor {
        &self.descriptor
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Runs the pipeline to completion.
    ///
    /// Succeeds when at least one tile was written, or when the plan is
    /// empty. Failed tiles do not fail the run; they are listed in the
    /// returned [`RunSummary`].
    pub async fn run(mut self) -> Result<RunSummary, PipelineError> {
        let sink = mem::replace(&mut self.sink, Box::new(TracingProgressSink));
        let result = self.execute(sink).await;
        match &result {
            Ok(summary) => {
                self.transition(PipelineState::Done);
                info!(
                    dataset = self.descriptor.name(),
                    downloaded = summary.downloaded,
                    failed = summary.failed,
                    "Run complete"
                );
            }
            Err(e) => {
                self.transition(PipelineState::Failed);
                warn!(dataset = self.descriptor.name(), error = %e, "Run failed");
            }
        }
        result
    }

    async fn execute(&self, sink: Box<dyn ProgressSink>) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();

        self.transition(PipelineState::Planning);
        let plan = planner::plan(self.descriptor.bounds(), self.descriptor.zooms());
        info!(
            dataset = self.descriptor.name(),
            tiles = plan.len(),
            "Planned {}",
            plan
        );

        let mut store = MbtilesStore::create(&self.output)?;
        store.write_metadata(&self.descriptor.metadata())?;
        debug!(path = %self.output.display(), "Store created");

        if plan.is_empty() {
            warn!(
                dataset = self.descriptor.name(),
                bounds = %self.descriptor.bounds(),
                "Tile plan is empty, nothing to fetch"
            );
            store.close()?;
            self.transition(PipelineState::Finalizing);
            return Ok(RunSummary {
                planned: 0,
                downloaded: 0,
                failed: 0,
                failed_tiles: Vec::new(),
                bytes_written: 0,
                elapsed: started.elapsed(),
            });
        }

        self.transition(PipelineState::Fetching);
        let batch_size = self.config.batch_size().clamp(1, MAX_BATCH_SIZE);
        let (tx, rx) = mpsc::channel(batch_size.saturating_mul(2).min(MAX_QUEUED_RECORDS));
        let writer = spawn_writer(store, batch_size, rx);

        let cancel = self.cancel.clone().unwrap_or_default();
        let pool = WorkerPool::new(self.config.parallel_downloads());
        let mut reporter = ProgressReporter::new(plan.len(), self.config.progress_interval(), sink);

        let mut downloaded = 0usize;
        let mut failed_tiles = Vec::new();
        let mut outcomes = pin!(pool.run(&self.fetcher, Arc::clone(plan.tiles()), cancel.clone()));

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                TileOutcome::Fetched(record) => {
                    if tx.send(record).await.is_err() {
                        // Writer stopped; its error is collected below
                        warn!("Store writer stopped, abandoning remaining tiles");
                        break;
                    }
                    downloaded += 1;
                    reporter.record(true);
                }
                TileOutcome::Failed(failure) => {
                    failed_tiles.push(failure);
                    reporter.record(false);
                }
            }
        }
        reporter.finish();
        drop(tx);

        self.transition(PipelineState::Writing);
        let stats = match writer.await {
            Ok(result) => result?,
            Err(e) => return Err(PipelineError::TaskFailed(e.to_string())),
        };
        debug!(
            records = stats.records,
            batches = stats.batches,
            "Writer finished"
        );

        self.transition(PipelineState::Finalizing);
        let summary = RunSummary {
            planned: plan.len(),
            downloaded,
            failed: failed_tiles.len(),
            failed_tiles,
            bytes_written: stats.bytes,
            elapsed: started.elapsed(),
        };

        if cancel.is_cancelled() && summary.completed() < summary.planned {
            return Err(PipelineError::Cancelled { summary });
        }
        if summary.downloaded == 0 {
            return Err(PipelineError::NoTilesDownloaded { summary });
        }
        Ok(summary)
    }

    fn transition(&self, next: PipelineState) {
        let previous = self.state.send_replace(next);
        debug!(from = %previous, to = %next, "Pipeline state changed");
    }
}
