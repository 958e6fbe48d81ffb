//! Fetch command - download a dataset into an MBTiles file.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wmstiles::config::DatasetFile;
use wmstiles::dataset::DatasetDescriptor;
use wmstiles::pipeline::Pipeline;
use wmstiles::planner::ZoomRange;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub dataset: PathBuf,
    pub output: Option<PathBuf>,
    pub year: Option<u16>,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
    pub parallel: Option<usize>,
    pub debug: bool,
}

/// Run the fetch command.
pub async fn run(args: FetchArgs) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("fetch");

    let file = DatasetFile::load_with_year(&args.dataset, args.year)?;
    let (descriptor, mut download, mut output) = file.into_parts();
    let descriptor = override_zooms(descriptor, args.min_zoom, args.max_zoom)?;
    if let Some(parallel) = args.parallel {
        download = download.with_parallel_downloads(parallel);
    }
    if let Some(path) = args.output {
        output = path;
    }

    println!("Dataset: {}", descriptor.name());
    println!("  Layer:  {}", descriptor.source().layer());
    println!(
        "  Server: {} (WMS {})",
        descriptor.source().endpoint(),
        descriptor.source().version()
    );
    println!("  Bounds: {}", descriptor.bounds());
    println!(
        "  Zoom:   {}-{}",
        descriptor.zooms().min(),
        descriptor.zooms().max()
    );
    println!("  Output: {}", output.display());
    println!("Log file: {}", runner.log_file().display());
    println!();

    let cancel = CancellationToken::new();
    let pipeline =
        Pipeline::for_wms(descriptor, download, &output)?.with_cancellation(cancel.clone());

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing tiles in flight");
            println!("Interrupted, finishing tiles in flight...");
            cancel.cancel();
        }
    });

    println!("Downloading with {} parallel requests...", download.parallel_downloads());
    let result = pipeline.run().await;
    interrupt.abort();
    let summary = result?;

    println!();
    println!("{}", summary);
    println!();
    if summary.is_complete_success() {
        println!("Completed successfully.");
    } else {
        println!(
            "Completed with {} failed tile(s); rerun to retry them.",
            summary.failed
        );
    }
    info!(output = %output.display(), "Fetch finished");

    Ok(())
}

/// Applies command-line zoom limits on top of the dataset's range.
fn override_zooms(
    descriptor: DatasetDescriptor,
    min_zoom: Option<u8>,
    max_zoom: Option<u8>,
) -> Result<DatasetDescriptor, CliError> {
    if min_zoom.is_none() && max_zoom.is_none() {
        return Ok(descriptor);
    }
    let current = descriptor.zooms();
    let zooms = ZoomRange::new(
        min_zoom.unwrap_or(current.min()),
        max_zoom.unwrap_or(current.max()),
    )
    .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    Ok(descriptor.with_zooms(zooms))
}
