//! WmsTiles CLI - Command-line interface
//!
//! This binary downloads WMS imagery into MBTiles files and inspects the
//! results.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::fetch::FetchArgs;

#[derive(Parser)]
#[command(name = "wmstiles")]
#[command(version, about = "Download WMS imagery into MBTiles tile stores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every tile of a dataset into an MBTiles file
    Fetch {
        /// Dataset descriptor file (INI)
        dataset: PathBuf,

        /// Output file (overrides the dataset's output path)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Year substituted for {year} placeholders
        #[arg(long)]
        year: Option<u16>,

        /// Lowest zoom level to fetch
        #[arg(long)]
        min_zoom: Option<u8>,

        /// Highest zoom level to fetch
        #[arg(long)]
        max_zoom: Option<u8>,

        /// Number of concurrent requests
        #[arg(long)]
        parallel: Option<usize>,

        /// Enable debug-level logging
        #[arg(long)]
        debug: bool,
    },

    /// Show the tiles a dataset would fetch, without downloading
    Plan {
        /// Dataset descriptor file (INI)
        dataset: PathBuf,

        /// Year substituted for {year} placeholders
        #[arg(long)]
        year: Option<u16>,
    },

    /// Show metadata and tile counts of an MBTiles file
    Info {
        /// MBTiles file
        store: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch {
            dataset,
            output,
            year,
            min_zoom,
            max_zoom,
            parallel,
            debug,
        } => {
            commands::fetch::run(FetchArgs {
                dataset,
                output,
                year,
                min_zoom,
                max_zoom,
                parallel,
                debug,
            })
            .await
        }
        Commands::Plan { dataset, year } => commands::plan::run(&dataset, year),
        Commands::Info { store } => commands::info::run(&store),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_overrides() {
        let cli = Cli::try_parse_from([
            "wmstiles",
            "fetch",
            "crops.ini",
            "--year",
            "2021",
            "--max-zoom",
            "9",
            "--parallel",
            "4",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch {
                dataset,
                year,
                max_zoom,
                min_zoom,
                parallel,
                debug,
                ..
            } => {
                assert_eq!(dataset, PathBuf::from("crops.ini"));
                assert_eq!(year, Some(2021));
                assert_eq!(max_zoom, Some(9));
                assert_eq!(min_zoom, None);
                assert_eq!(parallel, Some(4));
                assert!(!debug);
            }
            _ => panic!("expected fetch"),
        }
    }
}
