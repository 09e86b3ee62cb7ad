//! # Awful Storm Tracks
//!
//! Scrapes historical tropical storm tracks from the
//! [IBTrACS](https://ncics.org/ibtracs/) web archive, normalizes the
//! position-history tables into typed, intensity-classified track points, and
//! caches each (year, basin) dataset as a JSON file.
//!
//! ## Usage
//!
//! ```sh
//! awful_storm_tracks -y 2023 -b "Western Pacific"
//! awful_storm_tracks            # prompts for year, month and basin
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Cache**: Return `{cache_dir}/{basin}_{year}_data.json` if it loads
//! 2. **Indexing**: Resolve storm page links for the basin from the year index
//! 3. **Fetching**: Download each storm page, one at a time
//! 4. **Normalizing**: Fill carried-forward gaps and build typed track points
//! 5. **Output**: Write the dataset back to the cache

use clap::Parser;
use std::error::Error;
use std::io;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod prompt;
mod scrapers;
mod tracks;
mod utils;

use api::HttpFetcher;
use cli::Cli;
use config::ScraperConfig;
use pipeline::{Lookup, scrape_storm_data};
use prompt::{ask, parse_month, parse_year};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("storm_tracks starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = ScraperConfig::load(&args).await?;
    debug!(?config, "Effective configuration");

    // ---- Ask for anything not on the command line ----
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let year = match args.year {
        Some(year) => year,
        None => parse_year(&ask(&mut input, &mut output, "Enter year (e.g., 2025): ")?)?,
    };
    // Month is only asked for in a fully interactive run
    let month = match (args.month, args.year) {
        (Some(month), _) => Some(month),
        (None, Some(_)) => None,
        (None, None) => parse_month(&ask(
            &mut input,
            &mut output,
            "Enter month (1-12, optional, press Enter to skip): ",
        )?)?,
    };
    let basin = match args.basin {
        Some(basin) => basin,
        None => ask(&mut input, &mut output, "Enter basin (e.g., Western Pacific): ")?,
    };
    info!(year, ?month, %basin, "Storm query");

    let fetcher = HttpFetcher::new()?;
    let lookup = scrape_storm_data(&fetcher, &config, year, &basin, month).await?;

    match &lookup {
        Lookup::UnknownBasin { requested, available } => {
            println!("Basin '{requested}' not found. Available basins: {available:?}");
        }
        _ => match lookup.dataset() {
            Some(dataset) if !dataset.is_empty() => {
                println!("Fetched and cached {} storms.", dataset.len());
            }
            _ => println!("No data available."),
        },
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
