//! Command-line interface definitions for Awful Storm Tracks.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! All arguments can be provided via command-line flags or environment variables.
//! Year and basin that are not given here are asked for interactively.

use clap::Parser;

/// Command-line arguments for the Awful Storm Tracks application.
///
/// # Examples
///
/// ```sh
/// # Fully non-interactive
/// awful_storm_tracks -y 2023 -b "Western Pacific"
///
/// # Only August, cached under ./cache
/// awful_storm_tracks -y 2023 -m 8 -b "Western Pacific" -d ./cache
///
/// # Prompt for everything
/// awful_storm_tracks
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Season year to fetch (e.g. 2023)
    #[arg(short, long, env = "STORM_YEAR")]
    pub year: Option<i32>,

    /// Only keep observations from this month (1-12)
    #[arg(short, long, env = "STORM_MONTH", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Basin label exactly as shown on the archive (e.g. "Western Pacific")
    #[arg(short, long, env = "STORM_BASIN")]
    pub basin: Option<String>,

    /// Directory for the JSON cache files
    #[arg(short = 'd', long, env = "STORM_CACHE_DIR")]
    pub cache_dir: Option<String>,

    /// Root URL of the IBTrACS archive
    #[arg(long, env = "IBTRACS_BASE_URL")]
    pub base_url: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,
}
