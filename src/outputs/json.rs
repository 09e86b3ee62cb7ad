//! JSON cache of scraped datasets.
//!
//! Each (year, basin) pair is cached in its own file,
//! `{cache_dir}/{basin_abbreviation}_{year}_data.json`, holding the
//! [`Dataset`] as a pretty-printed array of storm tracks.
//!
//! # Cache Semantics
//!
//! - A missing, unreadable, or corrupt file is a cache miss. The error is
//!   logged and never returned, so the caller simply scrapes again.
//! - Saving always rewrites the whole file.

use crate::models::Dataset;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Basin labels as shown on the archive, with their cache file prefixes.
pub const BASIN_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Northern Atlantic", "na"),
    ("Eastern Pacific", "ep"),
    ("Western Pacific", "wp"),
    ("Northern Indian", "ni"),
    ("Southern Indian", "si"),
    ("Southern Pacific", "sp"),
];

/// File prefix for basin labels missing from [`BASIN_ABBREVIATIONS`].
pub const UNKNOWN_BASIN: &str = "unknown";

/// Cache file prefix for a basin label.
pub fn basin_abbreviation(basin: &str) -> &'static str {
    BASIN_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == basin)
        .map_or(UNKNOWN_BASIN, |(_, abbr)| *abbr)
}

/// Location of the cache file for a (year, basin) pair.
pub fn cache_path(cache_dir: &Path, year: i32, basin: &str) -> PathBuf {
    cache_dir.join(format!("{}_{}_data.json", basin_abbreviation(basin), year))
}

/// Load a cached dataset for a (year, basin) pair.
///
/// # Arguments
///
/// * `cache_dir` - Directory holding the cache files
/// * `year` - The storm season year
/// * `basin` - Basin label as shown on the archive index page
///
/// # Returns
///
/// The cached storms, or `None` when the file is missing, unreadable or not a
/// valid dataset. An empty cached dataset is still `Some`.
#[instrument(level = "info", skip_all, fields(cache_dir = %cache_dir.display(), year, %basin))]
pub async fn load_dataset(cache_dir: &Path, year: i32, basin: &str) -> Option<Dataset> {
    let path = cache_path(cache_dir, year, basin);

    let contents = match fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No cache file");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read cache file; scraping new data");
            return None;
        }
    };

    match serde_json::from_str::<Dataset>(&contents) {
        Ok(dataset) => {
            info!(path = %path.display(), storms = dataset.len(), "Loaded data from cache");
            Some(dataset)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Error loading cache file; scraping new data");
            None
        }
    }
}

/// Write a dataset to its cache file, creating `cache_dir` if needed.
///
/// The file is pretty-printed JSON with a 4-space indent and overwrites any
/// earlier cache for the same (year, basin).
///
/// # Arguments
///
/// * `dataset` - Storms to store
/// * `cache_dir` - Directory to write into
/// * `year` - The storm season year
/// * `basin` - Basin label, mapped to its file prefix
///
/// # Returns
///
/// The path of the written cache file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the dataset cannot be
/// serialized, or the file cannot be written.
#[instrument(level = "info", skip_all, fields(cache_dir = %cache_dir.display(), year, %basin))]
pub async fn save_dataset(
    dataset: &Dataset,
    cache_dir: &Path,
    year: i32,
    basin: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let mut json = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
    dataset.serialize(&mut serializer)?;

    fs::create_dir_all(cache_dir).await?;
    let path = cache_path(cache_dir, year, basin);
    fs::write(&path, json).await?;
    info!(path = %path.display(), storms = dataset.len(), "Data cached to file");

    Ok(path)
}
