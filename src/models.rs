//! Data models for scraped storm tracks and their cached representation.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawRow`]: One scraped row of a storm's position-history table
//! - [`BasinLinkMap`]: Storm detail-page links grouped by basin
//! - [`TrackPoint`]: A single typed, classified observation
//! - [`StormTrack`]: The named, time-ordered path of one storm
//! - [`Dataset`]: Every storm for one (year, basin), the unit that gets cached
//!
//! [`TrackPoint`] and [`StormTrack`] serialize to the exact JSON shape of the
//! cache files, so field names (`long`, `class`) follow that format.

use serde::{Deserialize, Serialize};

/// One table row as scraped, one cell per column.
///
/// Cells start out as `Some(text)`. Normalization rewrites the archive's
/// "not applicable" marker to `None`; positions never shift.
pub type RawRow = Vec<Option<String>>;

/// All storms scraped for one (year, basin) pair, in link order.
pub type Dataset = Vec<StormTrack>;

/// A single position/intensity observation along a storm's path.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrackPoint {
    /// `YYYY-MM-DD HH:MM` when parseable, otherwise the raw cell text.
    pub time: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    /// Wind speed in knots, or `"< 35"` when not reported.
    pub speed: Option<String>,
    /// Central pressure in hPa, or `"> 1008"` when not reported.
    pub pressure: Option<String>,
    /// Intensity class, always in `0..=5`.
    pub class: u8,
}

/// The named track of one storm.
///
/// `path` keeps the order of the source table; it is never sorted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StormTrack {
    pub name: String,
    /// Epoch seconds of the first recorded observation (seconds truncated).
    #[serde(default)]
    pub start_time: Option<i64>,
    pub path: Vec<TrackPoint>,
}

/// Storm detail-page links keyed by the basin labels used on the index page.
///
/// Basins keep the column order of the index table, and links keep the row
/// order they were found in.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BasinLinkMap {
    basins: Vec<(String, Vec<String>)>,
}

impl BasinLinkMap {
    /// Register a basin label with no links yet. Repeated labels are merged.
    pub fn add_basin(&mut self, name: &str) {
        if self.position(name).is_none() {
            self.basins.push((name.to_string(), Vec::new()));
        }
    }

    /// Append a link under an already registered basin.
    ///
    /// Returns `false` if the basin label is unknown.
    pub fn push_link(&mut self, basin: &str, link: String) -> bool {
        match self.position(basin) {
            Some(idx) => {
                self.basins[idx].1.push(link);
                true
            }
            None => false,
        }
    }

    /// Links for a basin. Matching is exact against the archive's labels.
    pub fn links(&self, basin: &str) -> Option<&[String]> {
        self.position(basin).map(|idx| self.basins[idx].1.as_slice())
    }

    /// Every basin label, in index-table order.
    pub fn names(&self) -> Vec<String> {
        self.basins.iter().map(|(name, _)| name.clone()).collect()
    }

    fn position(&self, basin: &str) -> Option<usize> {
        self.basins.iter().position(|(name, _)| name == basin)
    }
}
