//! Conversion of normalized table rows into typed storm tracks.
//!
//! Each gap-filled row becomes a [`TrackPoint`] with a reformatted timestamp,
//! parsed coordinates, display strings for speed and pressure, and an
//! intensity class derived from the wind speed.
//!
//! # Intensity Classes
//!
//! | Wind (kt) | Class |
//! |-----------|-------|
//! | < 34 | 0 |
//! | 34 - 63 | 1 |
//! | 64 - 82 | 2 |
//! | 83 - 95 | 3 |
//! | 96 - 112 | 4 |
//! | >= 113 | 5 |

use crate::models::{RawRow, StormTrack, TrackPoint};
use crate::normalize::DATETIME_COLUMN;
use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::{debug, trace};

/// Datetime format of the archive's track table.
pub const SOURCE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Datetime format stored in [`TrackPoint::time`].
pub const STORED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Name given to storms whose heading has too few words.
pub const UNKNOWN_NAME: &str = "UNKNOWN";
/// Display value for a missing wind speed.
pub const SPEED_BELOW_THRESHOLD: &str = "< 35";
/// Display value for a missing pressure.
pub const PRESSURE_ABOVE_THRESHOLD: &str = "> 1008";

const LAT_COLUMN: usize = 3;
const LONG_COLUMN: usize = 4;
const SPEED_COLUMN: usize = 5;
const PRESSURE_COLUMN: usize = 6;

/// Lower wind-speed bound (knots) of each class above 0, strongest first.
const INTENSITY_BANDS: &[(i64, u8)] = &[(113, 5), (96, 4), (83, 3), (64, 2), (34, 1)];

/// Intensity class for a wind speed in knots. A missing speed is class 0.
pub fn intensity_class(speed: Option<i64>) -> u8 {
    let Some(speed) = speed else {
        return 0;
    };
    INTENSITY_BANDS
        .iter()
        .find(|(lower, _)| speed >= *lower)
        .map_or(0, |(_, class)| *class)
}

/// Working storm name from a page heading.
///
/// Headings read like `"Typhoon HAIKUI (2023236N14146)"`; the common name is
/// the second-to-last word. Headings with fewer than two words yield
/// [`UNKNOWN_NAME`].
pub fn storm_name(heading: &str) -> String {
    let words: Vec<&str> = heading.split_whitespace().collect();
    if words.len() >= 2 {
        words[words.len() - 2].to_string()
    } else {
        UNKNOWN_NAME.to_string()
    }
}

fn parse_time(cell: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(cell, SOURCE_TIME_FORMAT).ok()
}

fn cell(row: &RawRow, column: usize) -> Option<&str> {
    row.get(column).and_then(|c| c.as_deref())
}

/// Convert one normalized row into a point.
///
/// Returns `None` when `month` is set and the row's parsed datetime falls in
/// another month. Rows whose datetime does not parse are kept with the raw
/// text as their time.
pub fn build_point(row: &RawRow, month: Option<u32>) -> Option<TrackPoint> {
    let raw_time = cell(row, DATETIME_COLUMN);
    let time = match raw_time.filter(|t| !t.is_empty()) {
        Some(text) => match parse_time(text) {
            Some(parsed) => {
                if month.is_some_and(|m| parsed.month() != m) {
                    trace!(time = %text, "Row outside requested month");
                    return None;
                }
                Some(parsed.format(STORED_TIME_FORMAT).to_string())
            }
            None => {
                debug!(time = %text, "Unparseable track time; keeping raw text");
                Some(text.to_string())
            }
        },
        None => raw_time.map(str::to_string),
    };

    let coordinate = |column| cell(row, column).and_then(|c| c.parse::<f64>().ok());
    let speed = cell(row, SPEED_COLUMN).and_then(|c| c.parse::<i64>().ok());
    let pressure = cell(row, PRESSURE_COLUMN).filter(|p| !p.is_empty());

    Some(TrackPoint {
        time,
        lat: coordinate(LAT_COLUMN),
        long: coordinate(LONG_COLUMN),
        speed: Some(match speed {
            Some(knots) if knots != 0 => knots.to_string(),
            _ => SPEED_BELOW_THRESHOLD.to_string(),
        }),
        pressure: Some(pressure.unwrap_or(PRESSURE_ABOVE_THRESHOLD).to_string()),
        class: intensity_class(speed),
    })
}

/// Epoch seconds of the first row's datetime, seconds truncated.
///
/// Archive times are UTC. Returns `None` if the first row has no parseable
/// datetime.
pub fn start_time(rows: &[RawRow]) -> Option<i64> {
    let first = rows.first()?;
    let parsed = parse_time(cell(first, DATETIME_COLUMN)?)?;
    Some(parsed.with_second(0)?.and_utc().timestamp())
}

/// Assemble a storm's track from its heading and normalized rows.
///
/// The start time always comes from the unfiltered first row; `month` only
/// drops rows from the path, which may end up empty.
///
/// # Arguments
///
/// * `heading` - Page heading, the storm name is its second word
/// * `rows` - Track rows after [`crate::normalize::fill_gaps`]
/// * `month` - Keep only observations from this month, if given
pub fn build_track(heading: &str, rows: &[RawRow], month: Option<u32>) -> StormTrack {
    let path: Vec<TrackPoint> = rows.iter().filter_map(|r| build_point(r, month)).collect();
    StormTrack {
        name: storm_name(heading),
        start_time: start_time(rows),
        path,
    }
}
