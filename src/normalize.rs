//! Gap filling for scraped track tables.
//!
//! The archive omits values that did not change since the previous
//! observation: a datetime cell may hold only a time when the date is the
//! same, and other columns may be left blank. [`fill_gaps`] reconstructs the
//! full rows by carrying values forward, column by column.
//!
//! The explicit `"N / A"` marker is different from a blank: it means the
//! value does not exist and becomes `None`, which is never filled.

use crate::models::RawRow;

/// The archive's "not applicable" marker.
pub const NOT_APPLICABLE: &str = "N / A";

/// Column holding `"<date> <time>"` or a bare `"<time>"`.
pub const DATETIME_COLUMN: usize = 1;

/// Fill gaps in `rows` in place.
///
/// 1. Blank cells of the first row become [`NOT_APPLICABLE`], since there is
///    nothing to inherit from yet.
/// 2. A bare time is prefixed with the most recent date seen in the datetime
///    column. It is left alone if no date has been seen.
/// 3. [`NOT_APPLICABLE`] cells become `None`. Blank cells take the value of
///    the same column in the previous (already filled) row, so values carry
///    forward transitively until a row overrides them.
pub fn fill_gaps(rows: &mut [RawRow]) {
    if let Some(first) = rows.first_mut() {
        for cell in first.iter_mut() {
            if matches!(cell.as_deref(), Some("")) {
                *cell = Some(NOT_APPLICABLE.to_string());
            }
        }
    }

    let mut last_date: Option<String> = None;
    for idx in 0..rows.len() {
        let (filled, rest) = rows.split_at_mut(idx);
        let row = &mut rest[0];

        if let Some(Some(cell)) = row.get_mut(DATETIME_COLUMN) {
            if !cell.is_empty() && cell.as_str() != NOT_APPLICABLE {
                if cell.contains(' ') {
                    last_date = cell.split_whitespace().next().map(str::to_string);
                } else if let Some(date) = &last_date {
                    *cell = format!("{date} {cell}");
                }
            }
        }

        let previous = filled.last();
        for (column, cell) in row.iter_mut().enumerate() {
            let Some(text) = cell.as_deref() else {
                continue;
            };
            if text == NOT_APPLICABLE {
                *cell = None;
            } else if text.is_empty() {
                if let Some(inherited) = previous.and_then(|p| p.get(column)) {
                    *cell = inherited.clone();
                }
            }
        }
    }
}
