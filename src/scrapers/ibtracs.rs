//! IBTrACS storm archive scraper.
//!
//! This module scrapes the [IBTrACS](https://ncics.org/ibtracs/) web archive,
//! which publishes one index page per year listing every storm by basin, and
//! one detail page per storm with its position history.
//!
//! # Page Layout
//!
//! - **Year index** (`index.php?name=YearBasin-<year>`): the second
//!   `table.ishade[summary="Layout table."]` holds one column per basin. Its
//!   first row names the basins; later rows hold relative storm links.
//! - **Storm detail**: the storm name is in the first `<h1>`, and the fourth
//!   `<table>` on the page is the track. Its first two rows are headers and the
//!   columns are `[?, datetime, ?, lat, long, speed, pressure, ...]`.
//!
//! Any deviation from this layout is a soft failure: the page is logged and
//! contributes nothing.

use crate::api::FetchPage;
use crate::models::{BasinLinkMap, RawRow};
use crate::scrapers::tables::{cell_texts, element_text, locate_table, nth_table};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Position of the basin table among the index page's layout tables.
const INDEX_TABLE_POSITION: usize = 1;
/// Position of the track table among all tables on a storm page.
const TRACK_TABLE_POSITION: usize = 3;
/// Leading header rows of the track table.
const TRACK_HEADER_ROWS: usize = 2;

static INDEX_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"table.ishade[summary="Layout table."]"#).unwrap());
static ANY_TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static DATA_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static ANY_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td, th").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());

/// What a storm detail page yielded.
#[derive(Debug, Clone, PartialEq)]
pub struct StormPage {
    /// Trimmed text of the first `<h1>`, `None` if absent or blank.
    pub heading: Option<String>,
    /// Track rows without the header rows, `None` if the track table is missing.
    pub rows: Option<Vec<RawRow>>,
}

/// Build the year index URL from the archive base and a page template
/// containing a `{year}` placeholder.
pub fn index_url(base: &Url, index_page: &str, year: i32) -> Result<Url, url::ParseError> {
    base.join(&index_page.replace("{year}", &year.to_string()))
}

/// Extract storm links per basin from a year index page.
///
/// # Arguments
///
/// * `html` - Body of the year index page
/// * `base` - URL the relative storm links are resolved against
///
/// # Returns
///
/// Links grouped by basin label, in table order. `None` when fewer than two
/// layout tables match or the basin table has no header row.
#[instrument(level = "info", skip_all, fields(%base))]
pub fn resolve_basin_links(html: &str, base: &Url) -> Option<BasinLinkMap> {
    let document = Html::parse_document(html);
    let Some(table) = nth_table(&document, &INDEX_TABLE, INDEX_TABLE_POSITION) else {
        warn!("Less than two layout tables found on the index page");
        return None;
    };

    let mut rows = table.select(&ROW);
    let Some(header) = rows.next() else {
        warn!("Basin table has no header row");
        return None;
    };
    let basins = cell_texts(header, &DATA_CELL);

    let mut map = BasinLinkMap::default();
    for basin in &basins {
        map.add_basin(basin);
    }

    for row in rows {
        for (column, cell) in row.select(&DATA_CELL).enumerate() {
            let Some(basin) = basins.get(column) else {
                warn!(column, "Link cell outside of any basin column; ignoring");
                continue;
            };
            for link in cell.select(&LINK) {
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                match base.join(href) {
                    Ok(resolved) => {
                        map.push_link(basin, resolved.to_string());
                    }
                    Err(e) => warn!(%href, error = %e, "Could not resolve storm link"),
                }
            }
        }
    }

    for basin in &basins {
        debug!(%basin, count = map.links(basin).map_or(0, |l| l.len()), "Indexed basin links");
    }
    info!(basins = basins.len(), "Resolved basin links");
    Some(map)
}

/// Extract the heading and track rows from a storm detail page.
pub fn parse_storm_page(html: &str) -> StormPage {
    let document = Html::parse_document(html);

    let heading = document
        .select(&HEADING)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty());

    let rows = locate_table(&document, &ANY_TABLE, TRACK_TABLE_POSITION, &ROW, &ANY_CELL).map(
        |rows| {
            rows.into_iter()
                .skip(TRACK_HEADER_ROWS)
                .map(|cells| cells.into_iter().map(Some).collect::<RawRow>())
                .collect::<Vec<_>>()
        },
    );

    StormPage { heading, rows }
}

/// Fetch and parse one storm detail page.
///
/// `Ok(None)` means the archive answered with a non-success status.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn scrape_storm_page<F: FetchPage>(
    fetcher: &F,
    url: &str,
) -> Result<Option<StormPage>, Box<dyn Error>> {
    let Some(body) = fetcher.fetch(url).await? else {
        return Ok(None);
    };
    let page = parse_storm_page(&body);
    debug!(
        heading = ?page.heading,
        rows = ?page.rows.as_ref().map(|r| r.len()),
        "Parsed storm page"
    );
    Ok(Some(page))
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A year index page with a decoy layout table before the basin table.
    pub const INDEX_PAGE: &str = r#"
        <html><body>
          <table class="ishade" summary="Layout table."><tr><td>menu</td></tr></table>
          <table class="ishade" summary="Layout table.">
            <tr><td> Western Pacific </td><td>Northern Atlantic</td></tr>
            <tr>
              <td><a href="index.php?name=v04r01-2023236N14146">HAIKUI</a>
                  <a href="index.php?name=v04r01-2023238N19131">SAOLA</a></td>
              <td><a href="index.php?name=v04r01-2023235N12322">FRANKLIN</a></td>
            </tr>
            <tr><td><a>no href</a></td><td></td></tr>
          </table>
        </body></html>"#;

    /// A storm page with the track as the fourth table.
    pub const STORM_PAGE: &str = r#"
        <html><body>
          <h1>Typhoon  HAIKUI (2023236N14146)</h1>
          <table><tr><td>nav</td></tr></table>
          <table><tr><td>summary</td></tr></table>
          <table><tr><td>map</td></tr></table>
          <table>
            <tr><th colspan="7">Track</th></tr>
            <tr><th>#</th><th>Time</th><th>Agency</th><th>Lat</th><th>Lon</th><th>Wind</th><th>Pres</th></tr>
            <tr><td>1</td><td>2023-08-27 06:00:00</td><td>TOKYO</td><td>14.3</td><td>146.0</td><td></td><td>1004</td></tr>
            <tr><td>2</td><td>12:00:00</td><td></td><td>14.8</td><td>145.6</td><td>35</td><td></td></tr>
            <tr><td>3</td><td>2023-08-28 00:00:00</td><td></td><td>15.6</td><td>144.3</td><td>N / A</td><td>998</td></tr>
          </table>
        </body></html>"#;
}
