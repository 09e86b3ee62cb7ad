//! End-to-end retrieval of a (year, basin) dataset.
//!
//! The cache is consulted first. Only on a miss does the scrape run:
//!
//! 1. Fetch the year index page and resolve storm links per basin
//! 2. For each link of the requested basin, in order, fetch the storm page
//! 3. Fill gaps in the track rows and build the typed track
//! 4. Write the collected dataset to the cache
//!
//! Storms are processed one at a time. A storm whose page cannot be fetched or
//! does not have the expected layout is logged and left out; the rest of the
//! basin still completes.

use crate::api::FetchPage;
use crate::config::ScraperConfig;
use crate::models::{Dataset, StormTrack};
use crate::normalize::fill_gaps;
use crate::outputs::json::{load_dataset, save_dataset};
use crate::scrapers::ibtracs::{StormPage, index_url, resolve_basin_links, scrape_storm_page};
use crate::tracks::build_track;
use crate::utils::{ensure_writable_dir, truncate_for_log};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Outcome of a dataset lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Served from the cache file.
    Cached(Dataset),
    /// Freshly scraped (and written to the cache).
    Scraped(Dataset),
    /// The basin label is not on the index page; nothing was scraped.
    UnknownBasin {
        requested: String,
        available: Vec<String>,
    },
    /// The index page could not be fetched or did not have the basin table.
    IndexUnavailable,
}

impl Lookup {
    /// The dataset, if one was produced.
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            Lookup::Cached(dataset) | Lookup::Scraped(dataset) => Some(dataset),
            _ => None,
        }
    }
}

/// Return the cached dataset for (year, basin), or scrape and cache it.
///
/// `month` filters the observations of a fresh scrape. A cached dataset is
/// returned as stored.
///
/// # Arguments
///
/// * `fetcher` - Page retrieval used for the index and storm pages
/// * `config` - Archive URLs and the cache directory
/// * `year` - Season year of the index page
/// * `basin` - Basin label, matched exactly against the index page
/// * `month` - Optional month (1-12) to keep observations from
///
/// # Returns
///
/// A [`Lookup`] describing where the dataset came from, or why there is none.
/// Cache directory and cache write problems are logged, never returned.
///
/// # Errors
///
/// Only an unparseable `base_url` or `index_page` in `config`.
#[instrument(level = "info", skip(fetcher, config))]
pub async fn scrape_storm_data<F: FetchPage>(
    fetcher: &F,
    config: &ScraperConfig,
    year: i32,
    basin: &str,
    month: Option<u32>,
) -> Result<Lookup, Box<dyn Error>> {
    if let Some(dataset) = load_dataset(&config.cache_dir, year, basin).await {
        return Ok(Lookup::Cached(dataset));
    }
    info!("Cache not found. Scraping data for {} in {}", basin, year);

    // Early check, so a bad cache dir shows up before a long scrape
    if let Err(e) = ensure_writable_dir(&config.cache_dir).await {
        warn!(
            path = %config.cache_dir.display(),
            error = %e,
            "Cache directory is not writable; results will not be cached"
        );
    }

    let base = config.base()?;
    let index = index_url(&base, &config.index_page, year)?;
    let lookup = scrape_basin(fetcher, &base, &index, basin, month).await;

    if let Lookup::Scraped(dataset) = &lookup {
        if let Err(e) = save_dataset(dataset, &config.cache_dir, year, basin).await {
            error!(error = %e, "Failed to write cache file");
        }
    }
    Ok(lookup)
}

/// Scrape every storm of one basin from a year index page.
#[instrument(level = "info", skip(fetcher, base), fields(%index))]
pub async fn scrape_basin<F: FetchPage>(
    fetcher: &F,
    base: &Url,
    index: &Url,
    basin: &str,
    month: Option<u32>,
) -> Lookup {
    let html = match fetcher.fetch(index.as_str()).await {
        Ok(Some(html)) => html,
        Ok(None) => return Lookup::IndexUnavailable,
        Err(e) => {
            error!(error = %e, "Index page fetch failed");
            return Lookup::IndexUnavailable;
        }
    };

    let Some(links_by_basin) = resolve_basin_links(&html, base) else {
        debug!(preview = %truncate_for_log(&html, 300), "Index page without basin table");
        return Lookup::IndexUnavailable;
    };

    let Some(links) = links_by_basin.links(basin) else {
        let available = links_by_basin.names();
        warn!(
            requested = %basin,
            available = %available.iter().join(", "),
            "Basin not found"
        );
        return Lookup::UnknownBasin {
            requested: basin.to_string(),
            available,
        };
    };
    info!(count = links.len(), "Scraping storms");

    let dataset: Dataset = stream::iter(links.iter())
        .then(|url| scrape_storm(fetcher, url, month))
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(requested = links.len(), scraped = dataset.len(), "Scraped basin");
    Lookup::Scraped(dataset)
}

/// Fetch one storm page and turn it into a track, or `None` to skip it.
#[instrument(level = "info", skip(fetcher))]
async fn scrape_storm<F: FetchPage>(
    fetcher: &F,
    url: &str,
    month: Option<u32>,
) -> Option<StormTrack> {
    match scrape_storm_page(fetcher, url).await {
        Ok(Some(page)) => track_from_page(page, month),
        Ok(None) => None,
        Err(e) => {
            error!(error = %e, "Storm page fetch failed");
            None
        }
    }
}

/// Build a track from a parsed storm page, or `None` if the page lacks a
/// heading or track rows.
pub fn track_from_page(page: StormPage, month: Option<u32>) -> Option<StormTrack> {
    let Some(heading) = page.heading else {
        warn!("Storm page has no heading; skipping");
        return None;
    };
    let Some(mut rows) = page.rows else {
        warn!(%heading, "Less than four tables found on the page; skipping");
        return None;
    };
    if rows.is_empty() {
        warn!(%heading, "Track table has no rows; skipping");
        return None;
    }

    fill_gaps(&mut rows);
    let track = build_track(&heading, &rows, month);
    debug!(name = %track.name, points = track.path.len(), "Built storm track");
    Some(track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::ibtracs::fixtures::{INDEX_PAGE, STORM_PAGE};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;

    const INDEX: &str = "https://ncics.org/ibtracs/index.php?name=YearBasin-2023";
    const HAIKUI: &str = "https://ncics.org/ibtracs/index.php?name=v04r01-2023236N14146";
    const SAOLA: &str = "https://ncics.org/ibtracs/index.php?name=v04r01-2023238N19131";

    /// Serves canned pages and records every requested URL.
    #[derive(Default)]
    struct FakeArchive {
        pages: HashMap<String, String>,
        broken: Vec<String>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeArchive {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn with_broken(mut self, url: &str) -> Self {
            self.broken.push(url.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl FetchPage for FakeArchive {
        async fn fetch(&self, url: &str) -> Result<Option<String>, Box<dyn Error>> {
            self.requests.borrow_mut().push(url.to_string());
            if self.broken.iter().any(|b| b == url) {
                return Err("connection reset".into());
            }
            Ok(self.pages.get(url).cloned())
        }
    }

    fn config(cache_dir: &Path) -> ScraperConfig {
        ScraperConfig {
            cache_dir: cache_dir.to_path_buf(),
            ..ScraperConfig::default()
        }
    }

    #[tokio::test]
    async fn test_scrape_then_cache() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FakeArchive::default()
            .with_page(INDEX, INDEX_PAGE)
            .with_page(HAIKUI, STORM_PAGE)
            .with_page(SAOLA, "<h1>Typhoon SAOLA (2023238N19131)</h1><table></table>");

        let lookup = scrape_storm_data(&archive, &config(dir.path()), 2023, "Western Pacific", None)
            .await
            .unwrap();
        let Lookup::Scraped(dataset) = lookup else {
            panic!("expected a fresh scrape, got {lookup:?}");
        };
        assert_eq!(dataset.len(), 1);

        let haikui = &dataset[0];
        assert_eq!(haikui.name, "HAIKUI");
        assert_eq!(haikui.start_time, Some(1_693_116_000));
        assert_eq!(haikui.path.len(), 3);
        assert_eq!(haikui.path[0].time.as_deref(), Some("2023-08-27 06:00"));
        assert_eq!(haikui.path[0].speed.as_deref(), Some("< 35"));
        assert_eq!(haikui.path[1].time.as_deref(), Some("2023-08-27 12:00"));
        assert_eq!(haikui.path[1].speed.as_deref(), Some("35"));
        assert_eq!(haikui.path[1].pressure.as_deref(), Some("1004"));
        assert_eq!(haikui.path[1].class, 1);
        assert_eq!(haikui.path[2].speed.as_deref(), Some("< 35"));
        assert_eq!(haikui.path[2].class, 0);
        assert!(dir.path().join("wp_2023_data.json").exists());

        let again = scrape_storm_data(&archive, &config(dir.path()), 2023, "Western Pacific", None)
            .await
            .unwrap();
        assert_eq!(again, Lookup::Cached(dataset));
        assert_eq!(archive.requests(), vec![INDEX, HAIKUI, SAOLA]);
    }

    #[tokio::test]
    async fn test_unknown_basin_lists_valid_names() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FakeArchive::default().with_page(INDEX, INDEX_PAGE);

        let lookup = scrape_storm_data(&archive, &config(dir.path()), 2023, "western pacific", None)
            .await
            .unwrap();
        assert_eq!(
            lookup,
            Lookup::UnknownBasin {
                requested: "western pacific".to_string(),
                available: vec!["Western Pacific".to_string(), "Northern Atlantic".to_string()],
            }
        );
        assert_eq!(archive.requests(), vec![INDEX]);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_missing_index_page() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FakeArchive::default();
        let lookup = scrape_storm_data(&archive, &config(dir.path()), 2023, "Western Pacific", None)
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::IndexUnavailable);
        assert!(lookup.dataset().is_none());
    }

    #[tokio::test]
    async fn test_failed_storms_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FakeArchive::default()
            .with_page(INDEX, INDEX_PAGE)
            .with_broken(HAIKUI)
            .with_page(SAOLA, STORM_PAGE);

        let lookup = scrape_storm_data(&archive, &config(dir.path()), 2023, "Western Pacific", None)
            .await
            .unwrap();
        let dataset = lookup.dataset().unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset[0].name, "HAIKUI");
    }

    #[tokio::test]
    async fn test_month_filter_keeps_empty_tracks() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FakeArchive::default()
            .with_page(INDEX, INDEX_PAGE)
            .with_page(HAIKUI, STORM_PAGE);

        let lookup = scrape_storm_data(&archive, &config(dir.path()), 2023, "Western Pacific", Some(6))
            .await
            .unwrap();
        let dataset = lookup.dataset().unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset[0].path.is_empty());
        assert_eq!(dataset[0].start_time, Some(1_693_116_000));
    }

    #[tokio::test]
    async fn test_corrupt_cache_triggers_scrape() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("na_2023_data.json"), "not json").unwrap();
        let archive = FakeArchive::default().with_page(INDEX, INDEX_PAGE);

        let lookup = scrape_storm_data(&archive, &config(dir.path()), 2023, "Northern Atlantic", None)
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::Scraped(Vec::new()));
        assert_eq!(archive.requests().len(), 2);

        let cached = load_dataset(dir.path(), 2023, "Northern Atlantic").await;
        assert_eq!(cached, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_unwritable_cache_dir_still_scrapes() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "plain file").unwrap();
        let archive = FakeArchive::default()
            .with_page(INDEX, INDEX_PAGE)
            .with_page(HAIKUI, STORM_PAGE);

        let lookup = scrape_storm_data(
            &archive,
            &config(&blocker.join("cache")),
            2023,
            "Western Pacific",
            None,
        )
        .await
        .unwrap();
        let dataset = lookup.dataset().unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset[0].name, "HAIKUI");
    }

    #[tokio::test]
    async fn test_cache_hit_does_not_touch_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cached = vec![StormTrack {
            name: "MAWAR".to_string(),
            start_time: None,
            path: vec![],
        }];
        save_dataset(&cached, dir.path(), 2023, "Western Pacific").await.unwrap();
        let archive = FakeArchive::default();

        let lookup = scrape_storm_data(&archive, &config(dir.path()), 2023, "Western Pacific", None)
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::Cached(cached));
        assert!(archive.requests().is_empty());
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_track_from_page_skips_incomplete_pages() {
        let no_heading = StormPage { heading: None, rows: Some(vec![vec![]]) };
        assert!(track_from_page(no_heading, None).is_none());

        let no_table = StormPage { heading: Some("Storm A B".to_string()), rows: None };
        assert!(track_from_page(no_table, None).is_none());

        let empty = StormPage { heading: Some("Storm A B".to_string()), rows: Some(vec![]) };
        assert!(track_from_page(empty, None).is_none());
    }
}
