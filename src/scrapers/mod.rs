//! Scrapers for the storm track archive.
//!
//! Scraping happens in two phases, like any index-then-detail site:
//!
//! 1. **Indexing**: Resolve the year index page into storm links per basin
//! 2. **Fetching**: Download each storm page and pull out its track table
//!
//! # Submodules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`tables`] | Find a table by selector and position, return rows as text |
//! | [`ibtracs`] | Page layouts of the IBTrACS archive (index and storm pages) |
//!
//! Pages that do not match the expected layout are logged and skipped rather
//! than failing the whole basin.

pub mod ibtracs;
pub mod tables;
