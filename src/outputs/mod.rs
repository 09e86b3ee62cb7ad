//! Persistence of scraped datasets.
//!
//! # Submodules
//!
//! - [`json`]: Reads and writes the per-(year, basin) JSON cache files
//!
//! # Output Structure
//!
//! ```text
//! cache_dir/
//! ├── wp_2023_data.json
//! ├── na_2023_data.json
//! └── unknown_2023_data.json   # basin label without an abbreviation
//! ```

pub mod json;
