//! Runtime configuration for the scraper.
//!
//! Settings come from three layers, highest priority first:
//!
//! 1. Command-line flags and their environment variables (see [`crate::cli`])
//! 2. An optional YAML file passed with `--config`
//! 3. Built-in defaults pointing at the public IBTrACS archive
//!
//! # Example
//!
//! ```yaml
//! base_url: https://ncics.org/ibtracs/
//! index_page: index.php?name=YearBasin-{year}
//! cache_dir: /var/cache/storms
//! ```

use crate::cli::Cli;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://ncics.org/ibtracs/";
pub const DEFAULT_INDEX_PAGE: &str = "index.php?name=YearBasin-{year}";
pub const DEFAULT_CACHE_DIR: &str = "data";

/// Scraper settings after all layers are merged.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Archive root; storm links are resolved against it.
    pub base_url: String,
    /// Year index page relative to `base_url`, with a `{year}` placeholder.
    pub index_page: String,
    /// Directory holding the JSON cache files.
    pub cache_dir: PathBuf,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            index_page: DEFAULT_INDEX_PAGE.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl ScraperConfig {
    /// Parse a YAML document. Missing keys fall back to defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Build the effective configuration from the CLI and an optional file.
    #[instrument(level = "info", skip_all)]
    pub async fn load(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let mut config = match &cli.config {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path).await?;
                info!(%path, "Loaded configuration file");
                Self::from_yaml(&yaml)?
            }
            None => Self::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    /// Let explicit CLI/env values win over file and default values.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(cache_dir) = &cli.cache_dir {
            self.cache_dir = PathBuf::from(cache_dir);
        }
    }

    /// The archive root as a URL. A missing trailing slash is added so that
    /// relative links resolve inside the archive directory.
    pub fn base(&self) -> Result<Url, url::ParseError> {
        if self.base_url.ends_with('/') {
            Url::parse(&self.base_url)
        } else {
            Url::parse(&format!("{}/", self.base_url))
        }
    }
}
