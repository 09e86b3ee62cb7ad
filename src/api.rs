//! HTTP page retrieval for the archive scraper.
//!
//! Pages are fetched through the [`FetchPage`] trait so the scraping pipeline
//! can run against canned HTML in tests. [`HttpFetcher`] is the real
//! implementation backed by `reqwest`.
//!
//! # Failure Semantics
//!
//! - A non-2xx status is a soft failure: logged and returned as `Ok(None)`.
//! - A transport error (DNS, TLS, connection reset) is returned as `Err` and
//!   the caller decides whether to skip the page.
//!
//! Each page is requested exactly once; there is no retry or backoff.
//!
//! Tests run [`HttpFetcher`] against a one-shot local TCP server.

use reqwest::Client;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Trait for retrieving the body of a web page.
pub trait FetchPage {
    /// GET `url` and return its body, or `None` on a non-success status.
    async fn fetch(&self, url: &str) -> Result<Option<String>, Box<dyn Error>>;
}

/// [`FetchPage`] implementation backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Use a preconfigured client (proxies, timeouts, headers).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<Option<String>, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u128,
                "Failed to retrieve page"
            );
            return Ok(None);
        }

        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u128,
            "Fetched page"
        );
        Ok(Some(body))
    }
}
