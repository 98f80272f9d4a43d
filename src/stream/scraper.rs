//! Scraping proxy client
//!
//! The proxy loads an upstream player page in a headless browser, waits for
//! a network request matching a pattern, and returns every request it
//! captured. We pick the first one that looks like an HLS manifest.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::ScraperConfig;
use crate::content::ContentRef;
use crate::error::ResolveError;

use super::resolver::{StreamDescriptor, StreamSource};
use super::Server;

/// Manifest extension we look for in captured requests
const MANIFEST_EXTENSION: &str = ".m3u8";

/// Scrape proxy response body
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeResponse {
    /// Captured network requests; entries are loosely typed upstream
    #[serde(default)]
    pub requests: Vec<Value>,
}

impl ScrapeResponse {
    /// First captured URL ending in the manifest extension
    pub fn manifest_url(&self) -> Option<&str> {
        self.requests
            .iter()
            .filter_map(|r| r.get("url").and_then(Value::as_str))
            .find(|url| url.ends_with(MANIFEST_EXTENSION))
    }
}

/// HTTP client for the scraping proxy
#[derive(Clone)]
pub struct ScrapeClient {
    http: reqwest::Client,
    config: ScraperConfig,
}

impl ScrapeClient {
    pub fn new(http: reqwest::Client, config: ScraperConfig) -> Self {
        Self { http, config }
    }

    fn player_url(&self, server: Server) -> &str {
        match server {
            Server::Veronica => &self.config.veronica_player_url,
            Server::Vienna => &self.config.vienna_player_url,
        }
    }

    /// Build the proxy request URL for `content` on `server`
    pub fn scrape_url(&self, content: &ContentRef, server: Server) -> Result<Url, ResolveError> {
        let endpoint = format!("{}/api/scrape", self.config.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&endpoint).map_err(|e| ResolveError::InvalidUrl {
            server,
            reason: e.to_string(),
        })?;

        let target = format!(
            "{}/{}",
            self.player_url(server).trim_end_matches('/'),
            content.target_path()
        );

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("url", &target);
            if let Some(selector) = server.click_selector() {
                query.append_pair("clickSelector", selector);
            }
            query.append_pair("waitFor", server.wait_for());
        }

        Ok(url)
    }
}

#[async_trait]
impl StreamSource for ScrapeClient {
    async fn resolve_on(
        &self,
        content: &ContentRef,
        server: Server,
    ) -> Result<StreamDescriptor, ResolveError> {
        let url = self.scrape_url(content, server)?;
        info!("Scraping {} for {}", server, content.target_path());
        debug!("Scrape URL: {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ResolveError::Request { server, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::UpstreamStatus { server, status });
        }

        let body: ScrapeResponse = response
            .json()
            .await
            .map_err(|source| ResolveError::Request { server, source })?;
        debug!("{} captured {} requests", server, body.requests.len());

        let manifest = body
            .manifest_url()
            .ok_or(ResolveError::NoManifest { server })?;
        info!("Found manifest from {}: {}", server, manifest);

        Ok(StreamDescriptor {
            url: manifest.to_string(),
            server,
        })
    }
}
