//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - The shared outbound HTTP client
//! - Catalog client and its response cache
//! - Scraping proxy client
//! - Subtitle providers, aggregator and track loader
//! - Server configuration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::catalog::CatalogClient;
use crate::config::{ServerConfig, UpstreamConfig};
use crate::error::{AppError, Result};
use crate::stream::ScrapeClient;
use crate::subtitle::loader::is_internal_host;
use crate::subtitle::{BlobProvider, SearchProvider, SubtitleAggregator, TrackLoader};

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Redirects are never followed into loopback, private or link-local space
fn redirect_policy() -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if is_internal_host(attempt.url()) {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

/// Build the outbound client every upstream call goes through
pub fn build_http_client(upstream: &UpstreamConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(upstream.user_agent.as_str())
        .redirect(redirect_policy());
    if let Some(timeout) = upstream.timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(AppError::HttpClient)
}

/// Application state shared across all handlers
pub struct AppState {
    /// Catalog API client
    pub catalog: CatalogClient,

    /// Scraping proxy client
    pub scraper: ScrapeClient,

    /// Plain-blob provider, also used directly by the stream API
    pub blob: Arc<BlobProvider>,

    /// Both providers, merged and ordered
    pub subtitles: SubtitleAggregator,

    /// Subtitle text loader with its LRU cache
    pub tracks: Arc<TrackLoader>,

    /// Server shutdown flag
    pub shutdown: AtomicBool,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(config: ServerConfig) -> Result<Self> {
        let http = build_http_client(&config.upstream)?;

        let catalog = CatalogClient::new(http.clone(), config.catalog.clone());
        let scraper = ScrapeClient::new(http.clone(), config.scraper.clone());
        let search = Arc::new(SearchProvider::new(http.clone(), &config.subtitles));
        let blob = Arc::new(BlobProvider::new(http.clone(), &config.subtitles));
        let subtitles = SubtitleAggregator::new(search, blob.clone());
        let tracks = Arc::new(TrackLoader::new(http, &config.subtitles));

        Ok(Self {
            catalog,
            scraper,
            blob,
            subtitles,
            tracks,
            shutdown: AtomicBool::new(false),
            config,
        })
    }

    /// Signal shutdown
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Check if shutdown is requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}
