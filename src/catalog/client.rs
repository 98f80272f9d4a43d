//! Catalog HTTP client for movie, show and episode lookups.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::CatalogConfig;
use crate::content::{ContentRef, MediaKind};
use crate::error::CatalogError;

use super::cache::CatalogCache;
use super::{CatalogData, Movie, TvData, TvEpisode, TvShow};

/// Catalog API client.
pub struct CatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
    api_key: Option<String>,
    cache: CatalogCache,
}

impl CatalogClient {
    /// Create a new client. The API key is resolved once, here; a missing
    /// key only becomes an error when a lookup is attempted.
    pub fn new(http: reqwest::Client, config: CatalogConfig) -> Self {
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            warn!(
                "{} is not set; catalog lookups will fail",
                config.api_key_env
            );
        }
        let cache = CatalogCache::new(config.cache.clone());
        Self {
            http,
            config,
            api_key,
            cache,
        }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    fn api_key(&self) -> Result<&str, CatalogError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| CatalogError::MissingApiKey(self.config.api_key_env.clone()))
    }

    /// Build a URL for a catalog endpoint from path segments.
    fn build_url(&self, segments: &[&str], api_key: &str) -> Result<Url, CatalogError> {
        let mut url = Url::parse(&self.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api_key", api_key)
            .append_pair("language", &self.config.language);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        what: &'static str,
    ) -> Result<T, CatalogError> {
        debug!("Fetching {} from {}", what, url.path());
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UpstreamStatus { what, status });
        }
        Ok(response.json().await?)
    }

    /// Look up a movie, or a show plus an optional episode.
    pub async fn fetch(&self, content: &ContentRef) -> Result<Arc<CatalogData>, CatalogError> {
        if let Some(hit) = self.cache.get(content) {
            debug!("Catalog cache hit for {}", content.target_path());
            return Ok(hit);
        }

        let api_key = self.api_key()?;
        let data = match content.kind {
            MediaKind::Movie => CatalogData::Movie(self.fetch_movie(content, api_key).await?),
            MediaKind::Tv => CatalogData::Tv(self.fetch_tv(content, api_key).await?),
        };
        info!("Catalog loaded: {}", data.display_name());

        let data = Arc::new(data);
        self.cache.insert(content, data.clone());
        Ok(data)
    }

    async fn fetch_movie(&self, content: &ContentRef, api_key: &str) -> Result<Movie, CatalogError> {
        let url = self.build_url(&["movie", &content.catalog_id], api_key)?;
        let movie: Movie = self.get_json(url, "movie data").await?;
        Ok(movie.with_images(&self.config.image_base_url))
    }

    /// Show and episode are fetched concurrently. Only the show is required;
    /// an episode failure yields no episode.
    async fn fetch_tv(&self, content: &ContentRef, api_key: &str) -> Result<TvData, CatalogError> {
        let show_url = self.build_url(&["tv", &content.catalog_id], api_key)?;

        let episode_url = match (content.season.as_deref(), content.episode.as_deref()) {
            (Some(season), Some(episode)) => Some(self.build_url(
                &["tv", &content.catalog_id, "season", season, "episode", episode],
                api_key,
            )?),
            _ => None,
        };

        let show_fut = self.get_json::<TvShow>(show_url, "TV show data");
        let episode_fut = async {
            match episode_url {
                Some(url) => Some(self.get_json::<TvEpisode>(url, "episode data").await),
                None => None,
            }
        };
        let (show, episode) = tokio::join!(show_fut, episode_fut);

        let show = show?.with_images(&self.config.image_base_url);
        let episode = match episode {
            Some(Ok(ep)) => Some(ep.with_images(&self.config.image_base_url)),
            Some(Err(e)) => {
                warn!("Episode lookup failed for {}: {}", content.target_path(), e);
                None
            }
            None => None,
        };

        Ok(TvData { show, episode })
    }
}
