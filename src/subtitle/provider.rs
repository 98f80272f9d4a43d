//! Subtitle providers
//!
//! Two upstreams are supported:
//! - a direct search service returning a JSON array of tracks
//! - a plain-blob service returning raw subtitle text, surfaced as a single
//!   inline track

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::SubtitleConfig;
use crate::content::ContentRef;
use crate::error::SubtitleError;

use super::track::{SubtitleTrack, TrackOrigin};

/// A source of subtitle tracks for a content reference
#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    async fn search(&self, content: &ContentRef) -> Result<Vec<SubtitleTrack>, SubtitleError>;
}

fn endpoint(base: &str, path: &str) -> Result<Url, SubtitleError> {
    Ok(Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))?)
}

/// Direct search provider
pub struct SearchProvider {
    http: reqwest::Client,
    base_url: String,
}

impl SearchProvider {
    pub fn new(http: reqwest::Client, config: &SubtitleConfig) -> Self {
        Self {
            http,
            base_url: config.search_url.clone(),
        }
    }

    /// `GET /search?id=…`, plus season and episode for TV (defaulting to 1)
    pub fn search_url(&self, content: &ContentRef) -> Result<Url, SubtitleError> {
        let mut url = endpoint(&self.base_url, "/search")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("id", &content.catalog_id);
            if content.is_tv() {
                query.append_pair("season", content.season_or_default());
                query.append_pair("episode", content.episode_or_default());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl SubtitleProvider for SearchProvider {
    fn name(&self) -> &'static str {
        "wyzie"
    }

    async fn search(&self, content: &ContentRef) -> Result<Vec<SubtitleTrack>, SubtitleError> {
        let url = self.search_url(content)?;
        debug!("Searching subtitles: {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubtitleError::UpstreamStatus {
                provider: self.name(),
                status,
            });
        }

        // A non-array body means no results
        let body: Value = response.json().await?;
        let tracks: Vec<SubtitleTrack> = body
            .as_array()
            .map(|items| items.iter().filter_map(SubtitleTrack::from_search_result).collect())
            .unwrap_or_default();

        info!("{} returned {} tracks for {}", self.name(), tracks.len(), content.target_path());
        Ok(tracks)
    }
}

/// Plain-blob provider
pub struct BlobProvider {
    http: reqwest::Client,
    base_url: String,
}

impl BlobProvider {
    pub fn new(http: reqwest::Client, config: &SubtitleConfig) -> Self {
        Self {
            http,
            base_url: config.blob_url.clone(),
        }
    }

    /// `GET /api/subtitles?tmdbId=…`, plus season and episode for TV
    pub fn blob_url(&self, content: &ContentRef) -> Result<Url, SubtitleError> {
        let mut url = endpoint(&self.base_url, "/api/subtitles")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("tmdbId", &content.catalog_id);
            if content.is_tv() {
                query.append_pair("season", content.season_or_default());
                query.append_pair("episode", content.episode_or_default());
            }
        }
        Ok(url)
    }

    /// Fetch the raw subtitle text
    pub async fn fetch_blob(&self, content: &ContentRef) -> Result<String, SubtitleError> {
        let url = self.blob_url(content)?;
        debug!("Fetching subtitle blob: {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubtitleError::UpstreamStatus {
                provider: self.name(),
                status,
            });
        }

        let text = response.text().await?;
        debug!("{} blob length: {}", self.name(), text.len());
        Ok(text)
    }

    /// Wrap raw text as the single inline track this provider yields
    pub fn inline_track(text: &str) -> SubtitleTrack {
        SubtitleTrack {
            id: "rainsubs".to_string(),
            url: format!("data:text/plain;base64,{}", STANDARD.encode(text)),
            language: "rainbow".to_string(),
            display: "Rainbow".to_string(),
            format: "srt".to_string(),
            origin: TrackOrigin::Rainsubs,
        }
    }
}

#[async_trait]
impl SubtitleProvider for BlobProvider {
    fn name(&self) -> &'static str {
        "rainsubs"
    }

    async fn search(&self, content: &ContentRef) -> Result<Vec<SubtitleTrack>, SubtitleError> {
        let text = self.fetch_blob(content).await?;
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Self::inline_track(&text)])
    }
}
