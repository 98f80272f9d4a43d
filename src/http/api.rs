//! JSON API handlers
//!
//! Every error leaves as `{ "success": false, "error": … }`; stream
//! failures also name the server that was tried last.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

use crate::content::{ContentRef, MediaKind};
use crate::error::{CatalogError, ResolveError, SubtitleError};
use crate::state::AppState;
use crate::stream::{resolve_with_fallback, Server};
use crate::subtitle::{build_cues, convert_to_vtt};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Upstream {
        message: String,
        server: Option<Server>,
    },
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": msg })),
            )
                .into_response(),
            ApiError::Upstream { message, server } => {
                let mut body = json!({ "success": false, "error": message });
                if let Some(server) = server {
                    body["server"] = json!(server);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        ApiError::Upstream {
            server: Some(err.server()),
            message: err.to_string(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Upstream {
            message: err.to_string(),
            server: None,
        }
    }
}

impl From<SubtitleError> for ApiError {
    fn from(err: SubtitleError) -> Self {
        match err {
            SubtitleError::UnsupportedScheme(_)
            | SubtitleError::MalformedDataUrl
            | SubtitleError::HostNotAllowed(_)
            | SubtitleError::TooLarge { .. }
            | SubtitleError::Base64(_)
            | SubtitleError::InvalidUrl(_) => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Upstream {
                message: err.to_string(),
                server: None,
            },
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// `GET /api/stream` query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    pub content_id: Option<String>,
    /// Alias of `contentId`
    pub tmdb_id: Option<String>,
    pub season: Option<String>,
    pub episode: Option<String>,
    pub server: Option<String>,
    pub subtitles: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMetadata {
    pub tmdb_id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub season: Option<String>,
    pub episode: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResponse {
    pub success: bool,
    pub stream_url: String,
    pub server: Server,
    pub metadata: StreamMetadata,
}

#[derive(Debug, Serialize)]
pub struct BlobResponse {
    pub success: bool,
    pub subtitles: String,
    pub metadata: StreamMetadata,
}

/// Resolve a manifest URL, or return the plain-blob subtitles when
/// `subtitles=true`.
/// GET /api/stream
pub async fn stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
) -> Result<Response, ApiError> {
    let id = non_empty(query.content_id)
        .or_else(|| non_empty(query.tmdb_id))
        .ok_or_else(|| ApiError::bad_request("TMDB ID is required"))?;

    let season = non_empty(query.season);
    let episode = non_empty(query.episode);
    let content = ContentRef::from_stream_params(&id, season.as_deref(), episode.as_deref());

    let metadata = StreamMetadata {
        tmdb_id: id,
        kind: content.kind,
        season,
        episode,
    };

    if query.subtitles.as_deref() == Some("true") {
        let text = state.blob.fetch_blob(&content).await.map_err(|e| {
            error!("Plain-blob subtitles failed: {}", e);
            ApiError::from(e)
        })?;
        return Ok(Json(BlobResponse {
            success: true,
            subtitles: text,
            metadata,
        })
        .into_response());
    }

    let preferred = match query.server.as_deref().map(str::trim) {
        None | Some("") => Server::default(),
        Some(name) => name
            .parse()
            .map_err(|e: crate::stream::server::UnknownServer| ApiError::bad_request(e.to_string()))?,
    };

    let descriptor = resolve_with_fallback(&state.scraper, &content, preferred).await?;

    Ok(Json(StreamResponse {
        success: true,
        stream_url: descriptor.url,
        server: descriptor.server,
        metadata,
    })
    .into_response())
}

/// `GET /api/catalog` and `GET /api/subtitles` query
#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    pub season: Option<String>,
    pub episode: Option<String>,
}

impl ContentQuery {
    /// Both `type` and `id` are required; TV season and episode are used
    /// only when both are present.
    fn content_ref(self) -> Result<ContentRef, ApiError> {
        let (Some(kind), Some(id)) = (non_empty(self.kind), non_empty(self.id)) else {
            return Err(ApiError::bad_request("Type and ID are required"));
        };
        let kind: MediaKind = kind
            .parse()
            .map_err(|_| ApiError::bad_request("Invalid type"))?;

        Ok(match kind {
            MediaKind::Movie => ContentRef::movie(id),
            MediaKind::Tv => match (non_empty(self.season), non_empty(self.episode)) {
                (Some(season), Some(episode)) => ContentRef::episode(id, season, episode),
                _ => ContentRef {
                    kind: MediaKind::Tv,
                    catalog_id: id,
                    season: None,
                    episode: None,
                },
            },
        })
    }
}

/// Catalog record with derived image URLs.
/// GET /api/catalog
pub async fn catalog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContentQuery>,
) -> Result<Response, ApiError> {
    let content = query.content_ref()?;
    let data = state.catalog.fetch(&content).await.map_err(|e| {
        error!("Catalog lookup failed for {}: {}", content.target_path(), e);
        ApiError::from(e)
    })?;

    Ok(Json(json!({ "success": true, "data": data.as_ref() })).into_response())
}

/// Tracks from both providers. Provider failures only shrink the list.
/// GET /api/subtitles
pub async fn subtitles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContentQuery>,
) -> Result<Response, ApiError> {
    let content = query.content_ref()?;
    let tracks = state.subtitles.aggregate(&content).await;
    Ok(Json(json!({ "success": true, "subtitles": tracks })).into_response())
}

/// `GET /api/subtitles/cues` and `GET /api/subtitles/vtt` query
#[derive(Debug, Default, Deserialize)]
pub struct TrackQuery {
    pub url: Option<String>,
    /// Signed timing offset in seconds
    pub offset: Option<String>,
}

impl TrackQuery {
    fn url(&self) -> Result<&str, ApiError> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::bad_request("Subtitle URL is required"))
    }

    /// Missing or blank is no offset; anything else must be a finite number
    fn offset(&self) -> Result<f64, ApiError> {
        match self.offset.as_deref().map(str::trim) {
            None | Some("") => Ok(0.0),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|o| o.is_finite())
                .ok_or_else(|| ApiError::bad_request(format!("Invalid offset: {}", raw))),
        }
    }
}

/// Cue list for a track.
/// GET /api/subtitles/cues
pub async fn subtitle_cues(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrackQuery>,
) -> Result<Response, ApiError> {
    let offset = query.offset()?;
    let text = state.tracks.load_text(query.url()?).await.map_err(|e| {
        warn!("Subtitle load failed: {}", e);
        ApiError::from(e)
    })?;
    let cues = build_cues(&text, offset);
    Ok(Json(json!({ "success": true, "cues": cues })).into_response())
}

/// Track converted to WebVTT.
/// GET /api/subtitles/vtt
pub async fn subtitle_vtt(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrackQuery>,
) -> Result<Response, ApiError> {
    let offset = query.offset()?;
    let text = state.tracks.load_text(query.url()?).await.map_err(|e| {
        warn!("Subtitle load failed: {}", e);
        ApiError::from(e)
    })?;
    let vtt = convert_to_vtt(&text, offset);
    Ok((
        [
            (header::CONTENT_TYPE, "text/vtt; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        vtt,
    )
        .into_response())
}
