//! Embeddable player page
//!
//! The page is a thin HTML shell; everything the client-side player needs
//! to start is in a JSON bootstrap block.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::content::{ContentRef, EmbedOptions, MediaKind};
use crate::player::settings::{
    DisplaySettings, SubtitleSettings, BACKGROUND_COLOR_PRESETS, FONT_FAMILIES, PLAYBACK_SPEEDS,
    TEXT_COLOR_PRESETS,
};
use crate::state::AppState;
use crate::stream::Server;

use super::api::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct EmbedQuery {
    pub color: Option<String>,
    pub autoplay: Option<String>,
    pub server: Option<String>,
}

#[derive(Debug, Serialize)]
struct ServerOption {
    id: Server,
    name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerDefaults {
    speeds: &'static [f64],
    fonts: &'static [&'static str],
    text_colors: &'static [&'static str],
    background_colors: &'static [&'static str],
    subtitle_settings: SubtitleSettings,
    display: DisplaySettings,
}

/// Everything the client needs before its first API call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Bootstrap {
    content: ContentRef,
    options: EmbedOptions,
    title: String,
    play_label: String,
    backdrop_url: Option<String>,
    servers: Vec<ServerOption>,
    player: PlayerDefaults,
}

/// GET /embed/{type}/{id}
pub async fn embed_movie_or_show(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    Query(query): Query<EmbedQuery>,
) -> Result<Response, ApiError> {
    let kind: MediaKind = kind.parse().map_err(|_| ApiError::bad_request("Invalid type"))?;
    let content = match kind {
        MediaKind::Movie => ContentRef::movie(id),
        MediaKind::Tv => ContentRef {
            kind,
            catalog_id: id,
            season: None,
            episode: None,
        },
    };
    Ok(render(&state, content, query).await)
}

/// GET /embed/{type}/{id}/{season}/{episode}
pub async fn embed_episode(
    State(state): State<Arc<AppState>>,
    Path((kind, id, season, episode)): Path<(String, String, String, String)>,
    Query(query): Query<EmbedQuery>,
) -> Result<Response, ApiError> {
    let kind: MediaKind = kind.parse().map_err(|_| ApiError::bad_request("Invalid type"))?;
    let content = match kind {
        MediaKind::Tv => ContentRef::episode(id, season, episode),
        MediaKind::Movie => ContentRef::movie(id),
    };
    Ok(render(&state, content, query).await)
}

async fn render(state: &AppState, content: ContentRef, query: EmbedQuery) -> Response {
    let options = EmbedOptions::from_query(
        query.color.as_deref(),
        query.autoplay.as_deref(),
        query.server.as_deref(),
    );

    // The page still renders without catalog data
    let catalog = match state.catalog.fetch(&content).await {
        Ok(data) => Some(data),
        Err(e) => {
            debug!("No catalog data for embed {}: {}", content.target_path(), e);
            None
        }
    };
    let name = catalog
        .as_deref()
        .map(|d| d.display_name())
        .filter(|n| !n.is_empty());

    let bootstrap = Bootstrap {
        title: content.title(name),
        play_label: content.play_label(name),
        backdrop_url: catalog
            .as_deref()
            .and_then(|d| d.backdrop_url())
            .map(str::to_string),
        servers: Server::ALL
            .iter()
            .map(|s| ServerOption {
                id: *s,
                name: s.display_name(),
            })
            .collect(),
        player: PlayerDefaults {
            speeds: &PLAYBACK_SPEEDS,
            fonts: &FONT_FAMILIES,
            text_colors: &TEXT_COLOR_PRESETS,
            background_colors: &BACKGROUND_COLOR_PRESETS,
            subtitle_settings: SubtitleSettings::default(),
            display: DisplaySettings::default(),
        },
        content,
        options,
    };

    let html = render_page(&bootstrap);
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        html,
    )
        .into_response()
}

fn render_page(bootstrap: &Bootstrap) -> String {
    // `<` is escaped so the payload cannot close the script element
    let json = serde_json::to_string(bootstrap)
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>:root {{ --accent: {accent}; }} html, body {{ margin: 0; height: 100%; background: #000; }}</style>
</head>
<body>
<div id="player" data-accent="{accent}"></div>
<script id="player-bootstrap" type="application/json">{json}</script>
</body>
</html>
"#,
        title = escape_html(&bootstrap.title),
        accent = escape_html(&bootstrap.options.accent_color),
        json = json,
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Tom & \"Jerry\" <3"), "Tom &amp; &quot;Jerry&quot; &lt;3");
    }

    #[test]
    fn test_bootstrap_cannot_break_out_of_script() {
        let content = ContentRef::movie("550");
        let bootstrap = Bootstrap {
            title: content.title(Some("</script><b>")),
            play_label: content.play_label(None),
            backdrop_url: None,
            servers: Vec::new(),
            player: PlayerDefaults {
                speeds: &PLAYBACK_SPEEDS,
                fonts: &FONT_FAMILIES,
                text_colors: &TEXT_COLOR_PRESETS,
                background_colors: &BACKGROUND_COLOR_PRESETS,
                subtitle_settings: SubtitleSettings::default(),
                display: DisplaySettings::default(),
            },
            content,
            options: EmbedOptions::default(),
        };
        let html = render_page(&bootstrap);
        assert_eq!(html.matches("</script>").count(), 1);
        assert!(html.contains("<title>&lt;/script&gt;&lt;b&gt;</title>"));
    }
}
