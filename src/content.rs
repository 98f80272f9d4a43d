//! Content references and embed options
//!
//! A [`ContentRef`] identifies the asset being played for the lifetime of
//! a page load. [`EmbedOptions`] carries the theming and playback knobs
//! from the embed URL's query string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::stream::Server;

/// Default accent color used when none (or an invalid one) is given
pub const DEFAULT_ACCENT_COLOR: &str = "#ef4444";

/// Kind of asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a media type string is neither `movie` nor `tv`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid type: {0}")]
pub struct InvalidMediaKind(pub String);

impl FromStr for MediaKind {
    type Err = InvalidMediaKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaKind::Movie),
            "tv" => Ok(MediaKind::Tv),
            other => Err(InvalidMediaKind(other.to_string())),
        }
    }
}

/// Identifies a movie or a TV episode in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub kind: MediaKind,
    pub catalog_id: String,
    pub season: Option<String>,
    pub episode: Option<String>,
}

impl ContentRef {
    pub fn movie(catalog_id: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Movie,
            catalog_id: catalog_id.into(),
            season: None,
            episode: None,
        }
    }

    pub fn episode(
        catalog_id: impl Into<String>,
        season: impl Into<String>,
        episode: impl Into<String>,
    ) -> Self {
        Self {
            kind: MediaKind::Tv,
            catalog_id: catalog_id.into(),
            season: Some(season.into()),
            episode: Some(episode.into()),
        }
    }

    /// Build a reference from the loose parameters of the stream API.
    ///
    /// The request only counts as TV when both season and episode are given.
    pub fn from_stream_params(
        catalog_id: &str,
        season: Option<&str>,
        episode: Option<&str>,
    ) -> Self {
        match (non_empty(season), non_empty(episode)) {
            (Some(s), Some(e)) => Self::episode(catalog_id, s, e),
            _ => Self::movie(catalog_id),
        }
    }

    pub fn is_tv(&self) -> bool {
        self.kind == MediaKind::Tv
    }

    /// Season number, defaulting to 1 for TV content
    pub fn season_or_default(&self) -> &str {
        self.season.as_deref().unwrap_or("1")
    }

    /// Episode number, defaulting to 1 for TV content
    pub fn episode_or_default(&self) -> &str {
        self.episode.as_deref().unwrap_or("1")
    }

    /// Path the upstream players understand: `movie/{id}` or
    /// `tv/{id}/{season}/{episode}`.
    pub fn target_path(&self) -> String {
        match self.kind {
            MediaKind::Movie => format!("movie/{}", self.catalog_id),
            MediaKind::Tv => format!(
                "tv/{}/{}/{}",
                self.catalog_id,
                self.season_or_default(),
                self.episode_or_default()
            ),
        }
    }

    /// Page title, e.g. `Breaking Bad - S1E1`
    pub fn title(&self, name: Option<&str>) -> String {
        match self.kind {
            MediaKind::Movie => name.unwrap_or("Movie").to_string(),
            MediaKind::Tv => format!(
                "{} - S{}E{}",
                name.unwrap_or("TV Show"),
                self.season_or_default(),
                self.episode_or_default()
            ),
        }
    }

    /// Label under the initial play button, e.g. `Breaking Bad S1 E1`
    pub fn play_label(&self, name: Option<&str>) -> String {
        match self.kind {
            MediaKind::Movie => name.unwrap_or("Movie").to_string(),
            MediaKind::Tv => format!(
                "{} S{} E{}",
                name.unwrap_or("TV Show"),
                self.season_or_default(),
                self.episode_or_default()
            ),
        }
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// Options carried in the embed URL query string
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedOptions {
    /// Accent color as `#rrggbb`
    pub accent_color: String,
    pub autoplay: bool,
    pub server: Server,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            autoplay: false,
            server: Server::default(),
        }
    }
}

impl EmbedOptions {
    /// Parse raw query values. Invalid values fall back to the defaults.
    pub fn from_query(color: Option<&str>, autoplay: Option<&str>, server: Option<&str>) -> Self {
        let accent_color = match color.map(normalize_hex_color) {
            Some(Some(c)) => c,
            Some(None) => {
                tracing::debug!("Ignoring invalid accent color {:?}", color);
                DEFAULT_ACCENT_COLOR.to_string()
            }
            None => DEFAULT_ACCENT_COLOR.to_string(),
        };

        let autoplay = matches!(
            autoplay.map(|a| a.trim().to_ascii_lowercase()).as_deref(),
            Some("true") | Some("1")
        );

        let server = match server {
            Some(name) => name.parse().unwrap_or_else(|_| {
                tracing::debug!("Unknown server {:?}, using default", name);
                Server::default()
            }),
            None => Server::default(),
        };

        Self {
            accent_color,
            autoplay,
            server,
        }
    }
}

/// Normalize a hex color given with or without a leading `#`.
///
/// Accepts 3 or 6 hex digits and returns `#` + lower-case digits.
pub fn normalize_hex_color(input: &str) -> Option<String> {
    let digits = input.trim().trim_start_matches('#');
    if (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", digits.to_ascii_lowercase()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_path() {
        assert_eq!(ContentRef::movie("550").target_path(), "movie/550");
        assert_eq!(
            ContentRef::episode("1434", "22", "9").target_path(),
            "tv/1434/22/9"
        );
    }

    #[test]
    fn test_tv_without_episode_defaults_to_first() {
        let content = ContentRef {
            kind: MediaKind::Tv,
            catalog_id: "1396".to_string(),
            season: None,
            episode: None,
        };
        assert_eq!(content.target_path(), "tv/1396/1/1");
        assert_eq!(content.title(None), "TV Show - S1E1");
        assert_eq!(content.play_label(Some("Breaking Bad")), "Breaking Bad S1 E1");
    }

    #[test]
    fn test_stream_params_need_both_season_and_episode() {
        assert!(!ContentRef::from_stream_params("1", Some("2"), None).is_tv());
        assert!(!ContentRef::from_stream_params("1", Some(""), Some("3")).is_tv());
        let tv = ContentRef::from_stream_params("1", Some("2"), Some("3"));
        assert_eq!(tv, ContentRef::episode("1", "2", "3"));
    }

    #[test]
    fn test_media_kind_parse() {
        assert_eq!("movie".parse::<MediaKind>().unwrap(), MediaKind::Movie);
        assert_eq!("tv".parse::<MediaKind>().unwrap(), MediaKind::Tv);
        let err = "anime".parse::<MediaKind>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid type: anime");
    }

    #[test]
    fn test_movie_title_fallback() {
        let movie = ContentRef::movie("550");
        assert_eq!(movie.title(None), "Movie");
        assert_eq!(movie.title(Some("Fight Club")), "Fight Club");
    }

    #[test]
    fn test_embed_options() {
        let opts = EmbedOptions::from_query(Some("3B82F6"), Some("true"), Some("vienna"));
        assert_eq!(opts.accent_color, "#3b82f6");
        assert!(opts.autoplay);
        assert_eq!(opts.server, Server::Vienna);

        let opts = EmbedOptions::from_query(Some("#dc2626"), None, None);
        assert_eq!(opts.accent_color, "#dc2626");
        assert!(!opts.autoplay);
        assert_eq!(opts.server, Server::Veronica);
    }

    #[test]
    fn test_embed_options_invalid_values_fall_back() {
        let opts = EmbedOptions::from_query(Some("zzz123"), Some("yes"), Some("paris"));
        assert_eq!(opts, EmbedOptions::default());
    }
}
