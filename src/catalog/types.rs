//! Catalog API types
//!
//! Each record keeps the fields we read plus every other upstream field in
//! a flattened map, so responses pass through without losing data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Image sizes served by the catalog's image CDN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W300,
    W500,
    W780,
    W1280,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W300 => "w300",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::W1280 => "w1280",
            ImageSize::Original => "original",
        }
    }
}

pub const POSTER_SIZE: ImageSize = ImageSize::W500;
pub const BACKDROP_SIZE: ImageSize = ImageSize::W1280;
pub const STILL_SIZE: ImageSize = ImageSize::W780;

/// Derive a full image URL from a catalog image path
pub fn image_url(base: &str, path: Option<&str>, size: ImageSize) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    Some(format!(
        "{}/{}{}",
        base.trim_end_matches('/'),
        size.as_str(),
        path
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Movie record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Movie {
    /// Fill in `poster_url` and `backdrop_url`
    pub fn with_images(mut self, image_base: &str) -> Self {
        self.poster_url = image_url(image_base, self.poster_path.as_deref(), POSTER_SIZE);
        self.backdrop_url = image_url(image_base, self.backdrop_path.as_deref(), BACKDROP_SIZE);
        self
    }
}

/// TV show record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvShow {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TvShow {
    pub fn with_images(mut self, image_base: &str) -> Self {
        self.poster_url = image_url(image_base, self.poster_path.as_deref(), POSTER_SIZE);
        self.backdrop_url = image_url(image_base, self.backdrop_path.as_deref(), BACKDROP_SIZE);
        self
    }
}

/// TV episode record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvEpisode {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episode_number: Option<u32>,
    #[serde(default)]
    pub season_number: Option<u32>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub still_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TvEpisode {
    pub fn with_images(mut self, image_base: &str) -> Self {
        self.still_url = image_url(image_base, self.still_path.as_deref(), STILL_SIZE);
        self
    }
}

/// Show plus the requested episode, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvData {
    pub show: TvShow,
    pub episode: Option<TvEpisode>,
}

/// Payload of a catalog lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogData {
    Tv(TvData),
    Movie(Movie),
}

impl CatalogData {
    /// Movie title or show name
    pub fn display_name(&self) -> &str {
        match self {
            CatalogData::Movie(m) => &m.title,
            CatalogData::Tv(tv) => &tv.show.name,
        }
    }

    /// Backdrop used behind the loading screen
    pub fn backdrop_url(&self) -> Option<&str> {
        match self {
            CatalogData::Movie(m) => m.backdrop_url.as_deref(),
            CatalogData::Tv(tv) => tv.show.backdrop_url.as_deref(),
        }
    }
}
