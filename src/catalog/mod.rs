//! Catalog metadata module
//!
//! Fetches movie, show and episode records from the catalog API:
//! - Typed records that pass unknown upstream fields through
//! - Derived poster/backdrop/still image URLs
//! - Concurrent show + episode lookups for TV content
//! - In-memory TTL cache of recent lookups

pub mod cache;
pub mod client;
pub mod types;

pub use client::CatalogClient;
pub use types::{
    image_url, CatalogData, Genre, ImageSize, Movie, TvData, TvEpisode, TvShow,
};
