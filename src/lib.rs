//! Embeddable HLS player backend
//!
//! Resolves playable manifest URLs through a scraping proxy with one-shot
//! server failover, serves catalog metadata with derived image URLs,
//! aggregates subtitles from two providers and converts them to WebVTT and
//! live cue lists, and models the player shell's state.
//!
//! The HTTP server only ships the bootstrap JSON inside the embed page.
//! [`player::PlayerSession`] and [`player::PlayerControls`] are library API
//! for driving a client shell (source failover, subtitle selection,
//! control auto-hide); nothing in the router constructs them.

pub mod catalog;
pub mod config;
pub mod config_file;
pub mod content;
pub mod error;
pub mod http;
pub mod player;
pub mod state;
pub mod stream;
pub mod subtitle;

#[cfg(test)]
mod integration;

pub use config::ServerConfig;
pub use error::{AppError, Result};
pub use http::create_router;
pub use state::AppState;
