//! Subtitle module
//!
//! This module handles everything between the subtitle providers and the
//! caption overlay:
//! - Provider search (direct search and plain-blob providers)
//! - Normalization into one track shape and English-first ordering
//! - Track download, including inline `data:` URLs
//! - SRT to WebVTT conversion with a signed timing offset
//! - Cue list parsing and active cue lookup

pub mod aggregate;
pub mod cues;
pub mod loader;
pub mod provider;
pub mod timestamp;
pub mod track;
pub mod webvtt;

pub use aggregate::{order_tracks, SubtitleAggregator};
pub use cues::{Cue, CueList};
pub use loader::TrackLoader;
pub use provider::{BlobProvider, SearchProvider, SubtitleProvider};
pub use track::{SubtitleTrack, TrackOrigin};
pub use webvtt::{build_cues, convert_to_vtt, parse_vtt};
