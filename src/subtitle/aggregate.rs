//! Subtitle aggregation across providers

use std::sync::Arc;
use tracing::{info, warn};

use crate::content::ContentRef;

use super::provider::SubtitleProvider;
use super::track::SubtitleTrack;

/// Queries both providers and merges their tracks
#[derive(Clone)]
pub struct SubtitleAggregator {
    search: Arc<dyn SubtitleProvider>,
    blob: Arc<dyn SubtitleProvider>,
}

impl SubtitleAggregator {
    pub fn new(search: Arc<dyn SubtitleProvider>, blob: Arc<dyn SubtitleProvider>) -> Self {
        Self { search, blob }
    }

    /// Query both providers concurrently.
    ///
    /// A failing provider contributes no tracks; the failure is only logged.
    pub async fn aggregate(&self, content: &ContentRef) -> Vec<SubtitleTrack> {
        let (searched, blob) = tokio::join!(
            collect(self.search.as_ref(), content),
            collect(self.blob.as_ref(), content)
        );

        let tracks = order_tracks(searched, blob);
        info!("Loaded {} subtitle tracks for {}", tracks.len(), content.target_path());
        tracks
    }
}

async fn collect(provider: &dyn SubtitleProvider, content: &ContentRef) -> Vec<SubtitleTrack> {
    match provider.search(content).await {
        Ok(tracks) => tracks,
        Err(e) => {
            warn!("Subtitle provider {} failed: {}", provider.name(), e);
            Vec::new()
        }
    }
}

/// English search results first, then the other search results, then the
/// blob tracks. Relative order within each group is kept.
pub fn order_tracks(searched: Vec<SubtitleTrack>, blob: Vec<SubtitleTrack>) -> Vec<SubtitleTrack> {
    let (english, other): (Vec<_>, Vec<_>) = searched.into_iter().partition(|t| t.is_english());
    english.into_iter().chain(other).chain(blob).collect()
}
