//! Service handlers: health, version and cache inspection

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::state::AppState;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check() -> &'static str {
    concat!("vidluna-embed v", env!("CARGO_PKG_VERSION"))
}

/// Cache statistics endpoint
/// GET /debug/cache
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.catalog.cache().clear_expired();
    let stats = state.catalog.cache().stats();
    let utilization = if stats.max_entries == 0 {
        0.0
    } else {
        (stats.entry_count as f64 / stats.max_entries as f64) * 100.0
    };

    Json(serde_json::json!({
        "catalog": stats,
        "subtitle_tracks": state.tracks.cached_len(),
        "utilization": format!("{:.1}%", utilization)
    }))
}
