//! Test fixtures for integration tests
//!
//! Fake upstreams are plain axum routers served on an ephemeral port.

use axum::Router;

use crate::config::ServerConfig;

/// Serve `router` on 127.0.0.1 and return its base URL (no trailing slash)
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr = listener.local_addr().expect("fake upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// Server configuration with every upstream pointed at `base`
pub fn config_for_upstream(base: &str) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.catalog.base_url = format!("{}/3", base);
    config.catalog.api_key = Some("test-key".to_string());
    config.scraper.base_url = base.to_string();
    config.subtitles.search_url = base.to_string();
    config.subtitles.blob_url = base.to_string();
    config
}

/// A minimal SRT document with two cues
pub const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:03,500\nHello\n\n2\n00:00:04,000 --> 00:00:06,000\nSecond line\nwraps here\n\n";
