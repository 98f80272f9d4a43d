//! Axum router configuration

use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::api::{catalog, stream, subtitle_cues, subtitle_vtt, subtitles};
use super::embed::{embed_episode, embed_movie_or_show};
use super::handlers::{cache_stats, health_check, version_check};
use super::middleware::{request_logger, REQUEST_ID_HEADER};

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // Health and version endpoints
        .route("/health", get(health_check))
        .route("/version", get(version_check))
        // Debug endpoints
        .route("/debug/cache", get(cache_stats))
        // API
        .route("/api/stream", get(stream))
        .route("/api/catalog", get(catalog))
        .route("/api/subtitles", get(subtitles))
        .route("/api/subtitles/cues", get(subtitle_cues))
        .route("/api/subtitles/vtt", get(subtitle_vtt))
        // Embeddable player
        .route("/embed/{type}/{id}", get(embed_movie_or_show))
        .route("/embed/{type}/{id}/{season}/{episode}", get(embed_episode))
        // Middleware
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http());

    // The page is meant to be framed and fetched from other origins
    let router = if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS, Method::HEAD])
            .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::ORIGIN])
            .expose_headers([REQUEST_ID_HEADER])
            .max_age(Duration::from_secs(3600));
        router.layer(cors)
    } else {
        router
    };

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::integration::fixtures::{config_for_upstream, spawn_upstream, SAMPLE_SRT};
    use crate::subtitle::BlobProvider;
    use axum::body::Body;
    use axum::extract::{Path, Query};
    use axum::http::{Request, StatusCode};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tower::util::ServiceExt; // Use tower::util::ServiceExt for oneshot

    type Params = Query<HashMap<String, String>>;

    /// One fake server standing in for the scraping proxy, the catalog API
    /// and both subtitle providers
    fn fake_upstream() -> Router {
        Router::new()
            .route(
                "/api/scrape",
                get(|Query(q): Params| async move {
                    let target = q.get("url").cloned().unwrap_or_default();
                    if target.contains("videasy") || target.contains("/movie/0") {
                        return (StatusCode::BAD_GATEWAY, Json(json!({})));
                    }
                    (
                        StatusCode::OK,
                        Json(json!({"requests": [
                            {"url": "https://cdn.test/app.js"},
                            {"url": format!("https://cdn.test/{}/master.m3u8", target.len())}
                        ]})),
                    )
                }),
            )
            .route(
                "/3/movie/{id}",
                get(|Path(id): Path<String>| async move {
                    Json(json!({
                        "id": id.parse::<u64>().unwrap_or(0),
                        "title": "Fight Club",
                        "poster_path": "/p.jpg",
                        "backdrop_path": null
                    }))
                }),
            )
            .route(
                "/3/tv/{id}",
                get(|| async { Json(json!({"id": 1396, "name": "Breaking Bad"})) }),
            )
            .route(
                "/search",
                get(|| async {
                    Json(json!([
                        {"id": "fr", "url": "https://s/fr.srt", "language": "fr"},
                        {"id": "en", "url": "https://s/en.srt", "language": "en", "display": "English"}
                    ]))
                }),
            )
            .route("/tracks/en.srt", get(|| async { SAMPLE_SRT }))
            .route(
                "/api/subtitles",
                get(|Query(q): Params| async move {
                    if q.get("tmdbId").map(String::as_str) == Some("404") {
                        return (StatusCode::NOT_FOUND, String::new());
                    }
                    (StatusCode::OK, SAMPLE_SRT.to_string())
                }),
            )
    }

    async fn app() -> Router {
        let base = spawn_upstream(fake_upstream()).await;
        let state = AppState::new(config_for_upstream(&base)).unwrap();
        create_router(Arc::new(state))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_create_router() {
        let state = Arc::new(AppState::new(ServerConfig::default()).unwrap());
        let _router = create_router(state);
        // Router creation successful
    }

    #[tokio::test]
    async fn test_cors_options() {
        let state = Arc::new(AppState::new(ServerConfig::default()).unwrap());
        let app = create_router(state);

        // Pre-flight OPTIONS request
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/stream?contentId=550")
            .header(header::ORIGIN, "http://localhost:8080")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("GET"));
    }

    #[tokio::test]
    async fn test_health_has_request_id() {
        let state = Arc::new(AppState::new(ServerConfig::default()).unwrap());
        let response = create_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get("x-request-id").unwrap();
        assert_eq!(id.len(), 36);
    }

    #[tokio::test]
    async fn test_stream_requires_id() {
        let (status, body) = get_json(app().await, "/api/stream").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "TMDB ID is required"}));
    }

    #[tokio::test]
    async fn test_stream_falls_back_to_secondary() {
        let (status, body) =
            get_json(app().await, "/api/stream?contentId=1396&season=1&episode=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["server"], "vienna");
        assert!(body["streamUrl"].as_str().unwrap().ends_with("/master.m3u8"));
        assert_eq!(
            body["metadata"],
            json!({"tmdbId": "1396", "type": "tv", "season": "1", "episode": "2"})
        );
    }

    #[tokio::test]
    async fn test_stream_failure_reports_server() {
        let (status, body) = get_json(app().await, "/api/stream?tmdbId=0&server=vienna").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["server"], "vienna");
        assert_eq!(body["error"], "vienna scrape failed: 502 Bad Gateway");

        let (status, _) = get_json(app().await, "/api/stream?tmdbId=1&server=paris").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stream_subtitle_blob() {
        let (status, body) =
            get_json(app().await, "/api/stream?tmdbId=550&subtitles=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subtitles"], SAMPLE_SRT);
        assert_eq!(body["metadata"]["type"], "movie");
        assert_eq!(body["metadata"]["season"], Value::Null);

        let (status, body) =
            get_json(app().await, "/api/stream?tmdbId=404&subtitles=true").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_catalog_validation() {
        let (status, body) = get_json(app().await, "/api/catalog?id=550").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Type and ID are required");

        let (status, body) = get_json(app().await, "/api/catalog?type=anime&id=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid type");
    }

    #[tokio::test]
    async fn test_catalog_movie_and_show() {
        let (status, body) = get_json(app().await, "/api/catalog?type=movie&id=550").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Fight Club");
        assert_eq!(body["data"]["poster_url"], "https://image.tmdb.org/t/p/w500/p.jpg");
        assert_eq!(body["data"]["backdrop_url"], Value::Null);

        let (status, body) = get_json(app().await, "/api/catalog?type=tv&id=1396").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["show"]["name"], "Breaking Bad");
        assert_eq!(body["data"]["episode"], Value::Null);
    }

    #[tokio::test]
    async fn test_catalog_missing_credential_is_500() {
        let mut config = ServerConfig::default();
        config.catalog.api_key = None;
        config.catalog.api_key_env = "VIDLUNA_TEST_ROUTES_NO_KEY".to_string();
        let app = create_router(Arc::new(AppState::new(config).unwrap()));

        let (status, body) = get_json(app, "/api/catalog?type=movie&id=550").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "VIDLUNA_TEST_ROUTES_NO_KEY environment variable is required"
        );
    }

    #[tokio::test]
    async fn test_subtitles_are_ordered() {
        let (status, body) = get_json(app().await, "/api/subtitles?type=movie&id=550").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["subtitles"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["en", "fr", "rainsubs"]);
        assert_eq!(body["subtitles"][2]["source"], "rainsubs");
    }

    #[tokio::test]
    async fn test_subtitles_survive_provider_failure() {
        let (status, body) = get_json(app().await, "/api/subtitles?type=movie&id=404").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["subtitles"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cues_with_offset() {
        let track = BlobProvider::inline_track(SAMPLE_SRT);
        let uri = format!(
            "/api/subtitles/cues?offset=2&url={}",
            url::form_urlencoded::byte_serialize(track.url.as_bytes()).collect::<String>()
        );
        let (status, body) = get_json(app().await, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["cues"][0],
            json!({"start": 3.0, "end": 5.5, "lines": ["Hello"]})
        );

        let (status, _) = get_json(app().await, "/api/subtitles/cues?url=ftp://x/y.srt").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    fn encode(value: &str) -> String {
        url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
    }

    #[tokio::test]
    async fn test_track_endpoints_refuse_internal_urls() {
        let internal = spawn_upstream(Router::new().route(
            "/admin/secret",
            get(|| async { "internal-only-token" }),
        ))
        .await;
        let app = app().await;
        let target = encode(&format!("{}/admin/secret", internal));

        for endpoint in ["vtt", "cues"] {
            let uri = format!("/api/subtitles/{}?url={}", endpoint, target);
            let (status, body) = get_json(app.clone(), &uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{endpoint}");
            assert_eq!(body["success"], false);
            assert!(body["error"].as_str().unwrap().starts_with("Subtitle host not allowed"));
            assert!(!body.to_string().contains("internal-only-token"));
        }

        let (status, _) = get_json(
            app,
            &format!("/api/subtitles/cues?url={}", encode("http://169.254.169.254/latest")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_hosted_track_loads() {
        let base = spawn_upstream(fake_upstream()).await;
        let app = create_router(Arc::new(AppState::new(config_for_upstream(&base)).unwrap()));

        let uri = format!("/api/subtitles/cues?url={}", encode(&format!("{}/tracks/en.srt", base)));
        let (status, body) = get_json(app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cues"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_offset_is_json_error() {
        let track = BlobProvider::inline_track(SAMPLE_SRT);
        let url = encode(&track.url);

        for offset in ["abc", "inf"] {
            let uri = format!("/api/subtitles/cues?url={}&offset={}", url, offset);
            let (status, body) = get_json(app().await, &uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], format!("Invalid offset: {}", offset));
        }

        let uri = format!("/api/subtitles/cues?url={}&offset=", url);
        let (status, body) = get_json(app().await, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cues"][0]["start"], 1.0);
    }

    #[tokio::test]
    async fn test_vtt_endpoint() {
        let track = BlobProvider::inline_track(SAMPLE_SRT);
        let uri = format!(
            "/api/subtitles/vtt?url={}",
            url::form_urlencoded::byte_serialize(track.url.as_bytes()).collect::<String>()
        );
        let response = app()
            .await
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/vtt; charset=utf-8"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"WEBVTT\n\n00:00:01.000 --> 00:00:03.500\nHello"));
    }

    #[tokio::test]
    async fn test_embed_page() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/embed/tv/1396/1/2?color=3b82f6&autoplay=true&server=vienna")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(html.contains("<title>Breaking Bad - S1E2</title>"));
        assert!(html.contains("--accent: #3b82f6"));

        let start = html.find(r#"type="application/json">"#).unwrap() + 24;
        let end = html[start..].find("</script>").unwrap() + start;
        let bootstrap: Value = serde_json::from_str(&html[start..end]).unwrap();
        assert_eq!(bootstrap["options"]["server"], "vienna");
        assert_eq!(bootstrap["options"]["autoplay"], true);
        assert_eq!(bootstrap["playLabel"], "Breaking Bad S1 E2");
        assert_eq!(bootstrap["servers"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_embed_rejects_unknown_type() {
        let (status, body) = get_json(app().await, "/embed/anime/1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid type");
    }
}
