//! Server configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default User-Agent sent to the scraping proxy and subtitle providers
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached catalog responses
    pub max_entries: usize,

    /// Time-to-live for cached responses in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            ttl_secs: 300, // 5 minutes
        }
    }
}

/// Outbound HTTP settings shared by all upstream clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// User-Agent header for upstream requests
    pub user_agent: String,

    /// Request timeout in seconds (None = network stack default)
    pub timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Catalog (metadata) API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog API
    pub base_url: String,

    /// Base URL for derived image URLs
    pub image_base_url: String,

    /// Language requested from the catalog
    pub language: String,

    /// Explicit API key; takes precedence over the environment
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Response cache
    pub cache: CacheConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            language: "en-US".to_string(),
            api_key: None,
            api_key_env: "TMDB_API_KEY".to_string(),
            cache: CacheConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Scraping proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Base URL of the scraping proxy
    pub base_url: String,

    /// Upstream player URL for the primary server
    pub veronica_player_url: String,

    /// Upstream player URL for the secondary server
    pub vienna_player_url: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://scrape.lordflix.club".to_string(),
            veronica_player_url: "https://player.videasy.net".to_string(),
            vienna_player_url: "https://vidlink.pro".to_string(),
        }
    }
}

/// Subtitle provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleConfig {
    /// Base URL of the direct search provider
    pub search_url: String,

    /// Base URL of the plain-blob provider
    pub blob_url: String,

    /// Number of downloaded subtitle texts kept in memory
    pub track_cache_size: usize,

    /// Extra hosts remote tracks may be loaded from, besides the two
    /// provider origins. Loopback, private and link-local hosts are never
    /// accepted here.
    #[serde(default)]
    pub track_hosts: Vec<String>,

    /// Largest subtitle body accepted, in bytes
    #[serde(default = "default_max_track_bytes")]
    pub max_track_bytes: usize,
}

fn default_max_track_bytes() -> usize {
    2 * 1024 * 1024
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            search_url: "https://sub.wyzie.ru".to_string(),
            blob_url: "https://rainsubs.com".to_string(),
            track_cache_size: 64,
            track_hosts: Vec::new(),
            max_track_bytes: default_max_track_bytes(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,

    /// Outbound HTTP settings
    pub upstream: UpstreamConfig,

    /// Catalog API settings
    pub catalog: CatalogConfig,

    /// Scraping proxy settings
    pub scraper: ScraperConfig,

    /// Subtitle provider settings
    pub subtitles: SubtitleConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            upstream: UpstreamConfig::default(),
            catalog: CatalogConfig::default(),
            scraper: ScraperConfig::default(),
            subtitles: SubtitleConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether logs should be emitted as JSON lines
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
