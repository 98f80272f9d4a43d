//! Configuration file support
//!
//! Loads server configuration from TOML files. Every section except
//! `[server]` is optional and falls back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{
    CacheConfig, CatalogConfig, ScraperConfig, ServerConfig, SubtitleConfig, UpstreamConfig,
};

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: ServerSettings,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
    /// Outbound HTTP settings
    pub upstream: Option<UpstreamSettings>,
    /// Catalog settings
    pub catalog: Option<CatalogSettings>,
    /// Scraper settings
    pub scraper: Option<ScraperSettings>,
    /// Subtitle provider settings
    pub subtitles: Option<SubtitleSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    pub base_url: Option<String>,
    pub image_base_url: Option<String>,
    pub language: Option<String>,
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    /// Maximum number of cached responses
    pub cache_max_entries: Option<usize>,
    /// TTL for cached responses in seconds
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperSettings {
    pub base_url: Option<String>,
    pub veronica_player_url: Option<String>,
    pub vienna_player_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleSettings {
    pub search_url: Option<String>,
    pub blob_url: Option<String>,
    pub track_cache_size: Option<usize>,
    pub track_hosts: Option<Vec<String>>,
    pub max_track_bytes: Option<usize>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let defaults = ServerConfig::default();
        Self {
            server: ServerSettings {
                host: defaults.host,
                port: defaults.port,
                cors_enabled: Some(defaults.cors_enabled),
            },
            logging: Some(LoggingSettings {
                level: defaults.log_level,
                format: Some(defaults.log_format),
            }),
            upstream: Some(UpstreamSettings {
                user_agent: Some(defaults.upstream.user_agent),
                timeout_secs: defaults.upstream.timeout_secs,
            }),
            catalog: Some(CatalogSettings {
                base_url: Some(defaults.catalog.base_url),
                image_base_url: Some(defaults.catalog.image_base_url),
                language: Some(defaults.catalog.language),
                api_key: None,
                api_key_env: Some(defaults.catalog.api_key_env),
                cache_max_entries: Some(defaults.catalog.cache.max_entries),
                cache_ttl_secs: Some(defaults.catalog.cache.ttl_secs),
            }),
            scraper: Some(ScraperSettings {
                base_url: Some(defaults.scraper.base_url),
                veronica_player_url: Some(defaults.scraper.veronica_player_url),
                vienna_player_url: Some(defaults.scraper.vienna_player_url),
            }),
            subtitles: Some(SubtitleSettings {
                search_url: Some(defaults.subtitles.search_url),
                blob_url: Some(defaults.subtitles.blob_url),
                track_cache_size: Some(defaults.subtitles.track_cache_size),
                track_hosts: Some(defaults.subtitles.track_hosts),
                max_track_bytes: Some(defaults.subtitles.max_track_bytes),
            }),
        }
    }

    /// Convert to ServerConfig
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();

        let upstream = match self.upstream {
            Some(u) => UpstreamConfig {
                user_agent: u.user_agent.unwrap_or(defaults.upstream.user_agent),
                timeout_secs: u.timeout_secs,
            },
            None => defaults.upstream,
        };

        let catalog = match self.catalog {
            Some(c) => CatalogConfig {
                base_url: c.base_url.unwrap_or(defaults.catalog.base_url),
                image_base_url: c.image_base_url.unwrap_or(defaults.catalog.image_base_url),
                language: c.language.unwrap_or(defaults.catalog.language),
                api_key: c.api_key,
                api_key_env: c.api_key_env.unwrap_or(defaults.catalog.api_key_env),
                cache: CacheConfig {
                    max_entries: c
                        .cache_max_entries
                        .unwrap_or(defaults.catalog.cache.max_entries),
                    ttl_secs: c.cache_ttl_secs.unwrap_or(defaults.catalog.cache.ttl_secs),
                },
            },
            None => defaults.catalog,
        };

        let scraper = match self.scraper {
            Some(s) => ScraperConfig {
                base_url: s.base_url.unwrap_or(defaults.scraper.base_url),
                veronica_player_url: s
                    .veronica_player_url
                    .unwrap_or(defaults.scraper.veronica_player_url),
                vienna_player_url: s
                    .vienna_player_url
                    .unwrap_or(defaults.scraper.vienna_player_url),
            },
            None => defaults.scraper,
        };

        let subtitles = match self.subtitles {
            Some(s) => SubtitleConfig {
                search_url: s.search_url.unwrap_or(defaults.subtitles.search_url),
                blob_url: s.blob_url.unwrap_or(defaults.subtitles.blob_url),
                track_cache_size: s
                    .track_cache_size
                    .unwrap_or(defaults.subtitles.track_cache_size),
                track_hosts: s.track_hosts.unwrap_or(defaults.subtitles.track_hosts),
                max_track_bytes: s
                    .max_track_bytes
                    .unwrap_or(defaults.subtitles.max_track_bytes),
            },
            None => defaults.subtitles,
        };

        let (log_level, log_format) = match self.logging {
            Some(l) => (l.level, l.format.unwrap_or(defaults.log_format)),
            None => (defaults.log_level, defaults.log_format),
        };

        ServerConfig {
            host: self.server.host,
            port: self.server.port,
            cors_enabled: self.server.cors_enabled.unwrap_or(true),
            log_level,
            log_format,
            upstream,
            catalog,
            scraper,
            subtitles,
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}
