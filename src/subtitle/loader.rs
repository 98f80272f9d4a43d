//! Subtitle text loading
//!
//! Inline `data:` URLs are decoded locally. Remote tracks are downloaded
//! once and kept in a small LRU cache, so re-timing a track does not hit
//! the network again.
//!
//! Remote loads are limited to the provider origins plus configured hosts,
//! never reach loopback, private or link-local addresses, and stop at a
//! size cap.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use lru::LruCache;
use parking_lot::Mutex;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, warn};
use url::{Host, Origin, Url};

use crate::config::SubtitleConfig;
use crate::error::SubtitleError;

/// Fallback capacity when the configured size is zero
const MIN_CACHE_SIZE: NonZeroUsize = NonZeroUsize::MIN;

pub struct TrackLoader {
    http: reqwest::Client,
    cache: Mutex<LruCache<String, Arc<str>>>,
    provider_origins: Vec<Origin>,
    track_hosts: Vec<String>,
    max_bytes: usize,
}

impl TrackLoader {
    pub fn new(http: reqwest::Client, config: &SubtitleConfig) -> Self {
        let capacity = NonZeroUsize::new(config.track_cache_size).unwrap_or(MIN_CACHE_SIZE);
        let provider_origins = [&config.search_url, &config.blob_url]
            .into_iter()
            .filter_map(|base| Url::parse(base).ok())
            .map(|url| url.origin())
            .filter(Origin::is_tuple)
            .collect();
        Self {
            http,
            cache: Mutex::new(LruCache::new(capacity)),
            provider_origins,
            track_hosts: config.track_hosts.clone(),
            max_bytes: config.max_track_bytes,
        }
    }

    /// Load the text behind a track URL
    pub async fn load_text(&self, url: &str) -> Result<Arc<str>, SubtitleError> {
        if let Some(rest) = url.strip_prefix("data:") {
            return decode_data_url(rest).map(Arc::from);
        }

        let scheme = url.split_once(':').map(|(s, _)| s).unwrap_or("");
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(SubtitleError::UnsupportedScheme(scheme.to_string()));
        }

        let parsed = Url::parse(url)?;
        self.check_remote(&parsed)?;

        let cached = self.cache.lock().get(url).cloned();
        if let Some(hit) = cached {
            debug!("Subtitle cache hit: {}", url);
            return Ok(hit);
        }

        debug!("Downloading subtitle track: {}", parsed);
        let text: Arc<str> = Arc::from(self.fetch_capped(parsed).await?);
        self.cache.lock().put(url.to_string(), text.clone());
        Ok(text)
    }

    /// Provider origins are always allowed; configured hosts only when they
    /// are not internal addresses.
    fn check_remote(&self, url: &Url) -> Result<(), SubtitleError> {
        if self.provider_origins.contains(&url.origin()) {
            return Ok(());
        }

        let host = url.host_str().unwrap_or_default();
        let listed = self.track_hosts.iter().any(|h| h.eq_ignore_ascii_case(host));
        if listed && !is_internal_host(url) {
            return Ok(());
        }

        warn!("Refusing subtitle track from {}", host);
        Err(SubtitleError::HostNotAllowed(host.to_string()))
    }

    async fn fetch_capped(&self, url: Url) -> Result<String, SubtitleError> {
        let mut response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubtitleError::UpstreamStatus {
                provider: "track",
                status,
            });
        }

        let limit = self.max_bytes;
        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(SubtitleError::TooLarge { limit });
        }

        // Chunked bodies carry no length; count as we go
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(SubtitleError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }
}

/// Whether a URL points at loopback, private, link-local or unspecified
/// addresses, or at `localhost`
pub fn is_internal_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(ip)) => is_internal_v4(ip),
        Some(Host::Ipv6(ip)) => is_internal_v6(ip),
        Some(Host::Domain(name)) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            name == "localhost" || name.ends_with(".localhost")
        }
        None => true,
    }
}

fn is_internal_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
}

fn is_internal_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_internal_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local
        || (first & 0xffc0) == 0xfe80 // link local
}

/// Decode the part of a `data:` URL after the scheme.
///
/// A `;base64` header means the payload is base64; anything else is taken
/// verbatim.
fn decode_data_url(rest: &str) -> Result<String, SubtitleError> {
    let (header, payload) = rest.split_once(',').ok_or(SubtitleError::MalformedDataUrl)?;

    if header.to_ascii_lowercase().ends_with(";base64") {
        let bytes = STANDARD.decode(payload.trim())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    } else {
        Ok(payload.to_string())
    }
}
