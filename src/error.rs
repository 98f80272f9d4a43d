use thiserror::Error;

use crate::stream::Server;

/// Main error type for the embed server
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Stream resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// Errors raised while turning a content reference into a manifest URL
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("{server} scrape failed: {status}")]
    UpstreamStatus {
        server: Server,
        status: reqwest::StatusCode,
    },

    #[error("{server} scrape request failed: {source}")]
    Request {
        server: Server,
        #[source]
        source: reqwest::Error,
    },

    #[error("No HLS stream found from {server}")]
    NoManifest { server: Server },

    #[error("Invalid scrape URL for {server}: {reason}")]
    InvalidUrl { server: Server, reason: String },

    #[error("Both servers failed: {primary}; {secondary}")]
    AllServersFailed {
        primary: Box<ResolveError>,
        secondary: Box<ResolveError>,
    },
}

impl ResolveError {
    /// The server whose failure this error describes.
    ///
    /// For a combined failure this is the server that was tried last.
    pub fn server(&self) -> Server {
        match self {
            ResolveError::UpstreamStatus { server, .. }
            | ResolveError::Request { server, .. }
            | ResolveError::NoManifest { server }
            | ResolveError::InvalidUrl { server, .. } => *server,
            ResolveError::AllServersFailed { secondary, .. } => secondary.server(),
        }
    }
}

/// Catalog (metadata) API errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{0} environment variable is required")]
    MissingApiKey(String),

    #[error("Failed to fetch {what}: {status}")]
    UpstreamStatus {
        what: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Subtitle loading and conversion errors
#[derive(Error, Debug)]
pub enum SubtitleError {
    #[error("Unsupported subtitle URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Malformed data URL")]
    MalformedDataUrl,

    #[error("Subtitle host not allowed: {0}")]
    HostNotAllowed(String),

    #[error("Subtitle track exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Subtitle provider {provider} returned {status}")]
    UpstreamStatus {
        provider: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Subtitle request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid subtitle URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_error_mentions_both_servers() {
        let err = ResolveError::AllServersFailed {
            primary: Box::new(ResolveError::NoManifest {
                server: Server::Veronica,
            }),
            secondary: Box::new(ResolveError::UpstreamStatus {
                server: Server::Vienna,
                status: reqwest::StatusCode::BAD_GATEWAY,
            }),
        };

        let msg = err.to_string();
        assert!(msg.contains("No HLS stream found from veronica"));
        assert!(msg.contains("vienna scrape failed: 502 Bad Gateway"));
        assert_eq!(err.server(), Server::Vienna);
    }

    #[test]
    fn test_missing_api_key_message() {
        let err = CatalogError::MissingApiKey("TMDB_API_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "TMDB_API_KEY environment variable is required"
        );
    }
}
