//! Stream resolution with failover

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::content::ContentRef;
use crate::error::ResolveError;

use super::Server;

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    /// Manifest URL; not stable across reloads
    pub url: String,
    /// Server that produced the URL
    pub server: Server,
}

/// Anything that can resolve a manifest URL on a specific server
#[async_trait]
pub trait StreamSource: Send + Sync {
    async fn resolve_on(
        &self,
        content: &ContentRef,
        server: Server,
    ) -> Result<StreamDescriptor, ResolveError>;
}

/// Resolve on the preferred server, falling back once to the secondary.
///
/// The fallback only happens when the preferred server is the primary one.
/// Attempts are sequential: the secondary is contacted only after the
/// primary's failure has been observed.
pub async fn resolve_with_fallback<S>(
    source: &S,
    content: &ContentRef,
    preferred: Server,
) -> Result<StreamDescriptor, ResolveError>
where
    S: StreamSource + ?Sized,
{
    let primary_err = match source.resolve_on(content, preferred).await {
        Ok(descriptor) => return Ok(descriptor),
        Err(e) => e,
    };

    if !preferred.is_primary() {
        warn!("{} failed for {}: {}", preferred, content.target_path(), primary_err);
        return Err(primary_err);
    }

    let secondary = preferred.fallback();
    warn!(
        "{} failed for {}: {}; trying {}",
        preferred,
        content.target_path(),
        primary_err,
        secondary
    );

    match source.resolve_on(content, secondary).await {
        Ok(descriptor) => {
            info!("Fell back to {} for {}", secondary, content.target_path());
            Ok(descriptor)
        }
        Err(secondary_err) => {
            warn!("Both servers failed for {}", content.target_path());
            Err(ResolveError::AllServersFailed {
                primary: Box::new(primary_err),
                secondary: Box::new(secondary_err),
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory source with a fixed outcome per server
    pub(crate) struct FakeSource {
        outcomes: HashMap<Server, Option<String>>,
        pub calls: Mutex<Vec<Server>>,
    }

    impl FakeSource {
        pub(crate) fn new(veronica: Option<&str>, vienna: Option<&str>) -> Self {
            let mut outcomes = HashMap::new();
            outcomes.insert(Server::Veronica, veronica.map(str::to_string));
            outcomes.insert(Server::Vienna, vienna.map(str::to_string));
            Self {
                outcomes,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StreamSource for FakeSource {
        async fn resolve_on(
            &self,
            _content: &ContentRef,
            server: Server,
        ) -> Result<StreamDescriptor, ResolveError> {
            self.calls.lock().push(server);
            match self.outcomes.get(&server).cloned().flatten() {
                Some(url) => Ok(StreamDescriptor { url, server }),
                None => Err(ResolveError::NoManifest { server }),
            }
        }
    }

    #[tokio::test]
    async fn test_primary_success_does_not_touch_secondary() {
        let source = FakeSource::new(Some("https://a/master.m3u8"), Some("https://b/master.m3u8"));
        let content = ContentRef::movie("550");

        let got = resolve_with_fallback(&source, &content, Server::Veronica)
            .await
            .unwrap();

        assert_eq!(got.server, Server::Veronica);
        assert_eq!(*source.calls.lock(), vec![Server::Veronica]);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_secondary() {
        let source = FakeSource::new(None, Some("https://b/master.m3u8"));
        let content = ContentRef::episode("1434", "1", "1");

        let got = resolve_with_fallback(&source, &content, Server::Veronica)
            .await
            .unwrap();

        assert_eq!(
            got,
            StreamDescriptor {
                url: "https://b/master.m3u8".to_string(),
                server: Server::Vienna,
            }
        );
        assert_eq!(*source.calls.lock(), vec![Server::Veronica, Server::Vienna]);
    }

    #[tokio::test]
    async fn test_both_failing_reports_both_contexts() {
        let source = FakeSource::new(None, None);
        let content = ContentRef::movie("550");

        let err = resolve_with_fallback(&source, &content, Server::Veronica)
            .await
            .unwrap_err();

        match &err {
            ResolveError::AllServersFailed { primary, secondary } => {
                assert_eq!(primary.server(), Server::Veronica);
                assert_eq!(secondary.server(), Server::Vienna);
            }
            other => panic!("unexpected error: {other}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("veronica"));
        assert!(msg.contains("vienna"));
        assert_eq!(source.calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_secondary_preferred_does_not_fall_back() {
        let source = FakeSource::new(Some("https://a/master.m3u8"), None);
        let content = ContentRef::movie("550");

        let err = resolve_with_fallback(&source, &content, Server::Vienna)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::NoManifest { server: Server::Vienna }));
        assert_eq!(*source.calls.lock(), vec![Server::Vienna]);
    }
}
