//! Stream resolution module
//!
//! Turns a content reference into a playable HLS manifest URL:
//! - Server enumeration (primary and secondary upstream players)
//! - Scrape request construction per server
//! - Manifest extraction from the proxy's captured network requests
//! - One-shot failover from the primary to the secondary server

pub mod resolver;
pub mod scraper;
pub mod server;

pub use resolver::{resolve_with_fallback, StreamDescriptor, StreamSource};
pub use scraper::ScrapeClient;
pub use server::Server;
