//! Upstream player servers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the two upstream players the scraping proxy can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Server {
    /// Primary server
    #[default]
    Veronica,
    /// Secondary server
    Vienna,
}

impl Server {
    pub const ALL: [Server; 2] = [Server::Veronica, Server::Vienna];

    /// Wire name used in query strings and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            Server::Veronica => "veronica",
            Server::Vienna => "vienna",
        }
    }

    /// Name shown in the server menu
    pub fn display_name(&self) -> &'static str {
        match self {
            Server::Veronica => "Veronica",
            Server::Vienna => "Vienna",
        }
    }

    pub fn is_primary(&self) -> bool {
        *self == Server::Veronica
    }

    /// The server to try when this one fails
    pub fn fallback(&self) -> Server {
        match self {
            Server::Veronica => Server::Vienna,
            Server::Vienna => Server::Veronica,
        }
    }

    /// DOM selector the proxy clicks before waiting, if any
    pub fn click_selector(&self) -> Option<&'static str> {
        match self {
            Server::Veronica => Some(".play-icon-main"),
            Server::Vienna => None,
        }
    }

    /// Request pattern the proxy waits for
    pub fn wait_for(&self) -> &'static str {
        ".m3u8"
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a server name matches neither upstream player
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown server: {0}")]
pub struct UnknownServer(pub String);

impl FromStr for Server {
    type Err = UnknownServer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "veronica" => Ok(Server::Veronica),
            "vienna" => Ok(Server::Vienna),
            other => Err(UnknownServer(other.to_string())),
        }
    }
}
