//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the API, embed and service endpoints
//! - JSON API handlers for streams, catalog and subtitles
//! - The embeddable player page
//! - Request id and logging middleware
//! - CORS middleware

pub mod api;
pub mod embed;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
