//! Integration testing helpers
//!
//! In-process fakes for the upstream services (scraping proxy, catalog API,
//! subtitle providers) so handlers and clients can be exercised end to end.

pub mod fixtures;
