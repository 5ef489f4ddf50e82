//! Catalog Cache Module
//!
//! Read-through cache with background refresh for slow remote listings
//! (the community recipe listing being the main one).
//!
//! Structure:
//! - `domain/` - Cache envelope and the remote source port
//! - `application/` - Configuration and the read-through use case
//! - `infra/` - HTTP listing source
//! - `presentation/` - HTTP handlers and router
//!
//! ## Freshness Model
//! - An envelope younger than the freshness window is served without a
//!   synchronous remote call
//! - A stale or missing envelope forces a synchronous fetch whose failure
//!   reaches the caller
//! - Background refreshes never surface errors
//! - Invalidation writes a null sentinel and fences off in-flight refreshes

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::{CacheConfig, RefreshPolicy};
pub use application::read_through::{CacheOutcome, ReadThroughCache, Served};
pub use domain::entities::CacheEnvelope;
pub use domain::source::{BoxError, RemoteSource};
pub use error::{CacheError, CacheResult};
pub use infra::http::HttpListingSource;
pub use presentation::router::catalog_router;

#[cfg(test)]
mod tests;
