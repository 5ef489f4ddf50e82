//! Presentation Layer
//!
//! HTTP handlers for the cached listing.

pub mod handlers;
pub mod router;
