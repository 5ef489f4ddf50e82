//! Platform Crate - Technical Infrastructure
//!
//! This crate provides the local-state building blocks:
//! - Cooldown rate limiting for caller-identified operations
//! - Key-value store port with in-memory and file-backed implementations
//! - Image compaction port with a JPEG data-URL implementation

pub mod compaction;
pub mod rate_limit;
pub mod store;
