//! Shared Kernel - Cross-component minimal core
//!
//! This crate contains the vocabulary every local-state component shares:
//! - Common error types and result aliases
//! - Typed ID wrappers
//! - The injectable clock used for cooldowns, freshness and timestamps
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across the rate limiter, cache and history.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod clock;
pub mod id;
