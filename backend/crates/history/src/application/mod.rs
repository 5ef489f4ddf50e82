//! Application Layer
//!
//! History configuration and store use cases.

pub mod config;
pub mod store;
