//! Application Layer
//!
//! Cache configuration and the read-through use case.

pub mod config;
pub mod read_through;
