//! Presentation Layer
//!
//! HTTP handlers and DTOs for the history log.

pub mod dto;
pub mod handlers;
pub mod router;
