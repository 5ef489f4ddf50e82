//! Infrastructure Layer
//!
//! Remote source adapters.

pub mod http;
