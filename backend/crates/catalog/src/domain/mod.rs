//! Domain Layer
//!
//! Cache envelope and the remote source abstraction.

pub mod entities;
pub mod source;
