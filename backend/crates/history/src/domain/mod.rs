//! Domain Layer

pub mod entities;
