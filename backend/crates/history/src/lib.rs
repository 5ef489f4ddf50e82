//! History Module
//!
//! Bounded local log of generated artifacts.
//!
//! Structure:
//! - `domain/` - History record entities
//! - `application/` - Configuration and the store use cases
//! - `presentation/` - HTTP DTOs, handlers and router
//!
//! ## Storage Model
//! - The whole log is one JSON list under a single store key, newest first
//! - At most `max_records` entries are kept; older ones fall off the end
//! - Images are compacted before they are persisted
//! - A quota-exceeded write is retried once with a shorter list; a failure
//!   after that yields an empty result instead of an error

pub mod application;
pub mod domain;
pub mod error;
pub mod presentation;

pub use application::config::HistoryConfig;
pub use application::store::HistoryStore;
pub use domain::entities::{HistoryRecord, NewHistoryRecord};
pub use error::{HistoryError, HistoryResult};
pub use kernel::id::HistoryRecordId;
pub use presentation::router::history_router;
