//! Domain Entities

use serde::{Deserialize, Serialize};

/// A cached remote result plus the time it was fetched
///
/// Replaced wholesale on every successful fetch, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEnvelope<T> {
    pub payload: T,
    #[serde(rename = "fetchedAtEpochMs")]
    pub fetched_at_ms: i64,
}

impl<T> CacheEnvelope<T> {
    pub fn new(payload: T, fetched_at_ms: i64) -> Self {
        Self {
            payload,
            fetched_at_ms,
        }
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.fetched_at_ms
    }

    /// Fresh while strictly younger than the window
    pub fn is_fresh(&self, now_ms: i64, freshness_window_ms: i64) -> bool {
        self.age_ms(now_ms) < freshness_window_ms
    }
}
