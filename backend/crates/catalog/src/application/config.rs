//! Cache Configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// When a cache hit also kicks off a background refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Every fresh hit spawns a refresh, so a long-lived process keeps
    /// converging on remote state inside the window
    #[default]
    WhileFresh,
    /// Fresh hits are served as-is; the remote is only called once the
    /// envelope has expired
    OnExpiry,
}

impl RefreshPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RefreshPolicy::WhileFresh => "while-fresh",
            RefreshPolicy::OnExpiry => "on-expiry",
        }
    }
}

impl fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown refresh policy '{0}' (expected 'while-fresh' or 'on-expiry')")]
pub struct UnknownRefreshPolicy(pub String);

impl FromStr for RefreshPolicy {
    type Err = UnknownRefreshPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "while-fresh" => Ok(RefreshPolicy::WhileFresh),
            "on-expiry" => Ok(RefreshPolicy::OnExpiry),
            _ => Err(UnknownRefreshPolicy(s.to_string())),
        }
    }
}

/// Read-through cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Store key holding the envelope
    pub cache_key: String,
    /// Maximum age at which an envelope is still served
    pub freshness_window: Duration,
    pub refresh_policy: RefreshPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_key: "community_recipes_cache_v1".to_string(),
            freshness_window: Duration::from_secs(5 * 60),
            refresh_policy: RefreshPolicy::WhileFresh,
        }
    }
}

impl CacheConfig {
    pub fn freshness_window_ms(&self) -> i64 {
        self.freshness_window.as_millis() as i64
    }
}
