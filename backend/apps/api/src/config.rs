//! Server Configuration
//!
//! Read once from the environment at startup.

use anyhow::Context;
use catalog::{CacheConfig, RefreshPolicy};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub listen_addr: SocketAddr,
    /// Root of the file-backed key-value store
    pub data_dir: PathBuf,
    pub listing_url: String,
    pub freshness_window: Duration,
    pub refresh_policy: RefreshPolicy,
    pub store_quota_bytes: Option<u64>,
    pub frontend_origins: Vec<String>,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup; unset and blank values take defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let listen_addr = var("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("LISTEN_ADDR must be a socket address")?;

        let listing_url =
            var("COMMUNITY_LISTING_URL").context("COMMUNITY_LISTING_URL must be set")?;

        let freshness_window = match var("CACHE_FRESHNESS_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse::<u64>()
                    .context("CACHE_FRESHNESS_SECS must be a whole number of seconds")?,
            ),
            None => CacheConfig::default().freshness_window,
        };

        let refresh_policy = match var("CACHE_REFRESH_POLICY") {
            Some(policy) => policy.parse::<RefreshPolicy>()?,
            None => RefreshPolicy::default(),
        };

        let store_quota_bytes = var("STORE_QUOTA_BYTES")
            .map(|q| q.trim().parse::<u64>())
            .transpose()
            .context("STORE_QUOTA_BYTES must be a byte count")?;

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            listen_addr,
            data_dir: var("DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            listing_url,
            freshness_window,
            refresh_policy,
            store_quota_bytes,
            frontend_origins,
        })
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            freshness_window: self.freshness_window,
            refresh_policy: self.refresh_policy,
            ..CacheConfig::default()
        }
    }
}
