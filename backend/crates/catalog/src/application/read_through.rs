//! Read-Through Cache Use Case

use crate::application::config::{CacheConfig, RefreshPolicy};
use crate::domain::entities::CacheEnvelope;
use crate::domain::source::RemoteSource;
use crate::error::{CacheError, CacheResult};
use kernel::clock::{Clock, SystemClock};
use platform::store::KeyValueStore;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Where a payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    Cache,
    Remote,
}

/// Result of a cache lookup
#[derive(Debug)]
pub struct CacheOutcome<T> {
    pub payload: T,
    pub served: Served,
    /// Background refresh spawned by this lookup, if any
    pub refresh: Option<JoinHandle<()>>,
}

/// Read-through cache over a [`RemoteSource`]
///
/// Cheap to clone; clones share the same state.
pub struct ReadThroughCache<S, R, C = SystemClock>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: RemoteSource,
    C: Clock + 'static,
{
    inner: Arc<Inner<S, R, C>>,
}

struct Inner<S, R, C> {
    store: Arc<S>,
    source: R,
    clock: C,
    config: CacheConfig,
    /// Bumped by every invalidation; refreshes started under an older
    /// generation do not write
    generation: AtomicU64,
    /// Set by invalidation until a post-invalidation envelope is stored
    invalidated: AtomicBool,
    /// Serializes envelope writes against invalidation
    write_lock: Mutex<()>,
}

impl<S, R, C> Clone for ReadThroughCache<S, R, C>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: RemoteSource,
    C: Clock + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, R> ReadThroughCache<S, R, SystemClock>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: RemoteSource,
{
    pub fn new(store: Arc<S>, source: R, config: CacheConfig) -> Self {
        Self::with_clock(store, source, config, SystemClock)
    }
}

impl<S, R, C> ReadThroughCache<S, R, C>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: RemoteSource,
    C: Clock + 'static,
{
    pub fn with_clock(store: Arc<S>, source: R, config: CacheConfig, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                source,
                clock,
                config,
                generation: AtomicU64::new(0),
                invalidated: AtomicBool::new(false),
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Serve the cached payload when fresh, otherwise fetch synchronously
    pub async fn fetch_with_cache(&self) -> CacheResult<R::Output> {
        self.fetch().await.map(|outcome| outcome.payload)
    }

    /// Like [`fetch_with_cache`](Self::fetch_with_cache), reporting where
    /// the payload came from and handing back any spawned refresh
    pub async fn fetch(&self) -> CacheResult<CacheOutcome<R::Output>> {
        let inner = &self.inner;

        if !inner.invalidated.load(Ordering::SeqCst) {
            if let Some(envelope) = inner.read_envelope().await {
                let now = inner.clock.now_ms();
                if envelope.is_fresh(now, inner.config.freshness_window_ms()) {
                    tracing::debug!(
                        key = %inner.config.cache_key,
                        age_ms = envelope.age_ms(now),
                        "Cache hit"
                    );
                    let refresh = match inner.config.refresh_policy {
                        RefreshPolicy::WhileFresh => Some(self.spawn_refresh()),
                        RefreshPolicy::OnExpiry => None,
                    };
                    return Ok(CacheOutcome {
                        payload: envelope.payload,
                        served: Served::Cache,
                        refresh,
                    });
                }
                tracing::debug!(
                    key = %inner.config.cache_key,
                    age_ms = envelope.age_ms(now),
                    "Cache stale"
                );
            }
        }

        let payload = inner.fetch_and_store().await?;
        Ok(CacheOutcome {
            payload,
            served: Served::Remote,
            refresh: None,
        })
    }

    /// Fetch from the remote now, bypassing any cached envelope
    pub async fn refresh(&self) -> CacheResult<R::Output> {
        self.inner.fetch_and_store().await
    }

    /// Current envelope, without touching the remote
    pub async fn peek(&self) -> Option<CacheEnvelope<R::Output>> {
        self.inner.read_envelope().await
    }

    /// Drop the cached envelope after the remote resource changed
    ///
    /// The next lookup goes to the remote even if the sentinel write
    /// fails, as long as it runs in this process.
    pub async fn invalidate(&self) -> CacheResult<()> {
        let inner = &self.inner;
        let _guard = inner.write_lock.lock().await;

        inner.generation.fetch_add(1, Ordering::SeqCst);
        inner.invalidated.store(true, Ordering::SeqCst);
        inner
            .store
            .set(&inner.config.cache_key, &Value::Null)
            .await?;

        tracing::info!(key = %inner.config.cache_key, "Cache invalidated");
        Ok(())
    }

    /// Spawn a detached refresh whose failure is only logged
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match inner.fetch_and_store().await {
                Ok(_) => {
                    tracing::debug!(key = %inner.config.cache_key, "Background refresh completed");
                }
                Err(e) => {
                    tracing::warn!(
                        key = %inner.config.cache_key,
                        error = %e,
                        "Background refresh failed"
                    );
                }
            }
        })
    }
}

impl<S, R, C> Inner<S, R, C>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: RemoteSource,
    C: Clock + 'static,
{
    /// Stored envelope, or `None` when absent, invalidated or unreadable
    async fn read_envelope(&self) -> Option<CacheEnvelope<R::Output>> {
        let key = &self.config.cache_key;
        let value = match self.store.get(key).await {
            Ok(Some(Value::Null)) | Ok(None) => return None,
            Ok(Some(value)) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache unreadable, treating as empty");
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache envelope corrupt, treating as empty");
                None
            }
        }
    }

    /// Fetch from the remote and store the result
    ///
    /// Fetch errors propagate. Store errors are logged: the caller still
    /// gets the payload it asked for.
    async fn fetch_and_store(&self) -> CacheResult<R::Output> {
        let generation = self.generation.load(Ordering::SeqCst);

        let payload = self.source.fetch().await.map_err(|e| {
            tracing::warn!(key = %self.config.cache_key, error = %e, "Remote fetch failed");
            CacheError::Fetch(e)
        })?;

        let envelope = CacheEnvelope::new(&payload, self.clock.now_ms());
        self.write_envelope(&envelope, generation).await;
        Ok(payload)
    }

    async fn write_envelope(&self, envelope: &CacheEnvelope<&R::Output>, generation: u64) {
        let key = &self.config.cache_key;
        let _guard = self.write_lock.lock().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(key = %key, "Discarding result fetched before invalidation");
            return;
        }

        let value = match serde_json::to_value(envelope) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache envelope could not be encoded");
                return;
            }
        };

        match self.store.set(key, &value).await {
            Ok(()) => {
                self.invalidated.store(false, Ordering::SeqCst);
                tracing::debug!(key = %key, fetched_at_ms = envelope.fetched_at_ms, "Cache stored");
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache write failed");
            }
        }
    }
}
