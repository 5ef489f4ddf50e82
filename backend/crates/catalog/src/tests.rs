//! Unit tests for the catalog cache

#[cfg(test)]
mod read_through_tests {
    use crate::application::config::{CacheConfig, RefreshPolicy};
    use crate::application::read_through::{ReadThroughCache, Served};
    use crate::domain::source::{BoxError, RemoteSource};
    use crate::error::CacheError;
    use kernel::clock::{Clock, ManualClock};
    use platform::store::{KeyValueStore, MemoryStore};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    const KEY: &str = "community_recipes_cache_v1";

    /// Returns `["item<n>"]` on the n-th call; optionally gated and failing
    struct CountingSource {
        started: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
        failing: Arc<AtomicBool>,
        gate: Option<Arc<Semaphore>>,
    }

    impl RemoteSource for CountingSource {
        type Output = Vec<String>;

        async fn fetch(&self) -> Result<Vec<String>, BoxError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.acquire().await?.forget();
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing.load(Ordering::SeqCst) {
                return Err("listing backend unavailable".into());
            }
            Ok(vec![format!("item{}", n)])
        }
    }

    struct Harness {
        cache: ReadThroughCache<MemoryStore, CountingSource, Arc<ManualClock>>,
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        started: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
        failing: Arc<AtomicBool>,
    }

    fn harness_with(
        store: MemoryStore,
        policy: RefreshPolicy,
        gate: Option<Arc<Semaphore>>,
    ) -> Harness {
        let store = Arc::new(store);
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let started = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let failing = Arc::new(AtomicBool::new(false));
        let source = CountingSource {
            started: started.clone(),
            calls: calls.clone(),
            failing: failing.clone(),
            gate,
        };
        let config = CacheConfig {
            refresh_policy: policy,
            ..CacheConfig::default()
        };
        Harness {
            cache: ReadThroughCache::with_clock(store.clone(), source, config, clock.clone()),
            store,
            clock,
            started,
            calls,
            failing,
        }
    }

    fn harness(policy: RefreshPolicy) -> Harness {
        harness_with(MemoryStore::new(), policy, None)
    }

    #[tokio::test]
    async fn test_miss_then_fresh_hit() {
        let h = harness(RefreshPolicy::OnExpiry);

        let first = h.cache.fetch().await.unwrap();
        assert_eq!(first.payload, vec!["item1"]);
        assert_eq!(first.served, Served::Remote);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);

        let second = h.cache.fetch().await.unwrap();
        assert_eq!(second.payload, vec!["item1"]);
        assert_eq!(second.served, Served::Cache);
        assert!(second.refresh.is_none());
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fresh_hit_refreshes_in_background() {
        let h = harness(RefreshPolicy::WhileFresh);
        h.cache.fetch_with_cache().await.unwrap();

        let hit = h.cache.fetch().await.unwrap();
        assert_eq!(hit.payload, vec!["item1"]);
        assert_eq!(hit.served, Served::Cache);

        hit.refresh.expect("refresh spawned").await.unwrap();
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);

        let envelope = h.cache.peek().await.unwrap();
        assert_eq!(envelope.payload, vec!["item2"]);
    }

    #[tokio::test]
    async fn test_stale_envelope_forces_refetch() {
        let h = harness(RefreshPolicy::OnExpiry);
        h.cache.fetch_with_cache().await.unwrap();

        h.clock.advance(Duration::from_secs(5 * 60));
        let outcome = h.cache.fetch().await.unwrap();
        assert_eq!(outcome.served, Served::Remote);
        assert_eq!(outcome.payload, vec!["item2"]);

        let envelope = h.cache.peek().await.unwrap();
        assert_eq!(envelope.payload, vec!["item2"]);
        assert_eq!(envelope.fetched_at_ms, h.clock.now_ms());
    }

    #[tokio::test]
    async fn test_just_inside_window_is_fresh() {
        let h = harness(RefreshPolicy::OnExpiry);
        h.cache.fetch_with_cache().await.unwrap();

        h.clock.advance_ms(5 * 60 * 1000 - 1);
        assert_eq!(h.cache.fetch().await.unwrap().served, Served::Cache);
    }

    #[tokio::test]
    async fn test_invalidation_forces_refetch() {
        let h = harness(RefreshPolicy::OnExpiry);
        h.cache.fetch_with_cache().await.unwrap();

        h.cache.invalidate().await.unwrap();
        assert!(h.cache.peek().await.is_none());
        assert_eq!(
            h.store.get(KEY).await.unwrap(),
            Some(serde_json::Value::Null)
        );

        let outcome = h.cache.fetch().await.unwrap();
        assert_eq!(outcome.served, Served::Remote);
        assert_eq!(outcome.payload, vec!["item2"]);

        // Back to normal caching afterwards
        assert_eq!(h.cache.fetch().await.unwrap().served, Served::Cache);
    }

    #[tokio::test]
    async fn test_invalidation_fences_inflight_refresh() {
        let gate = Arc::new(Semaphore::new(1));
        let h = harness_with(MemoryStore::new(), RefreshPolicy::WhileFresh, Some(gate.clone()));
        h.cache.fetch_with_cache().await.unwrap();

        // Refresh blocks on the gate
        let hit = h.cache.fetch().await.unwrap();
        let refresh = hit.refresh.expect("refresh spawned");
        while h.started.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        h.cache.invalidate().await.unwrap();
        gate.add_permits(1);
        refresh.await.unwrap();

        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
        assert!(h.cache.peek().await.is_none());

        gate.add_permits(1);
        let outcome = h.cache.fetch().await.unwrap();
        assert_eq!(outcome.served, Served::Remote);
        assert_eq!(outcome.payload, vec!["item3"]);
    }

    #[tokio::test]
    async fn test_sync_failure_propagates() {
        let h = harness(RefreshPolicy::WhileFresh);
        h.failing.store(true, Ordering::SeqCst);

        let err = h.cache.fetch_with_cache().await.unwrap_err();
        assert!(matches!(err, CacheError::Fetch(_)));
        assert!(h.cache.peek().await.is_none());
    }

    #[tokio::test]
    async fn test_stale_data_is_not_served_on_failure() {
        let h = harness(RefreshPolicy::OnExpiry);
        h.cache.fetch_with_cache().await.unwrap();

        h.clock.advance(Duration::from_secs(600));
        h.failing.store(true, Ordering::SeqCst);
        assert!(h.cache.fetch_with_cache().await.is_err());
    }

    #[tokio::test]
    async fn test_background_failure_is_swallowed() {
        let h = harness(RefreshPolicy::WhileFresh);
        h.cache.fetch_with_cache().await.unwrap();
        h.failing.store(true, Ordering::SeqCst);

        let hit = h.cache.fetch().await.unwrap();
        assert_eq!(hit.payload, vec!["item1"]);
        hit.refresh.unwrap().await.unwrap();

        let envelope = h.cache.peek().await.unwrap();
        assert_eq!(envelope.payload, vec!["item1"]);
    }

    #[tokio::test]
    async fn test_corrupt_envelope_is_a_miss() {
        let store = MemoryStore::new();
        store.insert_raw(KEY, "{\"payload\": ");
        let h = harness_with(store, RefreshPolicy::OnExpiry, None);

        let outcome = h.cache.fetch().await.unwrap();
        assert_eq!(outcome.served, Served::Remote);

        let store = MemoryStore::new();
        store.insert_raw(KEY, "{\"unexpected\": true}");
        let h = harness_with(store, RefreshPolicy::OnExpiry, None);
        assert_eq!(h.cache.fetch().await.unwrap().served, Served::Remote);
    }

    #[tokio::test]
    async fn test_store_write_failure_still_returns_payload() {
        let h = harness_with(MemoryStore::with_quota(8), RefreshPolicy::OnExpiry, None);

        let payload = h.cache.fetch_with_cache().await.unwrap();
        assert_eq!(payload, vec!["item1"]);
        assert!(h.cache.peek().await.is_none());

        // Nothing cached, so the next call goes remote again
        assert_eq!(h.cache.fetch().await.unwrap().served, Served::Remote);
    }

    #[tokio::test]
    async fn test_forced_refresh() {
        let h = harness(RefreshPolicy::OnExpiry);
        h.cache.fetch_with_cache().await.unwrap();

        assert_eq!(h.cache.refresh().await.unwrap(), vec!["item2"]);
        assert_eq!(h.cache.fetch_with_cache().await.unwrap(), vec!["item2"]);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let h = harness(RefreshPolicy::OnExpiry);
        let other = h.cache.clone();
        h.cache.fetch_with_cache().await.unwrap();

        assert_eq!(other.fetch().await.unwrap().served, Served::Cache);
        other.invalidate().await.unwrap();
        assert_eq!(h.cache.fetch().await.unwrap().served, Served::Remote);
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::CacheError;
    use kernel::error::{app_error::AppError, kind::ErrorKind};
    use platform::store::StoreError;

    #[test]
    fn test_fetch_error_is_upstream() {
        let err = CacheError::Fetch("timeout".into());
        let app: AppError = err.into();
        assert_eq!(app.kind(), ErrorKind::Upstream);
        assert_eq!(app.status_code(), 502);
    }

    #[test]
    fn test_store_error_keeps_classification() {
        let err = CacheError::from(StoreError::QuotaExceeded {
            key: "k".into(),
            reason: "full".into(),
        });
        let app: AppError = err.into();
        assert!(app.is_quota_exceeded());
    }
}

#[cfg(test)]
mod router_tests {
    use crate::application::config::CacheConfig;
    use crate::application::read_through::ReadThroughCache;
    use crate::domain::source::{BoxError, RemoteSource};
    use crate::presentation::router::catalog_router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::response::Response;
    use platform::store::MemoryStore;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct StubListing {
        calls: Arc<AtomicUsize>,
        failing: Arc<AtomicBool>,
    }

    impl RemoteSource for StubListing {
        type Output = Vec<Value>;

        async fn fetch(&self) -> Result<Vec<Value>, BoxError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing.load(Ordering::SeqCst) {
                return Err("connection reset".into());
            }
            Ok(vec![json!({"id": format!("recipe{}", n)})])
        }
    }

    fn cache(source: StubListing) -> ReadThroughCache<MemoryStore, StubListing> {
        ReadThroughCache::new(Arc::new(MemoryStore::new()), source, CacheConfig::default())
    }

    async fn send(app: axum::Router, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_get_listing_reports_cache_status() {
        let source = StubListing::default();
        let cache = cache(source.clone());

        let response = send(catalog_router(cache.clone()), Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-cache"], "miss");
        assert_eq!(body_json(response).await, json!([{"id": "recipe1"}]));

        let response = send(catalog_router(cache), Method::GET, "/").await;
        assert_eq!(response.headers()["x-cache"], "hit");
        assert_eq!(body_json(response).await, json!([{"id": "recipe1"}]));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_bad_gateway() {
        let source = StubListing::default();
        source.failing.store(true, Ordering::SeqCst);

        let response = send(catalog_router(cache(source)), Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let problem = body_json(response).await;
        assert_eq!(problem["status"], 502);
    }

    #[tokio::test]
    async fn test_invalidate_endpoint() {
        let source = StubListing::default();
        let cache = cache(source.clone());
        send(catalog_router(cache.clone()), Method::GET, "/").await;

        let response = send(catalog_router(cache.clone()), Method::POST, "/invalidate").await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(catalog_router(cache), Method::GET, "/").await;
        assert_eq!(response.headers()["x-cache"], "miss");
    }
}
