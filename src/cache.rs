//! Single-slot TTL cache in front of the remote snapshot source.
//!
//! A polling dashboard would otherwise hit the blob store on every
//! request; a 10-second freshness window bounds that load while keeping
//! staleness imperceptible. The cache fails closed: any error during a
//! refresh clears the slot before propagating, so a stale document is
//! never served to mask a failure and the next call retries from scratch.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StateError;
use crate::source::blob::RemoteSource;
use crate::types::StateDocument;

/// Freshness window: maximum age of a cached snapshot before a refetch.
const CACHE_TTL: Duration = Duration::from_millis(10_000);

/// The one cached snapshot. Replaced wholesale on refresh, never patched.
struct CacheEntry {
    url: String,
    document: Arc<StateDocument>,
    fetched_at: Instant,
}

/// Time-boxed cache over the remote source.
///
/// Holds exactly one entry or none. The tokio mutex serializes refreshes,
/// which makes the replace-wholesale discipline explicit; concurrent
/// readers within the window share the same `Arc`'d document.
pub struct StateCache {
    remote: RemoteSource,
    slot: Mutex<Option<CacheEntry>>,
    ttl: Duration,
}

impl StateCache {
    pub fn new(remote: RemoteSource) -> Self {
        Self::with_ttl(remote, CACHE_TTL)
    }

    /// Construct with a custom freshness window (tests).
    pub fn with_ttl(remote: RemoteSource, ttl: Duration) -> Self {
        Self {
            remote,
            slot: Mutex::new(None),
            ttl,
        }
    }

    /// Return the cached document if fresh, otherwise refetch.
    ///
    /// On any failure during the refresh — listing, fetch, non-success
    /// status, parse — the slot is cleared before the error propagates.
    pub async fn get(&self) -> Result<Arc<StateDocument>, StateError> {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!(url = %entry.url, "Serving cached state");
                return Ok(Arc::clone(&entry.document));
            }
        }

        match self.refresh().await {
            Ok((url, document)) => {
                debug!(url = %url, "State cache refreshed");
                *slot = Some(CacheEntry {
                    url,
                    document: Arc::clone(&document),
                    fetched_at: Instant::now(),
                });
                Ok(document)
            }
            Err(e) => {
                // Invalidate so the next call never serves stale data.
                warn!(error = %e, "State refresh failed, cache invalidated");
                *slot = None;
                Err(e)
            }
        }
    }

    /// Resolve the latest blob URL and fetch its content fresh.
    async fn refresh(&self) -> Result<(String, Arc<StateDocument>), StateError> {
        let url = self.remote.latest_url().await?;
        let document = self.remote.fetch(&url).await?;
        Ok((url, Arc::new(document)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::blob::{BlobInfo, BlobStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    const SNAPSHOT: &str = r#"{
        "timestamp": "2026-02-21T12:00:00Z",
        "session_start_time": "2026-02-21T08:00:00Z",
        "initial_balance": 10000,
        "traders": {}
    }"#;

    /// In-memory blob store that counts calls and can force errors.
    struct CountingStore {
        payload: StdMutex<Vec<u8>>,
        list_calls: AtomicUsize,
        get_calls: AtomicUsize,
        force_error: StdMutex<Option<String>>,
        empty_listing: StdMutex<bool>,
    }

    impl CountingStore {
        fn new(payload: &str) -> Self {
            Self {
                payload: StdMutex::new(payload.as_bytes().to_vec()),
                list_calls: AtomicUsize::new(0),
                get_calls: AtomicUsize::new(0),
                force_error: StdMutex::new(None),
                empty_listing: StdMutex::new(false),
            }
        }

        fn set_error(&self, msg: &str) {
            *self.force_error.lock().unwrap() = Some(msg.to_string());
        }

        fn clear_error(&self) {
            *self.force_error.lock().unwrap() = None;
        }

        fn fetches(&self) -> usize {
            self.get_calls.load(Ordering::SeqCst)
        }

        fn check_error(&self) -> Result<(), StateError> {
            if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
                return Err(StateError::Io(msg.clone()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl BlobStore for CountingStore {
        async fn list(&self, _prefix: &str) -> Result<Vec<BlobInfo>, StateError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.check_error()?;
            if *self.empty_listing.lock().unwrap() {
                return Ok(Vec::new());
            }
            Ok(vec![BlobInfo {
                url: "https://store.example.com/trading-state.json".to_string(),
                pathname: "trading-state.json".to_string(),
                uploaded_at: None,
            }])
        }

        async fn get(&self, _url: &str) -> Result<Vec<u8>, StateError> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            self.check_error()?;
            Ok(self.payload.lock().unwrap().clone())
        }

        async fn put(&self, _name: &str, _body: &[u8]) -> Result<BlobInfo, StateError> {
            unimplemented!("not used by cache tests")
        }

        async fn delete(&self, _url: &str) -> Result<(), StateError> {
            unimplemented!("not used by cache tests")
        }
    }

    fn cache_over(store: Arc<CountingStore>, ttl: Duration) -> StateCache {
        let remote = RemoteSource::new(store, "trading-state.json");
        StateCache::with_ttl(remote, ttl)
    }

    #[tokio::test]
    async fn test_fresh_hit_fetches_once() {
        let store = Arc::new(CountingStore::new(SNAPSHOT));
        let cache = cache_over(Arc::clone(&store), Duration::from_secs(10));

        cache.get().await.unwrap();
        cache.get().await.unwrap();

        assert_eq!(store.fetches(), 1);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let store = Arc::new(CountingStore::new(SNAPSHOT));
        let cache = cache_over(Arc::clone(&store), Duration::ZERO);

        cache.get().await.unwrap();
        cache.get().await.unwrap();

        assert_eq!(store.fetches(), 2);
    }

    #[tokio::test]
    async fn test_error_invalidates_cache() {
        let store = Arc::new(CountingStore::new(SNAPSHOT));
        // Zero TTL so every call goes through a refresh.
        let cache = cache_over(Arc::clone(&store), Duration::ZERO);

        cache.get().await.unwrap();

        store.set_error("store down");
        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, StateError::Io(_)));

        // The stale entry must not be served even within a long window:
        // rebuild the window check by clearing the error and observing a
        // fresh fetch on the next call.
        store.clear_error();
        let fetched_before = store.fetches();
        cache.get().await.unwrap();
        assert_eq!(store.fetches(), fetched_before + 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_slot() {
        let store = Arc::new(CountingStore::new(SNAPSHOT));
        let cache = cache_over(Arc::clone(&store), Duration::ZERO);

        cache.get().await.unwrap();
        assert!(cache.slot.lock().await.is_some());

        store.set_error("listing failed");
        cache.get().await.unwrap_err();
        assert!(cache.slot.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_found() {
        let store = Arc::new(CountingStore::new(SNAPSHOT));
        *store.empty_listing.lock().unwrap() = true;
        let cache = cache_over(Arc::clone(&store), Duration::from_secs(10));

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, StateError::NotFound(_)));
        assert!(err.to_string().contains("Upload state data first"));
    }

    #[tokio::test]
    async fn test_parse_error_invalidates() {
        let store = Arc::new(CountingStore::new(SNAPSHOT));
        let cache = cache_over(Arc::clone(&store), Duration::ZERO);

        cache.get().await.unwrap();

        *store.payload.lock().unwrap() = b"{ truncated".to_vec();
        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, StateError::Parse(_)));
        assert!(cache.slot.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_cached_document_is_shared() {
        let store = Arc::new(CountingStore::new(SNAPSHOT));
        let cache = cache_over(store, Duration::from_secs(10));

        let a = cache.get().await.unwrap();
        let b = cache.get().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
