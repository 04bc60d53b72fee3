//! Stale-while-revalidate JSON cache.
//!
//! Payloads are stored under `"cache:" + key` as `{"ts", "data"}` objects in
//! a [`KeyValueStore`]. Storage is best-effort: read failures and corrupted
//! entries count as misses and write failures are ignored, so the cache is
//! never the reason a fetch fails.

mod entry;
mod store;

pub use entry::CacheEntry;
pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::error::DataError;
use entry::CacheEntryRef;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Prefix applied to every key in the backing store.
pub const NAMESPACE: &str = "cache:";

/// Default time-to-live of an entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Read policy for a single cached fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Entries younger than this are served without fetching.
    pub ttl: Duration,
    /// Serve stale entries immediately and refresh them in the background.
    pub stale_while_revalidate: bool,
}

impl CacheOptions {
    /// Default options with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    /// Disables stale-while-revalidate.
    #[must_use]
    pub fn revalidate_sync(mut self) -> Self {
        self.stale_while_revalidate = false;
        self
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            stale_while_revalidate: true,
        }
    }
}

/// How a lookup was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// Entry younger than the TTL; no fetch.
    Fresh,
    /// Stale entry served while a background fetch refreshes it.
    Stale,
    /// Fetched now and stored.
    Fetched,
}

/// Result of [`JsonCache::lookup`].
#[derive(Debug)]
pub struct CacheLookup {
    pub payload: Value,
    pub source: CacheSource,
    /// A background refresh was spawned for a stale hit; see [`JsonCache::settle`].
    pub revalidating: bool,
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// JSON cache over a shared key/value store.
///
/// Clones share the store and the set of in-flight refreshes.
#[derive(Clone)]
pub struct JsonCache {
    store: Arc<dyn KeyValueStore>,
    revalidations: Arc<Mutex<JoinSet<()>>>,
}

impl JsonCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            revalidations: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Cache over a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Reads the entry for `key`. Missing, unreadable and corrupted entries
    /// all read as `None`.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let raw = match self.store.get(&namespaced(key)).await {
            Ok(raw) => raw?,
            Err(e) => {
                debug!(key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(key = %key, error = %e, "Corrupted cache entry, treating as miss");
                None
            }
        }
    }

    /// Writes `data` for `key` with timestamp `stored_at`. Failures are logged
    /// and otherwise ignored.
    pub async fn set(&self, key: &str, data: &Value, stored_at: i64) {
        let raw = match serde_json::to_string(&CacheEntryRef {
            ts: stored_at,
            data,
        }) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Could not serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.store.set(&namespaced(key), raw).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }

    /// Returns the payload for `key`, fetching it with `fetcher` when needed.
    ///
    /// # Errors
    /// Returns the fetcher's error when there is no usable cached payload:
    /// the key is absent, or stale while `stale_while_revalidate` is off.
    pub async fn cached_fetch<F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        options: CacheOptions,
    ) -> Result<Value, DataError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, DataError>> + Send + 'static,
    {
        self.lookup(key, fetcher, options)
            .await
            .map(|lookup| lookup.payload)
    }

    /// Like [`cached_fetch`](Self::cached_fetch), also reporting how the
    /// payload was obtained and whether a background refresh was spawned.
    ///
    /// # Errors
    /// See [`cached_fetch`](Self::cached_fetch). An empty key is rejected.
    pub async fn lookup<F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        options: CacheOptions,
    ) -> Result<CacheLookup, DataError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, DataError>> + Send + 'static,
    {
        if key.is_empty() {
            return Err(DataError::EmptyKey);
        }

        match self.get(key).await {
            Some(entry) if entry.is_fresh(now_millis(), options.ttl) => {
                debug!(key = %key, "Cache hit");
                Ok(CacheLookup {
                    payload: entry.data,
                    source: CacheSource::Fresh,
                    revalidating: false,
                })
            }
            Some(entry) if options.stale_while_revalidate => {
                debug!(key = %key, age_ms = entry.age_ms(now_millis()), "Serving stale entry, revalidating");
                self.spawn_revalidation(key.to_string(), fetcher).await;
                Ok(CacheLookup {
                    payload: entry.data,
                    source: CacheSource::Stale,
                    revalidating: true,
                })
            }
            _ => {
                debug!(key = %key, "Cache miss");
                let data = fetcher().await?;
                self.set(key, &data, now_millis()).await;
                Ok(CacheLookup {
                    payload: data,
                    source: CacheSource::Fetched,
                    revalidating: false,
                })
            }
        }
    }

    /// Waits for every background refresh spawned so far, including ones
    /// spawned while waiting.
    ///
    /// A short-lived process must call this before its runtime shuts down,
    /// otherwise pending refreshes are cancelled and stale entries are never
    /// rewritten.
    pub async fn settle(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.revalidations.lock().await);
            if pending.is_empty() {
                return;
            }
            debug!(tasks = pending.len(), "Waiting for cache revalidations");
            while let Some(result) = pending.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "Cache revalidation task aborted");
                }
            }
        }
    }

    /// Overlapping refreshes of one key are not deduplicated; the last
    /// successful write wins.
    async fn spawn_revalidation<F, Fut>(&self, key: String, fetcher: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, DataError>> + Send + 'static,
    {
        let store = self.store.clone();
        let mut pending = self.revalidations.lock().await;
        while pending.try_join_next().is_some() {}
        pending.spawn(async move {
            // Handle without the task set, which owns this task.
            let cache = JsonCache::new(store);
            match fetcher().await {
                Ok(data) => {
                    cache.set(&key, &data, now_millis()).await;
                    debug!(key = %key, "Revalidated cache entry");
                }
                Err(e) => debug!(key = %key, error = %e, "Background revalidation failed"),
            }
        });
    }
}

fn namespaced(key: &str) -> String {
    format!("{NAMESPACE}{key}")
}
