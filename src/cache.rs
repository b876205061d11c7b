//! Best-effort, in-process TTL cache for catalog snapshots.
//!
//! Paginated feed requests read the catalog through this cache so a
//! crawler walking all pages does not refetch the upstream once per
//! page. Bulk streaming requests bypass it entirely — a full feed must
//! reflect the live catalog.
//!
//! The cache is explicitly constructed at startup and shared through
//! server state; there is no module-level singleton. Read-then-write
//! races between concurrent requests are possible and harmless: both
//! writers store an equally valid snapshot.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::catalog::Product;

struct Entry {
    products: Arc<Vec<Product>>,
    stored_at: Instant,
}

/// Aggregate hit/miss counters, for logs and the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// TTL cache over an LRU map, keyed by snapshot name.
///
/// Today the only key in use is [`CatalogCache::FULL_CATALOG`]; the
/// key space exists so partial snapshots (per-collection feeds) can
/// share the same store.
pub struct CatalogCache {
    entries: Mutex<LruCache<String, Entry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CatalogCache {
    /// Key under which the whole-catalog snapshot is stored.
    pub const FULL_CATALOG: &'static str = "catalog";

    const CAPACITY: usize = 8;

    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(Self::CAPACITY).expect("capacity is non-zero"),
            )),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the snapshot if present and fresh. Expired entries are
    /// evicted on access.
    pub fn get(&self, key: &str) -> Option<Arc<Vec<Product>>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let fresh = match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                Some(Arc::clone(&entry.products))
            }
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        };

        match &fresh {
            Some(products) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = key, products = products.len(), "Catalog cache hit");
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = key, "Catalog cache miss");
            }
        }

        fresh
    }

    /// Stores a snapshot, replacing any previous entry under the key.
    pub fn put(&self, key: impl Into<String>, products: Arc<Vec<Product>>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.put(
            key.into(),
            Entry { products, stored_at: Instant::now() },
        );
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
        }
    }
}
