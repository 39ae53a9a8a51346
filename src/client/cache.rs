//! Client content cache
//!
//! Holds compiled documents by id for the life of the process. Concurrent
//! requests for the same id share one in-flight fetch; a failed fetch leaves
//! no entry behind, so the next access retries.
//!
//! # Thread Safety
//!
//! Slots live behind a `parking_lot::Mutex` that is never held across an
//! await. Each fetch runs as its own spawned task, so a caller that stops
//! waiting does not cancel it and the result still lands in the cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use super::source::{ContentSource, FetchError};
use crate::document::CompiledDocument;
use crate::library::DocumentDescriptor;

type FetchResult = Result<Arc<CompiledDocument>, FetchError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

enum Slot {
    Ready(Arc<CompiledDocument>),
    Pending {
        /// Distinguishes this fetch from one started after an invalidation
        generation: u64,
        fetch: SharedFetch,
    },
}

struct CacheInner {
    source: Arc<dyn ContentSource>,
    slots: Mutex<HashMap<String, Slot>>,
    /// Known listing order, for adjacent prefetch
    order: Mutex<Vec<String>>,
    next_generation: AtomicU64,
    fetches: AtomicU64,
}

impl CacheInner {
    /// Record the outcome of a fetch if its slot is still the one it started
    fn settle(&self, id: &str, generation: u64, result: &FetchResult) {
        let mut slots = self.slots.lock();
        let current = matches!(
            slots.get(id),
            Some(Slot::Pending { generation: g, .. }) if *g == generation
        );
        if !current {
            tracing::debug!("Discarding superseded fetch for {}", id);
            return;
        }

        match result {
            Ok(document) => {
                slots.insert(id.to_string(), Slot::Ready(Arc::clone(document)));
            }
            Err(e) => {
                slots.remove(id);
                tracing::debug!("Fetch for {} failed, not cached: {}", id, e);
            }
        }
    }
}

/// Deduplicating cache of compiled documents
#[derive(Clone)]
pub struct ContentCache {
    inner: Arc<CacheInner>,
}

impl ContentCache {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                slots: Mutex::new(HashMap::new()),
                order: Mutex::new(Vec::new()),
                next_generation: AtomicU64::new(0),
                fetches: AtomicU64::new(0),
            }),
        }
    }

    /// Get a compiled document, fetching it at most once.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn get(&self, id: &str) -> FetchResult {
        let fetch = {
            let mut slots = self.inner.slots.lock();
            match slots.get(id) {
                Some(Slot::Ready(document)) => return Ok(Arc::clone(document)),
                Some(Slot::Pending { fetch, .. }) => fetch.clone(),
                None => self.start_fetch(id, &mut slots),
            }
        };
        fetch.await
    }

    /// Already-fetched document, without waiting
    pub fn peek(&self, id: &str) -> Option<Arc<CompiledDocument>> {
        match self.inner.slots.lock().get(id) {
            Some(Slot::Ready(document)) => Some(Arc::clone(document)),
            _ => None,
        }
    }

    /// Start fetching `id` in the background.
    ///
    /// Returns false without doing anything when the id is cached or already
    /// in flight.
    pub fn prefetch(&self, id: &str) -> bool {
        let mut slots = self.inner.slots.lock();
        if slots.contains_key(id) {
            return false;
        }
        tracing::debug!("Prefetching {}", id);
        // The spawned task drives the fetch; no waiter needed
        let _ = self.start_fetch(id, &mut slots);
        true
    }

    /// Prefetch the neighbors of `id` in the known listing order.
    ///
    /// Returns the ids a fetch was started for.
    pub fn prefetch_adjacent(&self, id: &str) -> Vec<String> {
        let neighbors: Vec<String> = {
            let order = self.inner.order.lock();
            let Some(index) = order.iter().position(|known| known == id) else {
                return Vec::new();
            };
            [index.checked_sub(1), Some(index + 1)]
                .into_iter()
                .flatten()
                .filter_map(|i| order.get(i).cloned())
                .collect()
        };

        neighbors.into_iter().filter(|n| self.prefetch(n)).collect()
    }

    /// Fetch the listing and remember its order
    pub async fn refresh_listing(&self) -> Result<Vec<DocumentDescriptor>, FetchError> {
        let listing = self.inner.source.list_documents().await?;
        self.set_order(listing.iter().map(|d| d.id.clone()).collect());
        Ok(listing)
    }

    /// Replace the known listing order
    pub fn set_order(&self, ids: Vec<String>) {
        *self.inner.order.lock() = ids;
    }

    /// Drop one entry. A fetch still in flight for it is not cached.
    pub fn invalidate(&self, id: &str) -> bool {
        self.inner.slots.lock().remove(id).is_some()
    }

    pub fn clear(&self) {
        self.inner.slots.lock().clear();
    }

    /// Whether `id` is cached or in flight
    pub fn contains(&self, id: &str) -> bool {
        self.inner.slots.lock().contains_key(id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        matches!(self.inner.slots.lock().get(id), Some(Slot::Pending { .. }))
    }

    pub fn stats(&self) -> CacheStats {
        let slots = self.inner.slots.lock();
        let pending = slots
            .values()
            .filter(|s| matches!(s, Slot::Pending { .. }))
            .count();

        CacheStats {
            ready: slots.len() - pending,
            pending,
            fetches: self.inner.fetches.load(Ordering::Relaxed),
        }
    }

    /// Insert a pending slot for `id` and spawn its fetch
    fn start_fetch(&self, id: &str, slots: &mut HashMap<String, Slot>) -> SharedFetch {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        self.inner.fetches.fetch_add(1, Ordering::Relaxed);

        let source = Arc::clone(&self.inner.source);
        let weak: Weak<CacheInner> = Arc::downgrade(&self.inner);
        let key = id.to_string();

        let fetch = async move {
            let result = source.fetch_document(&key).await.map(Arc::new);
            if let Some(inner) = weak.upgrade() {
                inner.settle(&key, generation, &result);
            }
            result
        }
        .boxed()
        .shared();

        slots.insert(
            id.to_string(),
            Slot::Pending {
                generation,
                fetch: fetch.clone(),
            },
        );
        tokio::spawn(fetch.clone());

        fetch
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries holding a compiled document
    pub ready: usize,
    /// Entries with a fetch in flight
    pub pending: usize,
    /// Fetches started since creation
    pub fetches: u64,
}
