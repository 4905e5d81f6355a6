//! In-memory cache of file contents with strict LRU eviction.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tracing::{debug, trace};

use crate::cache::CacheStats;

/// Map plus recency order, guarded as one unit.
///
/// Invariants: `used` is the sum of buffer lengths over `entries`; every
/// key in `entries` appears exactly once in `order` and vice versa;
/// `used <= cap` whenever the mutex is released.
struct CacheInner {
    entries: HashMap<String, Arc<Vec<u8>>>,
    /// Recency order, most recently used at the front.
    order: VecDeque<String>,
    used: usize,
}

impl CacheInner {
    /// Move `path` to the most-recent position.
    fn promote(&mut self, path: &str) {
        if let Some(pos) = self.order.iter().position(|p| p == path) {
            self.order.remove(pos);
        }
        self.order.push_front(path.to_string());
    }

    /// Evict from the least-recent end until `used <= cap`.
    ///
    /// Terminates because any single admitted entry is at most `cap`
    /// bytes, so once one entry remains the bound holds.
    fn evict_to_cap(&mut self, cap: usize) -> u64 {
        let mut evicted = 0;
        while self.used > cap {
            let Some(oldest) = self.order.pop_back() else {
                break;
            };
            if let Some(buffer) = self.entries.remove(&oldest) {
                self.used -= buffer.len();
                evicted += 1;
                trace!(path = %oldest, bytes = buffer.len(), "evicted");
            }
        }
        evicted
    }
}

/// Bounded in-memory cache of full file contents.
///
/// Keys are normalized virtual paths. Buffers are shared immutable
/// handles: `get` returns a clone of the `Arc`, so an evicted entry's
/// storage survives until the last outstanding handle is dropped.
///
/// Eviction is strict LRU. `get` promotes; `contains` does not.
pub struct MemoryCache {
    inner: Mutex<CacheInner>,
    max_size_bytes: usize,
    stats: Mutex<CacheStats>,
}

impl MemoryCache {
    /// Create a cache bounded to `max_size_bytes` of buffer data.
    pub fn new(max_size_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                used: 0,
            }),
            max_size_bytes,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// Check residency without touching recency.
    pub fn contains(&self, path: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.entries.contains_key(path)
    }

    /// Get a shared handle to a cached buffer, promoting it to
    /// most-recently-used. Returns `None` on a miss.
    pub fn get(&self, path: &str) -> Option<Arc<Vec<u8>>> {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        let buffer = inner.entries.get(path).cloned();
        match buffer {
            Some(buffer) => {
                inner.promote(path);
                self.stats.lock().unwrap().record_hit();
                Some(buffer)
            }
            None => {
                self.stats.lock().unwrap().record_miss();
                None
            }
        }
    }

    /// Insert a buffer under `path`, evicting least-recently-used
    /// entries as needed to stay within the cap.
    ///
    /// Replacing an existing entry swaps the buffer and promotes it.
    /// A buffer larger than the cap itself is refused outright and the
    /// store is left unchanged.
    pub fn insert(&self, path: impl Into<String>, data: Vec<u8>) {
        let path = path.into();
        let len = data.len();

        if len > self.max_size_bytes {
            debug!(
                path = %path,
                bytes = len,
                cap = self.max_size_bytes,
                "buffer exceeds cache capacity, refusing admission"
            );
            self.stats.lock().unwrap().record_refusal();
            return;
        }

        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;

        if let Some(slot) = inner.entries.get_mut(&path) {
            let old_len = slot.len();
            *slot = Arc::new(data);
            inner.used = inner.used - old_len + len;
        } else {
            inner.entries.insert(path.clone(), Arc::new(data));
            inner.used += len;
        }
        inner.promote(&path);

        // The new entry sits at the head, so eviction never removes it.
        let evicted = inner.evict_to_cap(self.max_size_bytes);

        let mut stats = self.stats.lock().unwrap();
        stats.record_insertion();
        stats.record_evictions(evicted);
        stats.update_size(inner.used, inner.entries.len());
    }

    /// Snapshot of cached paths, most recently used first.
    pub fn cached_paths(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.order.iter().cloned().collect()
    }

    /// Total bytes held by cached buffers.
    pub fn bytes_used(&self) -> usize {
        self.inner.lock().unwrap().used
    }

    /// Number of cached entries.
    pub fn entry_count(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// The configured memory cap in bytes.
    pub fn max_size_bytes(&self) -> usize {
        self.max_size_bytes
    }

    /// Snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().unwrap().clone()
    }
}
