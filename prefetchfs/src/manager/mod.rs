//! Cache manager facade.
//!
//! Wires the three core pieces together: client accesses flow into the
//! predictor, predicted candidates flow into the hydration queue, and
//! reads are served from the memory cache. This is the only surface a
//! filesystem adapter talks to.

mod service;
mod status;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{info, trace};

use crate::cache::{normalize, MemoryCache};
use crate::config::ManagerConfig;
use crate::predictor::MarkovPredictor;
use crate::reader::FileReader;

pub use service::{CacheService, HitToken};
pub use status::StatusReport;

/// Number of recent accesses included in a status report.
const STATUS_RECENT_ACCESSES: usize = 5;

/// Read-side prefetch cache for a backing directory.
///
/// Every client access is observed by the predictor; its candidates
/// are queued for hydration behind the explicit request, so the next
/// read has a chance of landing in memory. `shutdown` drains the
/// hydration queue and joins the worker; dropping the manager does the
/// same.
pub struct CacheManager {
    cache: Arc<MemoryCache>,
    reader: FileReader,
    predictor: Mutex<MarkovPredictor>,
    /// Reserved for range-granular caching.
    chunk_size: usize,
}

impl CacheManager {
    /// Start a manager (and its hydration worker) from `config`.
    pub fn new(config: ManagerConfig) -> Self {
        let cache = Arc::new(MemoryCache::new(config.memory_limit));
        let reader = FileReader::spawn(config.root.clone(), Arc::clone(&cache));

        info!(
            memory_limit = config.memory_limit,
            chunk_size = config.chunk_size,
            root = %config.root.display(),
            adaptive = config.predictor.adaptive,
            "cache manager started"
        );

        Self {
            cache,
            reader,
            predictor: Mutex::new(MarkovPredictor::new(config.predictor)),
            chunk_size: config.chunk_size,
        }
    }

    /// Replace the backing directory for subsequent hydrations.
    pub fn set_root(&self, root: impl Into<PathBuf>) {
        self.reader.set_root(root);
    }

    /// Record a client access and queue hydration work.
    ///
    /// The explicit path is enqueued first so it is served ahead of
    /// the prefetch candidates the access may have produced.
    pub fn request(&self, path: &str) {
        let path = normalize(path);

        let candidates = {
            let mut predictor = self.predictor.lock().unwrap();
            predictor.observe(&path);
            predictor.predict()
        };

        self.reader.enqueue(path.clone());

        for candidate in candidates {
            if candidate == path
                || self.cache.contains(&candidate)
                || self.reader.is_queued(&candidate)
            {
                continue;
            }
            trace!(path = %candidate, "queueing prefetch candidate");
            self.reader.enqueue(candidate);
        }
    }

    /// Residency probe. Does not touch recency.
    pub fn lookup(&self, path: &str) -> Option<HitToken> {
        let path = normalize(path);
        self.cache.contains(&path).then(|| HitToken::new(path))
    }

    /// Read `length` bytes starting at `offset` from a resident entry.
    ///
    /// Returns `None` on a miss and an empty buffer when `offset` is at
    /// or past the end of the file. A hit promotes the entry.
    pub fn read_range(&self, path: &str, length: usize, offset: usize) -> Option<Vec<u8>> {
        let path = normalize(path);
        let buffer = self.cache.get(&path)?;

        if offset >= buffer.len() {
            return Some(Vec::new());
        }
        let end = offset.saturating_add(length).min(buffer.len());
        Some(buffer[offset..end].to_vec())
    }

    /// Snapshot the manager state and log a one-line summary.
    pub fn status(&self) -> StatusReport {
        let (recent_accesses, predictor_states) = {
            let predictor = self.predictor.lock().unwrap();
            (predictor.recent(STATUS_RECENT_ACCESSES), predictor.state_count())
        };

        let report = StatusReport {
            bytes_used: self.cache.bytes_used(),
            capacity_bytes: self.cache.max_size_bytes(),
            cached_paths: self.cache.cached_paths(),
            pending: self.reader.pending(),
            recent_accesses,
            stats: self.cache.stats(),
        };

        info!(
            bytes_used = report.bytes_used,
            cached = report.cached_paths.len(),
            pending = report.pending.len(),
            predictor_states,
            hit_rate = format!("{:.3}", report.stats.hit_rate()),
            "cache status"
        );

        report
    }

    /// The advisory chunk size this manager was configured with.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Drain the hydration queue and stop the worker.
    pub fn shutdown(&mut self) {
        self.reader.shutdown();
    }
}

impl CacheService for CacheManager {
    fn request(&self, path: &str) {
        CacheManager::request(self, path);
    }

    fn lookup(&self, path: &str) -> Option<HitToken> {
        CacheManager::lookup(self, path)
    }

    fn read_range(&self, path: &str, length: usize, offset: usize) -> Option<Vec<u8>> {
        CacheManager::read_range(self, path, length, offset)
    }

    fn set_root(&self, root: &Path) {
        CacheManager::set_root(self, root);
    }

    fn status(&self) -> StatusReport {
        CacheManager::status(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManagerConfig;
    use std::fs;
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn wait_until(what: &str, condition: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("timed out waiting for {what}");
    }

    fn manager_over(files: &[(&str, &[u8])], memory_limit: usize) -> (CacheManager, TempDir) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let manager = CacheManager::new(
            ManagerConfig::default()
                .with_memory_limit(memory_limit)
                .with_root(dir.path()),
        );
        (manager, dir)
    }

    #[test]
    fn request_hydrates_and_read_range_serves_bytes() {
        let (manager, _dir) = manager_over(&[("a.bin", b"0123456789")], 1_000_000);

        manager.request("/a.bin");
        wait_until("a.bin resident", || manager.lookup("a.bin").is_some());

        assert_eq!(
            manager.read_range("a.bin", 4, 2),
            Some(b"2345".to_vec())
        );
    }

    #[test]
    fn read_range_clamps_to_buffer_end() {
        let (manager, _dir) = manager_over(&[("a.bin", b"0123456789")], 1_000_000);

        manager.request("a.bin");
        wait_until("a.bin resident", || manager.lookup("a.bin").is_some());

        assert_eq!(manager.read_range("a.bin", 100, 6), Some(b"6789".to_vec()));
    }

    #[test]
    fn read_range_past_end_is_empty() {
        let (manager, _dir) = manager_over(&[("a.bin", b"0123456789")], 1_000_000);

        manager.request("a.bin");
        wait_until("a.bin resident", || manager.lookup("a.bin").is_some());

        assert_eq!(manager.read_range("a.bin", 4, 10), Some(Vec::new()));
        assert_eq!(manager.read_range("a.bin", 4, 500), Some(Vec::new()));
    }

    #[test]
    fn read_range_miss_is_none() {
        let (manager, _dir) = manager_over(&[], 1_000_000);
        assert_eq!(manager.read_range("absent.bin", 10, 0), None);
    }

    #[test]
    fn lookup_normalizes_and_reports_residency() {
        let (manager, _dir) = manager_over(&[("a.bin", b"data")], 1_000_000);

        assert!(manager.lookup("a.bin").is_none());
        manager.request("a.bin");
        wait_until("a.bin resident", || manager.lookup("a.bin").is_some());

        let token = manager.lookup("\\a.bin").expect("normalized hit");
        assert_eq!(token.path(), "a.bin");
    }

    #[test]
    fn request_prefetches_predicted_successor() {
        let (manager, dir) = manager_over(&[("a.bin", b"aa")], 1_000_000);

        // Teach the model a -> b while b.bin is still missing from the
        // backing store, so it never becomes resident during training.
        manager.request("a.bin");
        wait_until("a.bin resident", || manager.lookup("a.bin").is_some());
        manager.request("b.bin");
        wait_until("queue drained", || manager.status().pending.is_empty());
        // Let the worker finish the popped item before moving on
        thread::sleep(Duration::from_millis(50));
        assert!(manager.lookup("b.bin").is_none());

        // Now that b.bin exists, a fresh access to a.bin alone must
        // pull it in via the predicted candidate.
        fs::write(dir.path().join("b.bin"), b"bb").unwrap();
        manager.request("a.bin");
        wait_until("b.bin prefetched", || manager.lookup("b.bin").is_some());

        assert_eq!(manager.read_range("b.bin", 2, 0), Some(b"bb".to_vec()));
    }

    #[test]
    fn chunk_size_is_stored_but_inert() {
        let dir = TempDir::new().unwrap();
        let manager = CacheManager::new(
            ManagerConfig::default()
                .with_chunk_size(64 * 1024)
                .with_root(dir.path()),
        );

        assert_eq!(manager.chunk_size(), 64 * 1024);
    }

    #[test]
    fn status_reports_cache_and_queue() {
        let (manager, _dir) = manager_over(&[("a.bin", b"abc")], 1_000_000);

        manager.request("a.bin");
        wait_until("a.bin resident", || manager.lookup("a.bin").is_some());

        let report = manager.status();
        assert_eq!(report.cached_paths, vec!["a.bin"]);
        assert_eq!(report.bytes_used, 3);
        assert_eq!(report.recent_accesses, vec!["a.bin"]);
        assert!(report.to_string().contains("a.bin"));
    }

    #[test]
    fn manager_works_through_the_service_trait() {
        let (manager, _dir) = manager_over(&[("a.bin", b"abc")], 1_000_000);
        let service: &dyn CacheService = &manager;

        service.request("a.bin");
        wait_until("a.bin resident", || service.lookup("a.bin").is_some());

        assert_eq!(service.read_range("a.bin", 3, 0), Some(b"abc".to_vec()));
    }
}
