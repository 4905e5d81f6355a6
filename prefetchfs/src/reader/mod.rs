//! Asynchronous hydration of cache entries from the backing directory.
//!
//! A single worker thread drains a FIFO queue of normalized paths,
//! reads each file's full contents from `root/path`, and inserts the
//! buffer into the memory cache. One worker serializes admissions
//! against the memory cap and keeps the backing device sequential.

mod error;
mod queue;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::{fs, io};

use tracing::{debug, trace, warn};

use crate::cache::MemoryCache;

pub use error::HydrateError;
pub use queue::WorkQueue;

/// Background reader that hydrates the memory cache.
///
/// Paths are expected in normalized form (see [`crate::cache::normalize`]).
/// Dropping the reader signals shutdown and joins the worker; queued
/// items are drained first.
pub struct FileReader {
    queue: Arc<WorkQueue>,
    root: Arc<Mutex<PathBuf>>,
    worker: Option<JoinHandle<()>>,
}

impl FileReader {
    /// Spawn the hydration worker against `root` and the given cache.
    pub fn spawn(root: impl Into<PathBuf>, cache: Arc<MemoryCache>) -> Self {
        let queue = Arc::new(WorkQueue::new());
        let root = Arc::new(Mutex::new(root.into()));

        let worker_queue = Arc::clone(&queue);
        let worker_root = Arc::clone(&root);
        let worker = thread::Builder::new()
            .name("cache-hydrator".to_string())
            .spawn(move || run_loop(worker_queue, worker_root, cache))
            .expect("failed to spawn hydration worker thread");

        Self {
            queue,
            root,
            worker: Some(worker),
        }
    }

    /// Queue a normalized path for hydration.
    pub fn enqueue(&self, path: impl Into<String>) {
        self.queue.push(path.into());
    }

    /// Replace the backing-directory root for subsequent hydrations.
    pub fn set_root(&self, root: impl Into<PathBuf>) {
        *self.root.lock().unwrap() = root.into();
    }

    /// Snapshot of queued paths in FIFO order.
    pub fn pending(&self) -> Vec<String> {
        self.queue.snapshot()
    }

    /// Whether `path` is currently queued.
    pub fn is_queued(&self, path: &str) -> bool {
        self.queue.contains(path)
    }

    /// Drain the queue and stop the worker.
    ///
    /// Blocks until the worker has finished its remaining items and
    /// exited. Enqueues arriving after this point are dropped.
    pub fn shutdown(&mut self) {
        self.queue.shutdown();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("hydration worker panicked during shutdown");
            }
        }
    }
}

impl Drop for FileReader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(queue: Arc<WorkQueue>, root: Arc<Mutex<PathBuf>>, cache: Arc<MemoryCache>) {
    debug!("hydration worker started");

    while let Some(path) = queue.pop() {
        // Single-flight: a previous hydration for this path may have
        // landed while it sat in the queue.
        if cache.contains(&path) {
            trace!(path = %path, "already resident, skipping");
            continue;
        }

        let base = root.lock().unwrap().clone();
        match hydrate(&base, &path) {
            Ok(data) => {
                trace!(path = %path, bytes = data.len(), "hydrated");
                cache.insert(path, data);
            }
            Err(err @ HydrateError::Missing { .. }) => {
                warn!(path = %path, "{err}");
            }
            Err(err @ HydrateError::NotAFile { .. }) => {
                warn!(path = %path, "{err}");
            }
            Err(err @ HydrateError::ShortRead { .. }) => {
                warn!(path = %path, "{err}, discarding partial buffer");
            }
            Err(err @ HydrateError::Io { .. }) => {
                warn!(path = %path, "{err}");
            }
        }
    }

    debug!("hydration worker stopped");
}

/// Read the full contents of `root/path` into a fresh buffer.
fn hydrate(root: &Path, path: &str) -> Result<Vec<u8>, HydrateError> {
    let full = root.join(path);

    let metadata = match fs::metadata(&full) {
        Ok(metadata) => metadata,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            return Err(HydrateError::Missing { path: full });
        }
        Err(source) => return Err(HydrateError::Io { path: full, source }),
    };
    if !metadata.is_file() {
        return Err(HydrateError::NotAFile { path: full });
    }

    let expected = metadata.len();
    let file = File::open(&full).map_err(|source| HydrateError::Io {
        path: full.clone(),
        source,
    })?;

    let mut data = Vec::with_capacity(expected as usize);
    file.take(expected)
        .read_to_end(&mut data)
        .map_err(|source| HydrateError::Io {
            path: full.clone(),
            source,
        })?;

    if data.len() as u64 != expected {
        return Err(HydrateError::ShortRead {
            path: full,
            expected,
            actual: data.len(),
        });
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    /// Poll until `condition` holds, panicking after two seconds.
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

    fn backing_dir_with(files: &[(&str, &[u8])]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let full = dir.path().join(name);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }
        dir
    }

    #[test]
    fn hydrates_file_into_cache() {
        let dir = backing_dir_with(&[("a.bin", b"hello world")]);
        let cache = Arc::new(MemoryCache::new(1_000_000));
        let reader = FileReader::spawn(dir.path(), Arc::clone(&cache));

        reader.enqueue("a.bin");
        wait_until("a.bin resident", || cache.contains("a.bin"));

        assert_eq!(*cache.get("a.bin").unwrap(), b"hello world".to_vec());
    }

    #[test]
    fn hydrates_nested_paths() {
        let dir = backing_dir_with(&[("sub/dir/file.dat", b"nested")]);
        let cache = Arc::new(MemoryCache::new(1_000_000));
        let reader = FileReader::spawn(dir.path(), Arc::clone(&cache));

        reader.enqueue("sub/dir/file.dat");
        wait_until("nested file resident", || cache.contains("sub/dir/file.dat"));
    }

    #[test]
    fn missing_file_leaves_cache_unchanged() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(MemoryCache::new(1_000_000));
        let mut reader = FileReader::spawn(dir.path(), Arc::clone(&cache));

        reader.enqueue("ghost.bin");
        reader.shutdown();

        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn directory_is_not_hydrated() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        let cache = Arc::new(MemoryCache::new(1_000_000));
        let mut reader = FileReader::spawn(dir.path(), Arc::clone(&cache));

        reader.enqueue("subdir");
        reader.shutdown();

        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn repeated_enqueues_yield_single_entry() {
        let dir = backing_dir_with(&[("x.bin", b"once")]);
        let cache = Arc::new(MemoryCache::new(1_000_000));
        let mut reader = FileReader::spawn(dir.path(), Arc::clone(&cache));

        for _ in 0..10 {
            reader.enqueue("x.bin");
        }
        reader.shutdown();

        assert_eq!(cache.entry_count(), 1);
        assert_eq!(*cache.get("x.bin").unwrap(), b"once".to_vec());
    }

    #[test]
    fn failure_does_not_kill_worker() {
        let dir = backing_dir_with(&[("real.bin", b"data")]);
        let cache = Arc::new(MemoryCache::new(1_000_000));
        let reader = FileReader::spawn(dir.path(), Arc::clone(&cache));

        reader.enqueue("missing.bin");
        reader.enqueue("real.bin");
        wait_until("real.bin resident", || cache.contains("real.bin"));
    }

    #[test]
    fn set_root_affects_subsequent_hydrations() {
        let first = backing_dir_with(&[("f.bin", b"first")]);
        let second = backing_dir_with(&[("s.bin", b"second")]);
        let cache = Arc::new(MemoryCache::new(1_000_000));
        let reader = FileReader::spawn(first.path(), Arc::clone(&cache));

        reader.enqueue("f.bin");
        wait_until("f.bin resident", || cache.contains("f.bin"));

        reader.set_root(second.path());
        reader.enqueue("s.bin");
        wait_until("s.bin resident", || cache.contains("s.bin"));

        assert_eq!(*cache.get("s.bin").unwrap(), b"second".to_vec());
    }

    #[test]
    fn shutdown_drains_queue_then_stops_inserting() {
        let dir = backing_dir_with(&[("a.bin", b"a"), ("b.bin", b"b")]);
        let cache = Arc::new(MemoryCache::new(1_000_000));
        let mut reader = FileReader::spawn(dir.path(), Arc::clone(&cache));

        reader.enqueue("a.bin");
        reader.enqueue("b.bin");
        reader.shutdown();

        // Queued work was drained before the worker exited
        assert!(cache.contains("a.bin"));
        assert!(cache.contains("b.bin"));

        // Enqueues after shutdown are dropped; no insert is observed
        let count = cache.entry_count();
        reader.enqueue("a.bin");
        thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.entry_count(), count);
    }

    #[test]
    fn pending_is_empty_after_shutdown() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(MemoryCache::new(1_000_000));
        let mut reader = FileReader::spawn(dir.path(), cache);

        reader.enqueue("one");
        reader.enqueue("two");
        reader.shutdown();

        assert!(reader.pending().is_empty());
    }
}
