//! FIFO work queue feeding the hydration worker.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

struct QueueState {
    items: VecDeque<String>,
    shutdown: bool,
}

/// Unbounded FIFO queue of paths awaiting hydration.
///
/// Duplicates are permitted; the worker deduplicates against the store
/// at dequeue time. After `shutdown`, pushes are dropped silently and
/// `pop` drains the remaining items before returning `None`.
pub struct WorkQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                shutdown: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append a path and wake the worker. Dropped silently after shutdown.
    pub fn push(&self, path: String) {
        let mut state = self.state.lock().unwrap();
        if state.shutdown {
            return;
        }
        state.items.push_back(path);
        self.available.notify_one();
    }

    /// Block until an item is available, returning `None` once the queue
    /// has been shut down and drained.
    pub fn pop(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.shutdown {
                return None;
            }
            state = self.available.wait(state).unwrap();
        }
    }

    /// Snapshot of queued paths in FIFO order.
    pub fn snapshot(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.items.iter().cloned().collect()
    }

    /// Whether `path` is currently queued.
    pub fn contains(&self, path: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.items.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().items.is_empty()
    }

    /// Signal shutdown and wake all waiters.
    pub fn shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        state.shutdown = true;
        self.available.notify_all();
    }
}
