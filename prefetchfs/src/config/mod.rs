//! Typed configuration for the cache manager.

mod size;

use std::path::PathBuf;

use crate::predictor::PredictorConfig;

pub use size::{format_mb, format_size, parse_size, SizeParseError};

/// Default memory budget for cached file contents: 4 GiB.
pub const DEFAULT_MEMORY_LIMIT: usize = 4 * 1024 * 1024 * 1024;

/// Default chunk size: 1 MiB. Reserved for range-granular caching.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Configuration for a [`CacheManager`](crate::manager::CacheManager).
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Memory budget in bytes for cached file contents.
    pub memory_limit: usize,
    /// Advisory chunk size in bytes. Accepted and stored; reserved for
    /// future range caching, no behavioral effect today.
    pub chunk_size: usize,
    /// Backing directory that virtual paths resolve against.
    pub root: PathBuf,
    /// Predictor tuning.
    pub predictor: PredictorConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            memory_limit: DEFAULT_MEMORY_LIMIT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            root: PathBuf::from("."),
            predictor: PredictorConfig::default(),
        }
    }
}

impl ManagerConfig {
    /// Set the memory budget in bytes.
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = bytes;
        self
    }

    /// Set the advisory chunk size in bytes.
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Set the backing directory root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the predictor tuning.
    pub fn with_predictor(mut self, predictor: PredictorConfig) -> Self {
        self.predictor = predictor;
        self
    }
}
