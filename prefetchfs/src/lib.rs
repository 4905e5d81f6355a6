//! prefetchfs - read-side file-content prefetch cache.
//!
//! Sits behind a user-space filesystem adapter and serves file reads
//! from memory by hydrating files from a backing directory before the
//! read arrives. An online first-order Markov model over access events
//! predicts which file is needed next; predicted candidates are queued
//! behind explicit requests under a bounded memory budget.
//!
//! # Usage
//!
//! ```no_run
//! use prefetchfs::config::ManagerConfig;
//! use prefetchfs::manager::CacheManager;
//!
//! let manager = CacheManager::new(
//!     ManagerConfig::default().with_root("/srv/backing"),
//! );
//!
//! manager.request("scenery/tile_01.dat");
//! // ...later, from the adapter's read path:
//! if let Some(_bytes) = manager.read_range("scenery/tile_01.dat", 4096, 0) {
//!     // served from memory
//! }
//! ```
//!
//! The filesystem adapter itself is out of scope; it binds to the
//! [`manager::CacheService`] trait and translates `lookup`/`read`
//! events into calls on the manager.

pub mod cache;
pub mod config;
pub mod logging;
pub mod manager;
pub mod predictor;
pub mod reader;

/// Version of the prefetchfs library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}
