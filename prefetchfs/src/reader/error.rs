//! Per-item hydration failure kinds.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure hydrating one queued path from the backing store.
///
/// These are logged and skipped by the worker; none of them is fatal
/// and the affected path simply stays absent until requested again.
#[derive(Debug, Error)]
pub enum HydrateError {
    #[error("{} does not exist", path.display())]
    Missing { path: PathBuf },

    #[error("{} is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    #[error("short read on {}: expected {expected} bytes, got {actual}", path.display())]
    ShortRead {
        path: PathBuf,
        expected: u64,
        actual: usize,
    },

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
