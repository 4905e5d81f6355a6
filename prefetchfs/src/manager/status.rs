//! Operator-facing status report.

use std::fmt;

use crate::cache::CacheStats;
use crate::config::format_mb;

/// Snapshot of the cache manager's state for diagnostics.
///
/// The `Display` text is meant for operators; its format is not a
/// stable contract.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub bytes_used: usize,
    pub capacity_bytes: usize,
    /// Cached paths, most recently used first.
    pub cached_paths: Vec<String>,
    /// Paths awaiting hydration, FIFO order.
    pub pending: Vec<String>,
    /// Most recent client accesses, oldest first.
    pub recent_accesses: Vec<String>,
    pub stats: CacheStats,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Cache: {} / {} | hit rate {:.1}%",
            format_mb(self.bytes_used),
            format_mb(self.capacity_bytes),
            self.stats.hit_rate() * 100.0
        )?;
        writeln!(f, "Files: {}", self.cached_paths.join(", "))?;
        writeln!(f, "Queue: {}", self.pending.join(", "))?;
        write!(f, "Recent: {}", self.recent_accesses.join(", "))
    }
}
