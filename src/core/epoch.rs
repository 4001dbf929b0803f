//! Request epoch - cancels stale frame work during fast navigation
//!
//! Every frame request bumps the epoch. Workers skip queued jobs whose epoch
//! is no longer current, and the controller drops completed results that
//! carry an old epoch.

use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared, monotonically increasing request counter.
#[derive(Debug, Clone, Default)]
pub struct Epoch {
    current: Arc<AtomicU64>,
}

impl Epoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment epoch and return new value
    ///
    /// Call this whenever a new frame is requested.
    pub fn increment(&self) -> u64 {
        let next = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        trace!("Epoch incremented: {}", next);
        next
    }

    /// Get current epoch
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    /// Get shared epoch counter (for Workers)
    pub fn shared(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.current)
    }
}
