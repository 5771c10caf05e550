//! Single-slot, time-boxed cache of the task collection.
//!
//! The cache is an explicitly owned state cell injected into the API
//! client, not a module-level singleton. It follows a strict
//! write-invalidate discipline: mutations never patch the snapshot in
//! place, they discard it, so the next read re-fetches and no
//! cache/reality divergence can survive a known mutation.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use termtask_proto::task::Task;

/// Default validity window for a cached snapshot.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// A cached snapshot of the task collection.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The tasks, in the order the server returned them (newest-first).
    tasks: Vec<Task>,
    /// When this snapshot was fetched.
    fetched_at: Instant,
}

/// Single-slot read cache for the task collection.
///
/// One slot is enough: only one session is active client-side at a
/// time, so the cache is not keyed per user. The slot is replaced
/// atomically under a short lock; the event-driven client makes it
/// effectively single-writer.
#[derive(Debug)]
pub struct TaskCache {
    slot: Mutex<Option<CacheEntry>>,
    ttl: Duration,
}

impl TaskCache {
    /// Creates an empty cache with the given validity window.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    /// Returns the cached snapshot if one exists and is still fresh.
    #[must_use]
    pub fn fresh(&self) -> Option<Vec<Task>> {
        let slot = self.slot.lock();
        let entry = slot.as_ref()?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.tasks.clone())
        } else {
            None
        }
    }

    /// Installs a new snapshot, replacing any previous entry wholesale.
    pub fn replace(&self, tasks: Vec<Task>) {
        *self.slot.lock() = Some(CacheEntry {
            tasks,
            fetched_at: Instant::now(),
        });
    }

    /// Clears the slot unconditionally. Idempotent; safe to call when
    /// already empty.
    pub fn invalidate(&self) {
        *self.slot.lock() = None;
    }
}

impl Default for TaskCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
