use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of [`LookupStats`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookupCounts {
    pub dispatched: u64,
    pub completed: u64,
    pub superseded: u64,
    pub failed: u64,
    pub empty: u64,
}

/// Lookup counters, written by the coordinator and read by anyone
#[derive(Debug, Default)]
pub struct LookupStats {
    dispatched: AtomicU64,
    completed: AtomicU64,
    superseded: AtomicU64,
    failed: AtomicU64,
    empty: AtomicU64,
}

impl LookupStats {
    pub fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded(&self) {
        self.superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty(&self) {
        self.empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn counts(&self) -> LookupCounts {
        LookupCounts {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Display for LookupCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} dispatched, {} completed, {} superseded, {} failed, {} empty",
            self.dispatched, self.completed, self.superseded, self.failed, self.empty
        )
    }
}
