//! Indexer counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters, updated as events are handled.
#[derive(Debug, Default)]
pub struct IndexerStats {
    /// Trades committed.
    applied: AtomicU64,
    /// Listings committed.
    listings: AtomicU64,
    /// Events already processed.
    duplicates: AtomicU64,
    /// Malformed events.
    skipped: AtomicU64,
    /// Events outside the configured scope.
    ignored: AtomicU64,
    /// Events older than the cursor when they arrived.
    late: AtomicU64,
    /// Candle writes committed.
    candles: AtomicU64,
}

/// Point-in-time copy of [`IndexerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub applied: u64,
    pub listings: u64,
    pub duplicates: u64,
    pub skipped: u64,
    pub ignored: u64,
    pub late: u64,
    pub candles: u64,
}

impl StatsSnapshot {
    /// Events that changed state.
    pub fn committed(&self) -> u64 {
        self.applied + self.listings
    }

    /// Every event seen.
    pub fn total(&self) -> u64 {
        self.committed() + self.duplicates + self.skipped + self.ignored
    }
}

impl IndexerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_applied(&self, candles: usize) {
        self.applied.fetch_add(1, Ordering::Relaxed);
        self.candles.fetch_add(candles as u64, Ordering::Relaxed);
    }

    pub fn record_listing(&self) {
        self.listings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_late(&self) {
        self.late.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            applied: self.applied.load(Ordering::Relaxed),
            listings: self.listings.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            late: self.late.load(Ordering::Relaxed),
            candles: self.candles.load(Ordering::Relaxed),
        }
    }
}
