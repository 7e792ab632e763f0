//! Run statistics shared by concurrent fetch workers.
//!
//! One [`FetchStats`] is created per engine instance and handed to every
//! worker task behind an `Arc`. Counters use atomics so workers never contend
//! on a lock, and a run can be summarized afterwards with
//! [`FetchStats::snapshot`].

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// Counters accumulated over one fetch run.
///
/// Each date produces exactly one terminal outcome, so after a range fetch of
/// N distinct dates `cache_hits + network_calls + failures == N`.
#[derive(Debug, Default)]
pub struct FetchStats {
    cache_hits: AtomicUsize,
    network_calls: AtomicUsize,
    failures: AtomicUsize,
    total_items: AtomicUsize,
}

/// Point-in-time view of [`FetchStats`], suitable for logging or JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Dates served from the on-disk cache.
    pub cache_hits: usize,
    /// Dates fetched from the network.
    pub network_calls: usize,
    /// Dates that exhausted all retry attempts.
    pub failures: usize,
    /// Fixture elements written by the aggregation step.
    pub total_items: usize,
    /// `cache_hits / (cache_hits + network_calls)`, 0 when nothing was served.
    pub cache_hit_rate: f64,
}

impl FetchStats {
    /// Creates a stats tracker with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cache hits recorded so far.
    #[must_use]
    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::SeqCst)
    }

    /// Returns the number of successful network fetches recorded so far.
    #[must_use]
    pub fn network_calls(&self) -> usize {
        self.network_calls.load(Ordering::SeqCst)
    }

    /// Returns the number of dates that failed every attempt.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    /// Returns the number of aggregated fixture elements.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.total_items.load(Ordering::SeqCst)
    }

    /// Records a date served from cache.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a date fetched over the network.
    pub fn record_network_call(&self) {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a date that exhausted its retry budget.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Sets the aggregated item count for the run.
    ///
    /// Called once by the aggregation step; a re-aggregation overwrites the
    /// previous count rather than accumulating.
    pub fn set_total_items(&self, count: usize) {
        self.total_items.store(count, Ordering::SeqCst);
    }

    /// Produces a consistent snapshot of all counters.
    ///
    /// The hit rate is defined as 0 when no date was served at all, guarding
    /// the division for empty or fully failed runs.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> StatsSnapshot {
        let cache_hits = self.cache_hits();
        let network_calls = self.network_calls();
        let served = cache_hits + network_calls;
        let cache_hit_rate = if served == 0 {
            0.0
        } else {
            cache_hits as f64 / served as f64
        };
        StatsSnapshot {
            cache_hits,
            network_calls,
            failures: self.failures(),
            total_items: self.total_items(),
            cache_hit_rate,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        let stats = FetchStats::new();
        let snap = stats.snapshot();
        assert_eq!(snap.cache_hits, 0);
        assert_eq!(snap.network_calls, 0);
        assert_eq!(snap.failures, 0);
        assert_eq!(snap.total_items, 0);
        assert!((snap.cache_hit_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_record_and_snapshot() {
        let stats = FetchStats::new();
        stats.record_cache_hit();
        stats.record_cache_hit();
        stats.record_cache_hit();
        stats.record_network_call();
        stats.record_failure();
        stats.set_total_items(42);

        let snap = stats.snapshot();
        assert_eq!(snap.cache_hits, 3);
        assert_eq!(snap.network_calls, 1);
        assert_eq!(snap.failures, 1);
        assert_eq!(snap.total_items, 42);
        assert!((snap.cache_hit_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_rate_zero_when_nothing_served() {
        let stats = FetchStats::new();
        stats.record_failure();
        stats.record_failure();
        assert!((stats.snapshot().cache_hit_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_total_items_overwrites() {
        let stats = FetchStats::new();
        stats.set_total_items(10);
        stats.set_total_items(7);
        assert_eq!(stats.total_items(), 7);
    }

    #[test]
    fn test_stats_thread_safe() {
        use std::thread;

        let stats = Arc::new(FetchStats::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    stats.record_cache_hit();
                    stats.record_network_call();
                    stats.record_failure();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.cache_hits(), 800);
        assert_eq!(stats.network_calls(), 800);
        assert_eq!(stats.failures(), 800);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let stats = FetchStats::new();
        stats.record_network_call();
        let json = serde_json::to_string(&stats.snapshot()).unwrap();
        assert!(json.contains("\"network_calls\":1"));
        assert!(json.contains("cache_hit_rate"));
    }
}
