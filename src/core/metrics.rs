//! Counters for engine and pool observability
//!
//! All counters are relaxed atomics: they are monotonic statistics, not
//! synchronization points.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a logging engine
///
/// Shared by every [`Logger`](crate::Logger) derived from the same engine.
///
/// # Example
///
/// ```
/// use rust_event_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_dropped();
/// metrics.record_logged();
///
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.total_logged(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records that at least one appender failed to write
    dropped_count: AtomicU64,

    /// Records written to every appender
    total_logged: AtomicU64,

    /// Scheduled rotations that failed
    rotation_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            dropped_count: AtomicU64::new(0),
            total_logged: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotation_failures(&self) -> u64 {
        self.rotation_failures.load(Ordering::Relaxed)
    }

    /// Record a dropped log, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a successfully logged entry, returning the previous count
    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation_failure(&self) -> u64 {
        self.rotation_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no logs have been processed.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dropped_count: AtomicU64::new(self.dropped_count()),
            total_logged: AtomicU64::new(self.total_logged()),
            rotation_failures: AtomicU64::new(self.rotation_failures()),
        }
    }
}

/// Metrics for an [`EventPool`](crate::EventPool)
#[derive(Debug)]
pub struct PoolMetrics {
    /// Events handed out by `acquire`
    acquired: AtomicU64,

    /// Acquisitions served from the free-list
    reused: AtomicU64,

    /// Acquisitions that had to allocate a fresh buffer
    allocated: AtomicU64,

    /// Released buffers not kept, because the free-list was full or they had
    /// grown past the retention limit
    discarded: AtomicU64,
}

impl PoolMetrics {
    pub const fn new() -> Self {
        Self {
            acquired: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reused(&self) -> u64 {
        self.reused.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_acquired(&self, reused: bool) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        if reused {
            self.reused.fetch_add(1, Ordering::Relaxed);
        } else {
            self.allocated.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Share of acquisitions served without allocating, as a percentage
    pub fn hit_rate(&self) -> f64 {
        let acquired = self.acquired() as f64;
        if acquired == 0.0 {
            0.0
        } else {
            (self.reused() as f64 / acquired) * 100.0
        }
    }
}

impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.dropped_count(), 0);
        assert_eq!(metrics.total_logged(), 0);
        assert_eq!(metrics.rotation_failures(), 0);
    }

    #[test]
    fn test_metrics_record_dropped() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_dropped(), 0); // Returns previous value
        assert_eq!(metrics.dropped_count(), 1);
        metrics.record_dropped();
        assert_eq!(metrics.dropped_count(), 2);
    }

    #[test]
    fn test_metrics_drop_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.drop_rate(), 0.0);

        for _ in 0..100 {
            metrics.record_logged();
        }
        for _ in 0..10 {
            metrics.record_dropped();
        }
        let rate = metrics.drop_rate();
        assert!(rate > 9.0 && rate < 10.0, "Drop rate was {}", rate);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_rotation_failure();

        let snapshot = metrics.clone();
        metrics.record_rotation_failure();

        assert_eq!(metrics.rotation_failures(), 2);
        assert_eq!(snapshot.rotation_failures(), 1);
    }

    #[test]
    fn test_pool_metrics_hit_rate() {
        let metrics = PoolMetrics::new();
        assert_eq!(metrics.hit_rate(), 0.0);

        metrics.record_acquired(false);
        metrics.record_acquired(true);
        metrics.record_acquired(true);
        metrics.record_acquired(true);

        assert_eq!(metrics.acquired(), 4);
        assert_eq!(metrics.allocated(), 1);
        assert_eq!(metrics.reused(), 3);
        assert_eq!(metrics.hit_rate(), 75.0);
    }
}
