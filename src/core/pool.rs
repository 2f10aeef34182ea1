//! Reusable event buffers
//!
//! Every log call needs a small vector of fields. The pool keeps released
//! vectors on a bounded lock-free free-list so the hot path does not allocate
//! once it has warmed up.

use super::{
    engine::Engine, event::Event, field::Field, log_level::LogLevel, metrics::PoolMetrics,
};
use crossbeam_queue::ArrayQueue;
use std::panic::Location;
use std::sync::{Arc, LazyLock};

/// Slots reserved in a freshly allocated field buffer
pub const INITIAL_FIELD_CAPACITY: usize = 4;

/// Free-list size of the process-wide pool
pub const DEFAULT_POOL_CAPACITY: usize = 1024;

/// Buffers that grew beyond this many slots are dropped instead of retained
pub const MAX_RETAINED_CAPACITY: usize = 64;

static GLOBAL_POOL: LazyLock<EventPool> = LazyLock::new(EventPool::new);

/// Pool of field buffers backing [`Event`]s
///
/// `acquire` never fails: an empty free-list means a new buffer is allocated.
/// Releasing happens when the event is consumed by a terminal call or dropped,
/// so an event can be released at most once and cannot be used afterwards.
///
/// # Example
///
/// ```
/// use rust_event_logger::{Engine, EventPool, LogLevel};
/// use std::sync::Arc;
///
/// let pool = EventPool::with_capacity(8);
/// let engine = Arc::new(Engine::builder().build());
///
/// let event = pool.acquire(&engine, LogLevel::Info).int("attempt", 1);
/// assert_eq!(event.len(), 1);
/// pool.release(event);
///
/// assert_eq!(pool.idle(), 1);
/// assert!(pool.acquire(&engine, LogLevel::Info).is_empty());
/// ```
#[derive(Debug)]
pub struct EventPool {
    free: ArrayQueue<Vec<Field>>,
    metrics: PoolMetrics,
}

impl EventPool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Create a pool retaining at most `capacity` idle buffers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: ArrayQueue::new(capacity.max(1)),
            metrics: PoolMetrics::new(),
        }
    }

    /// Process-wide pool used by every [`Logger`](crate::Logger)
    pub fn global() -> &'static EventPool {
        &GLOBAL_POOL
    }

    /// Hand out an empty event bound to `engine` and `level`
    ///
    /// The event records the caller's source location.
    #[track_caller]
    pub fn acquire(&self, engine: &Arc<Engine>, level: LogLevel) -> Event<'_> {
        let (fields, reused) = match self.free.pop() {
            Some(fields) => (fields, true),
            None => (Vec::with_capacity(INITIAL_FIELD_CAPACITY), false),
        };
        self.metrics.record_acquired(reused);

        Event::enabled(self, Arc::clone(engine), level, fields, Location::caller())
    }

    /// Return an event to the pool without emitting it
    ///
    /// Equivalent to dropping the event.
    pub fn release(&self, event: Event<'_>) {
        drop(event);
    }

    /// Take back a field buffer; the engine handle it served is already gone
    pub(crate) fn recycle(&self, mut fields: Vec<Field>) {
        if fields.capacity() > MAX_RETAINED_CAPACITY {
            self.metrics.record_discarded();
            return;
        }
        fields.clear();
        if self.free.push(fields).is_err() {
            self.metrics.record_discarded();
        }
    }

    /// Buffers currently waiting for reuse
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.free.capacity()
    }

    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }
}

impl Default for EventPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Arc<Engine> {
        Arc::new(Engine::builder().build())
    }

    #[test]
    fn test_acquire_reserves_capacity() {
        let pool = EventPool::with_capacity(4);
        let event = pool.acquire(&engine(), LogLevel::Info);

        assert!(event.is_empty());
        assert!(event.capacity() >= INITIAL_FIELD_CAPACITY);
        assert_eq!(pool.metrics().allocated(), 1);
    }

    #[test]
    fn test_reacquired_event_is_fresh() {
        let pool = EventPool::with_capacity(4);
        let engine = engine();

        let mut event = pool.acquire(&engine, LogLevel::Warn);
        for i in 0..10 {
            event = event.int64(format!("k{}", i), i);
        }
        assert_eq!(event.len(), 10);
        pool.release(event);

        let event = pool.acquire(&engine, LogLevel::Debug);
        assert!(event.is_empty());
        assert_eq!(event.level(), LogLevel::Debug);
        assert!(event.capacity() >= 10);
        assert_eq!(pool.metrics().reused(), 1);
    }

    #[test]
    fn test_release_drops_engine_handle() {
        let pool = EventPool::with_capacity(4);
        let engine = engine();

        let event = pool.acquire(&engine, LogLevel::Info);
        assert_eq!(Arc::strong_count(&engine), 2);

        pool.release(event);
        assert_eq!(Arc::strong_count(&engine), 1);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_full_pool_discards() {
        let pool = EventPool::with_capacity(1);
        let engine = engine();

        let a = pool.acquire(&engine, LogLevel::Info);
        let b = pool.acquire(&engine, LogLevel::Info);
        drop(a);
        drop(b);

        assert_eq!(pool.idle(), 1);
        assert_eq!(pool.metrics().discarded(), 1);
    }

    #[test]
    fn test_oversized_buffer_not_retained() {
        let pool = EventPool::with_capacity(4);
        let engine = engine();

        let mut event = pool.acquire(&engine, LogLevel::Info);
        for i in 0..(MAX_RETAINED_CAPACITY as i64 + 1) {
            event = event.int64("n", i);
        }
        drop(event);

        assert_eq!(pool.idle(), 0);
        assert_eq!(pool.metrics().discarded(), 1);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = Arc::new(EventPool::with_capacity(16));
        let engine = engine();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let pool = Arc::clone(&pool);
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let event = pool.acquire(&engine, LogLevel::Info);
                        assert!(event.is_empty());
                        let event = event.int64("thread", t).int64("i", i);
                        assert_eq!(event.len(), 2);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.metrics().acquired(), 4000);
        assert!(pool.idle() <= 16);
        assert_eq!(Arc::strong_count(&engine), 1);
    }
}
