//! # Counter Store and Rate Limiter
//!
//! Fixed-window rate limiting over an injected, swappable counter store.
//!
//! The store is keyed by caller-chosen strings (`"claim:<agent>"`,
//! `"submit:<agent>"`) and a window index. An in-memory map serves tests and
//! single-node deployments; a shared keyed store (Redis, a database table)
//! implements the same trait for multi-instance deployments.
//!
//! ## Algorithm
//!
//! - Time is cut into windows of `window_ms`
//! - Each acquire increments the counter for `(key, window)`
//! - Acquires beyond `limit` within a window are refused and not counted

use crate::time::{TimeSource, Timestamp};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Keyed counters for fixed-window rate limiting.
pub trait CounterStore: Send + Sync {
    /// Atomically increments the counter for `(key, window)` if it is below
    /// `limit`. Returns the new count, or `None` when the limit is reached.
    fn try_acquire(&self, key: &str, window: u64, limit: u64) -> Option<u64>;

    /// Current count for `(key, window)`.
    fn count(&self, key: &str, window: u64) -> u64;

    /// Drops all counters for windows older than `window`.
    fn purge_before(&self, window: u64);
}

/// In-memory counter store.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: Mutex<HashMap<(String, u64), u64>>,
}

impl InMemoryCounterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live `(key, window)` entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.lock().len()
    }

    /// True when no counters are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.lock().is_empty()
    }
}

impl CounterStore for InMemoryCounterStore {
    fn try_acquire(&self, key: &str, window: u64, limit: u64) -> Option<u64> {
        let mut counters = self.counters.lock();
        let count = counters.entry((key.to_string(), window)).or_insert(0);
        if *count >= limit {
            return None;
        }
        *count += 1;
        Some(*count)
    }

    fn count(&self, key: &str, window: u64) -> u64 {
        self.counters
            .lock()
            .get(&(key.to_string(), window))
            .copied()
            .unwrap_or(0)
    }

    fn purge_before(&self, window: u64) {
        self.counters.lock().retain(|(_, w), _| *w >= window);
    }
}

/// A limit of `limit` events per `window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    /// Maximum events per window.
    pub limit: u64,
    /// Window length in milliseconds.
    pub window_ms: u64,
}

impl RateLimitRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(limit: u64, window_ms: u64) -> Self {
        Self { limit, window_ms }
    }

    /// Window index containing `now`.
    #[must_use]
    pub fn window_of(&self, now: Timestamp) -> u64 {
        now / self.window_ms.max(1)
    }
}

/// Fixed-window rate limiter over an injected store and clock.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn TimeSource>,
}

impl RateLimiter {
    /// Creates a limiter.
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn TimeSource>) -> Self {
        Self { store, clock }
    }

    /// Tries to consume one event for `key` under `rule`.
    ///
    /// Returns `true` if the event is allowed.
    pub fn try_acquire(&self, rule: RateLimitRule, key: &str) -> bool {
        let window = rule.window_of(self.clock.now());
        let allowed = self.store.try_acquire(key, window, rule.limit).is_some();
        if !allowed {
            debug!(key, window, limit = rule.limit, "Rate limit refused");
        }
        allowed
    }

    /// Events already counted for `key` in the current window.
    pub fn used(&self, rule: RateLimitRule, key: &str) -> u64 {
        self.store.count(key, rule.window_of(self.clock.now()))
    }

    /// Drops counters older than the current window of `rule`.
    pub fn purge_expired(&self, rule: RateLimitRule) {
        let window = rule.window_of(self.clock.now());
        self.store.purge_before(window);
        debug!(window, "Purged rate-limit windows");
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}
