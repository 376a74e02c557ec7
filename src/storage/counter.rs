//! Atomic counter store abstraction
//!
//! The quota engine talks to counters through this trait so deployments can
//! run against Redis in production and the in-process store in tests or
//! single-node setups.

use crate::utils::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Atomic increment-with-expiry, the only primitive quota counting needs
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key` by one and return the post-increment count.
    ///
    /// When the increment creates the key, the implementation must arrange
    /// for it to expire after `ttl`. Increment and read are one atomic
    /// operation; callers never read-then-write.
    async fn incr(&self, key: &str, ttl: Duration) -> Result<i64>;
}

struct CounterEntry {
    count: i64,
    expires_at: Instant,
}

/// In-process counter store
///
/// Single-node only: counts are not shared across processes. Expiry is
/// enforced lazily on access, plus an explicit sweep for long-lived
/// deployments.
#[derive(Default)]
pub struct MemoryCounterStore {
    entries: DashMap<String, CounterEntry>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Lazy expiry already keeps counts correct;
    /// this only reclaims memory for keys that are never touched again.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Purged {} expired counter entries", removed);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr(&self, key: &str, ttl: Duration) -> Result<i64> {
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CounterEntry {
                count: 0,
                expires_at: now + ttl,
            });

        // An expired entry is a fresh window that was never swept
        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now + ttl;
        }

        entry.count += 1;
        Ok(entry.count)
    }
}
