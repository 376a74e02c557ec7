//! Redis-backed atomic counters

use super::pool::RedisPool;
use crate::storage::counter::CounterStore;
use crate::utils::error::{ApiError, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::warn;

/// `CounterStore` over a shared Redis deployment
///
/// INCR is the atomic admission primitive; the expiry is attached only when
/// the increment created the key, so every later hit in the same window
/// inherits the original deadline.
pub struct RedisCounterStore {
    pool: RedisPool,
}

impl RedisCounterStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr(&self, key: &str, ttl: Duration) -> Result<i64> {
        let mut conn = self.pool.connection()?;

        let count: i64 = conn.incr(key, 1).await.map_err(ApiError::Redis)?;

        if count == 1 {
            // First hit of the window; counter keys must never outlive it
            let set: std::result::Result<(), redis::RedisError> =
                conn.expire(key, ttl.as_secs() as i64).await;
            if let Err(e) = set {
                // The count is already correct; an unexpired key only means
                // the store holds it a little longer
                warn!("Failed to set expiry on counter {}: {}", key, e);
            }
        }

        Ok(count)
    }
}
