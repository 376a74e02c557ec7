//! Redis connection pool and connection management

use crate::config::RedisConfig;
use crate::utils::error::{ApiError, Result};
use redis::{aio::MultiplexedConnection, Client};
use std::time::Duration;
use tracing::{debug, info};

/// Redis connection pool (supports no-op mode when Redis is unavailable)
#[derive(Debug, Clone)]
pub struct RedisPool {
    /// Redis client (None in no-op mode)
    client: Option<Client>,
    /// Connection manager (None in no-op mode)
    connection_manager: Option<MultiplexedConnection>,
    /// Whether this is a no-op pool (Redis unavailable)
    noop_mode: bool,
}

impl RedisPool {
    /// Create a new Redis pool
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        info!("Creating Redis connection pool");
        debug!("Redis URL: {}", Self::sanitize_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(ApiError::Redis)?;

        // The startup connect is bounded so a dead Redis degrades fast
        // instead of hanging the boot sequence
        let connect_timeout = Duration::from_millis(config.connection_timeout_ms);
        let connection_manager = tokio::time::timeout(
            connect_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            ApiError::Timeout(format!(
                "Redis connection timed out after {:?}",
                connect_timeout
            ))
        })?
        .map_err(ApiError::Redis)?;

        info!("Redis connection pool created successfully");
        Ok(Self {
            client: Some(client),
            connection_manager: Some(connection_manager),
            noop_mode: false,
        })
    }

    /// Create a no-op Redis pool (for when Redis is disabled or unavailable)
    pub fn create_noop() -> Self {
        info!("Creating no-op Redis pool (Redis unavailable)");
        Self {
            client: None,
            connection_manager: None,
            noop_mode: true,
        }
    }

    /// Check if this is a no-op pool
    pub fn is_noop(&self) -> bool {
        self.noop_mode
    }

    /// Get a live connection, or an error in no-op mode. Callers of the
    /// counter path translate the error into a fail-open decision.
    pub(crate) fn connection(&self) -> Result<MultiplexedConnection> {
        self.connection_manager
            .clone()
            .ok_or_else(|| ApiError::internal("Redis unavailable (no-op mode)"))
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        if self.noop_mode {
            debug!("Redis health check skipped (no-op mode)");
            return Ok(());
        }

        let mut conn = self.connection()?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(ApiError::Redis)?;

        debug!("Redis health check passed");
        Ok(())
    }

    /// Sanitize Redis URL for logging (hide password)
    fn sanitize_url(url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            let mut sanitized = parsed.clone();
            if sanitized.password().is_some() {
                let _ = sanitized.set_password(Some("***"));
            }
            sanitized.to_string()
        } else {
            "invalid_url".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_pool_has_no_connection() {
        let pool = RedisPool::create_noop();
        assert!(pool.is_noop());
        assert!(pool.connection().is_err());
    }

    #[tokio::test]
    async fn test_noop_health_check_passes() {
        let pool = RedisPool::create_noop();
        assert!(pool.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_is_bounded_by_configured_timeout() {
        // TEST-NET-1 address: nothing listens there, so the connect either
        // gets refused or hits the configured bound; it never hangs
        let config = RedisConfig {
            url: "redis://192.0.2.1:6379".to_string(),
            enabled: true,
            connection_timeout_ms: 50,
        };

        let started = std::time::Instant::now();
        let result = RedisPool::new(&config).await;
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
