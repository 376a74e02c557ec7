//! Application wiring
//!
//! Builds every component from configuration and composes them into the
//! shared [`AppState`]. This is the only place construction order and
//! dependencies between components are spelled out.

use crate::auth::{ApiKeyHandler, CredentialResolver, TokenVerifier};
use crate::config::Config;
use crate::core::pipeline::AuthPipeline;
use crate::core::quota::QuotaEngine;
use crate::services::{MemoryUsageSink, SubscriptionService, UsageRecorder};
use crate::storage::counter::{CounterStore, MemoryCounterStore};
use crate::storage::memory::MemoryDirectory;
use crate::storage::redis::{RedisCounterStore, RedisPool};
use crate::storage::Directory;
use crate::utils::error::Result;
use crate::server::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Build the full application state from configuration
pub async fn build_state(config: Config) -> Result<AppState> {
    let directory: Arc<dyn Directory> = Arc::new(MemoryDirectory::new());
    build_state_with(config, directory).await
}

/// Build state over a caller-supplied directory (used by tests)
pub async fn build_state_with(config: Config, directory: Arc<dyn Directory>) -> Result<AppState> {
    config.validate()?;

    let subscriptions = Arc::new(SubscriptionService::new(directory.clone()));
    let catalog = if config.plans.is_empty() {
        crate::config::models::plans::default_catalog()
    } else {
        config.plans.iter().map(Into::into).collect()
    };
    subscriptions.seed_plans(catalog).await?;

    let api_keys = Arc::new(ApiKeyHandler::new(directory.clone(), config.auth.clone()));
    let tokens = Arc::new(TokenVerifier::new(&config.auth)?);
    let resolver = Arc::new(CredentialResolver::new(
        directory.clone(),
        api_keys.clone(),
        tokens,
        subscriptions.clone(),
    ));

    let quota = if config.quota.enabled {
        let store = counter_store(&config).await;
        Some(Arc::new(QuotaEngine::new(
            store,
            Duration::from_millis(config.quota.store_timeout_ms),
        )))
    } else {
        warn!("Quota enforcement disabled by configuration");
        None
    };

    let pipeline = Arc::new(AuthPipeline::new(resolver, quota));

    let usage_log = Arc::new(MemoryUsageSink::new());
    let usage = UsageRecorder::spawn(usage_log.clone());

    Ok(AppState {
        config: Arc::new(config),
        pipeline,
        api_keys,
        subscriptions,
        usage,
        usage_log,
        directory,
    })
}

/// Pick the counter store backend. A failed Redis connection degrades to
/// the in-process store rather than refusing to start.
async fn counter_store(config: &Config) -> Arc<dyn CounterStore> {
    if !config.redis.enabled {
        info!("Using in-process counter store");
        return Arc::new(MemoryCounterStore::new());
    }

    match RedisPool::new(&config.redis).await {
        Ok(pool) => {
            info!("Using Redis counter store");
            Arc::new(RedisCounterStore::new(pool))
        }
        Err(e) => {
            warn!(
                "Redis unavailable ({}), falling back to in-process counters",
                e
            );
            Arc::new(MemoryCounterStore::new())
        }
    }
}
