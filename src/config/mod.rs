//! Configuration management
//!
//! Configuration layers, later sources winning: struct defaults, an optional
//! YAML file, then `STATGATE__`-prefixed environment variables (double
//! underscore separating sections, e.g. `STATGATE__SERVER__PORT=9000`).

pub mod models;

pub use models::*;

use crate::utils::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub redis: RedisConfig,
    pub quota: QuotaConfig,
    /// Plan catalog seeded at startup
    pub plans: Vec<PlanConfig>,
}

impl Config {
    /// Load from a YAML file plus environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let config: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("STATGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ApiError::config(format!("Failed to load config: {}", e)))?
            .try_deserialize()
            .map_err(|e| ApiError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load from environment variables over defaults (no file)
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| ApiError::config(format!("Invalid default config: {}", e)))?;

        let config: Self = config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::Environment::with_prefix("STATGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ApiError::config(format!("Failed to load config: {}", e)))?
            .try_deserialize()
            .map_err(|e| ApiError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        self.server
            .validate()
            .map_err(|e| ApiError::config(format!("Server config error: {}", e)))?;
        self.auth
            .validate()
            .map_err(|e| ApiError::config(format!("Auth config error: {}", e)))?;
        self.quota
            .validate()
            .map_err(|e| ApiError::config(format!("Quota config error: {}", e)))?;

        for plan in &self.plans {
            plan.validate()
                .map_err(|e| ApiError::config(format!("Plan '{}' config error: {}", plan.name, e)))?;
        }

        if self.redis.enabled && self.redis.url.is_empty() {
            return Err(ApiError::config("Redis is enabled but no URL is set"));
        }
        if !self.redis.enabled {
            warn!("Redis disabled; quota counters are process-local");
        }

        Ok(())
    }
}
