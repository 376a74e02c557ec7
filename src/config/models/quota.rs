//! Quota engine configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// When false, every request is admitted without counting
    pub enabled: bool,
    /// Bound on each counter store round trip; exceeding it fails open
    pub store_timeout_ms: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store_timeout_ms: 500,
        }
    }
}

impl QuotaConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.store_timeout_ms == 0 {
            return Err("store_timeout_ms must be positive".to_string());
        }
        Ok(())
    }
}
