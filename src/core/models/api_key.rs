//! API key (long-lived credential) model

use super::plan::PlanLimits;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Long-lived credential bound to one user
///
/// The raw key is never stored; only its Argon2 hash and the last eight
/// characters for UI display. A key is usable only while active, non-revoked
/// and non-expired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    /// Numeric key id
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Human-readable name ("Production API", "Development Key")
    pub name: String,
    /// Argon2 hash of the raw key
    #[serde(skip_serializing)]
    pub key_hash: String,
    /// Last characters of the raw key for display
    pub last_chars: String,
    /// Status flag; cleared on revocation
    pub is_active: bool,
    /// Revocation timestamp (None while usable)
    pub revoked_at: Option<DateTime<Utc>>,
    /// Optional expiration timestamp
    pub expires_at: Option<DateTime<Utc>>,
    /// Last successful verification
    pub last_used_at: Option<DateTime<Utc>>,
    /// Per-credential override limits; plan limits apply when None
    pub limits: Option<PlanLimits>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Whether the key can authenticate requests at `now`
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.revoked_at.is_some() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => now <= expires_at,
            None => true,
        }
    }
}

/// Fields required to persist a new API key
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub user_id: i64,
    pub name: String,
    pub key_hash: String,
    pub last_chars: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub limits: Option<PlanLimits>,
}
