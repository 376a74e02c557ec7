//! API key verification and lifecycle management

use super::ApiKeyHandler;
use crate::core::models::ApiKey;
use crate::utils::crypto::{verify_api_key, API_KEY_PREFIX};
use crate::utils::error::{ApiError, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

impl ApiKeyHandler {
    /// Verify a presented key, returning its record when valid and usable.
    ///
    /// Hashed keys cannot be looked up directly, so this scans every active
    /// key. The active set is small (keys per paying user, not per request)
    /// and the scan keeps verification constant-time per candidate.
    pub async fn verify(&self, raw_key: &str) -> Result<Option<ApiKey>> {
        // Cheap shape check before any hashing work
        if !raw_key.starts_with(API_KEY_PREFIX) || !raw_key.contains('-') {
            return Ok(None);
        }

        let now = Utc::now();
        for key in self.directory.active_api_keys().await? {
            if !verify_api_key(raw_key, &key.key_hash) {
                continue;
            }

            if !key.is_usable(now) {
                debug!("Matched key {} is expired or revoked", key.id);
                return Ok(None);
            }

            self.touch(key.id);
            return Ok(Some(key));
        }

        Ok(None)
    }

    /// Keys owned by a user, hash excluded by serialization
    pub async fn list_keys(&self, user_id: i64) -> Result<Vec<ApiKey>> {
        self.directory.api_keys_for_user(user_id).await
    }

    /// Revoke a key the caller owns. Soft delete: the record stays for audit.
    pub async fn revoke_key(&self, user_id: i64, key_id: i64) -> Result<()> {
        let key = self
            .directory
            .find_api_key(key_id)
            .await?
            .ok_or_else(|| ApiError::not_found("API key not found"))?;

        if key.user_id != user_id {
            return Err(ApiError::forbidden("API key belongs to another user"));
        }
        if !key.is_active {
            return Err(ApiError::Conflict("API key is already revoked".to_string()));
        }

        self.directory.revoke_api_key(key_id, Utc::now()).await?;
        info!("Revoked API key {} for user {}", key_id, user_id);
        Ok(())
    }

    /// Best-effort `last_used_at` stamp, off the request path
    fn touch(&self, key_id: i64) {
        let directory = self.directory.clone();
        tokio::spawn(async move {
            if let Err(e) = directory.touch_api_key(key_id, Utc::now()).await {
                warn!("Failed to stamp last_used_at on key {}: {}", key_id, e);
            }
        });
    }
}
