//! API key issuance

use super::types::CreatedKey;
use super::ApiKeyHandler;
use crate::core::models::{NewApiKey, PlanLimits};
use crate::utils::crypto::{generate_api_key, hash_api_key, key_suffix};
use crate::utils::error::{ApiError, Result};
use chrono::{DateTime, Utc};
use tracing::info;

impl ApiKeyHandler {
    /// Mint a new key for a user.
    ///
    /// The raw key appears only in the returned [`CreatedKey`]; storage sees
    /// the Argon2 hash and the display suffix.
    pub async fn create_key(
        &self,
        user_id: i64,
        name: &str,
        expires_at: Option<DateTime<Utc>>,
        limits: Option<PlanLimits>,
    ) -> Result<CreatedKey> {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Key name must not be empty"));
        }

        let existing = self.directory.api_keys_for_user(user_id).await?;
        let active = existing.iter().filter(|k| k.is_active).count();
        if active >= self.config.max_keys_per_user {
            return Err(ApiError::Conflict(format!(
                "Key limit reached ({} active keys)",
                self.config.max_keys_per_user
            )));
        }

        let raw_key = generate_api_key();
        let record = self
            .directory
            .insert_api_key(NewApiKey {
                user_id,
                name: name.trim().to_string(),
                key_hash: hash_api_key(&raw_key)?,
                last_chars: key_suffix(&raw_key),
                expires_at,
                limits,
            })
            .await?;

        info!(
            "Created API key {} (…{}) for user {}",
            record.id, record.last_chars, user_id
        );

        Ok(CreatedKey { raw_key, record })
    }
}
