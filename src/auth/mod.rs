//! Authentication and credential resolution
//!
//! Two credential forms resolve to the same [`Principal`]: short-lived
//! bearer tokens from the identity provider and long-lived `sg-` API keys
//! minted here. The resolver is the only component that turns raw
//! credentials into an authenticated identity.

pub mod api_key;
pub mod jwt;

pub use api_key::ApiKeyHandler;
pub use jwt::TokenVerifier;

use crate::core::models::{AuthVia, Principal};
use crate::services::SubscriptionService;
use crate::storage::Directory;
use crate::utils::error::{ApiError, Result};
use std::sync::Arc;
use tracing::debug;

/// Resolves raw credentials into an authenticated [`Principal`]
pub struct CredentialResolver {
    directory: Arc<dyn Directory>,
    api_keys: Arc<ApiKeyHandler>,
    tokens: Arc<TokenVerifier>,
    subscriptions: Arc<SubscriptionService>,
}

impl CredentialResolver {
    pub fn new(
        directory: Arc<dyn Directory>,
        api_keys: Arc<ApiKeyHandler>,
        tokens: Arc<TokenVerifier>,
        subscriptions: Arc<SubscriptionService>,
    ) -> Self {
        Self {
            directory,
            api_keys,
            tokens,
            subscriptions,
        }
    }

    /// Resolve a bearer token.
    ///
    /// Users are materialized lazily: the first request carrying a valid
    /// token for an unseen subject creates an active user record. Identity
    /// lives with the token issuer; this service only mirrors it.
    pub async fn resolve_token(&self, token: &str) -> Result<Principal> {
        let claims = self.tokens.verify(token)?;

        let user = self
            .directory
            .get_or_create_user(&claims.sub, &claims.email)
            .await?;
        debug!("Token resolved to user {} ({})", user.id, user.email);

        self.principal_for(user, None, AuthVia::Token, None).await
    }

    /// Resolve a long-lived API key
    pub async fn resolve_api_key(&self, raw_key: &str) -> Result<Principal> {
        let key = self
            .api_keys
            .verify(raw_key)
            .await?
            .ok_or_else(|| ApiError::auth("Invalid or revoked API key"))?;

        let user = self
            .directory
            .find_user(key.user_id)
            .await?
            .ok_or_else(|| ApiError::auth("API key owner no longer exists"))?;
        debug!("API key {} resolved to user {}", key.id, user.id);

        self.principal_for(user, Some(key.id), AuthVia::Key, key.limits)
            .await
    }

    async fn principal_for(
        &self,
        user: crate::core::models::User,
        credential_id: Option<i64>,
        via: AuthVia,
        limit_override: Option<crate::core::models::PlanLimits>,
    ) -> Result<Principal> {
        // A valid credential for a deactivated account is an authorization
        // failure, not an authentication one
        if !user.is_active {
            return Err(ApiError::forbidden("User account is inactive"));
        }

        let plan = self.subscriptions.effective_plan(user.id).await?;

        Ok(Principal {
            user_id: user.id,
            email: user.email,
            plan,
            credential_id,
            via,
            limit_override,
        })
    }
}
