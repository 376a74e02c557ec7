//! Authentication and quota pipeline
//!
//! One entry point per request: resolve a credential to a principal, then
//! count the request against the principal's limits. Credential failures
//! stop the pipeline before any counter is touched, so failed logins never
//! consume quota.

use crate::auth::CredentialResolver;
use crate::core::models::Principal;
use crate::core::quota::{QuotaDecision, QuotaEngine, QuotaSubject};
use crate::utils::error::{ApiError, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Result of admitting one request
#[derive(Debug)]
pub struct AccessDecision {
    pub principal: Principal,
    pub quota: QuotaDecision,
}

impl AccessDecision {
    /// Convert a throttled decision into its error, keeping admitted ones
    pub fn admitted(self) -> Result<Self> {
        if self.quota.allowed {
            Ok(self)
        } else {
            Err(ApiError::RateLimited(Box::new(self.quota)))
        }
    }
}

/// Composes credential resolution and quota admission
pub struct AuthPipeline {
    resolver: Arc<CredentialResolver>,
    /// None when quota enforcement is disabled by configuration
    quota: Option<Arc<QuotaEngine>>,
}

impl AuthPipeline {
    pub fn new(resolver: Arc<CredentialResolver>, quota: Option<Arc<QuotaEngine>>) -> Self {
        Self { resolver, quota }
    }

    /// Authenticate and count one request.
    ///
    /// Bearer tokens take priority: when both credentials are present the
    /// API key is ignored, and an invalid bearer token fails the request
    /// even if the key would have verified. Callers sending a token have
    /// declared their intent; silently falling back to the other credential
    /// would mask a broken integration.
    ///
    /// Errors cover credential failures only. A throttled request still
    /// returns `Ok` with `quota.allowed == false`, so callers can attribute
    /// the denial to the principal before turning it into a response.
    pub async fn authorize(
        &self,
        bearer: Option<&str>,
        api_key: Option<&str>,
        peer_ip: Option<&str>,
    ) -> Result<AccessDecision> {
        let principal = match (bearer, api_key) {
            (Some(token), _) => self.resolver.resolve_token(token).await?,
            (None, Some(key)) => self.resolver.resolve_api_key(key).await?,
            (None, None) => {
                return Err(ApiError::auth(
                    "Missing or invalid authentication credentials. \
                     Provide either a bearer token (Authorization) or an API key (X-API-Key)",
                ))
            }
        };

        let limits = principal.quota_limits();
        let subject = QuotaSubject::for_request(Some(&principal), peer_ip);

        let quota = match &self.quota {
            Some(engine) => engine.check(&subject, &limits, Utc::now()).await,
            None => QuotaDecision::unchecked(&limits, Utc::now().timestamp()),
        };

        if !quota.allowed {
            debug!(
                "Throttled user {} ({:?}): {}",
                principal.user_id,
                principal.via,
                quota.detail()
            );
        }

        Ok(AccessDecision { principal, quota })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ApiKeyHandler, TokenVerifier};
    use crate::config::AuthConfig;
    use crate::core::models::Plan;
    use crate::services::SubscriptionService;
    use crate::storage::counter::MemoryCounterStore;
    use crate::storage::memory::MemoryDirectory;
    use crate::storage::Directory;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use std::time::Duration;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    struct Fixture {
        pipeline: AuthPipeline,
        api_keys: Arc<ApiKeyHandler>,
        directory: Arc<MemoryDirectory>,
        store: Arc<MemoryCounterStore>,
    }

    async fn fixture() -> Fixture {
        let config = AuthConfig {
            jwt_secret: SECRET.to_string(),
            ..AuthConfig::default()
        };
        let directory = Arc::new(MemoryDirectory::new());
        let subscriptions = Arc::new(SubscriptionService::new(directory.clone()));
        subscriptions.seed_plans(vec![Plan::free()]).await.unwrap();

        let api_keys = Arc::new(ApiKeyHandler::new(directory.clone(), config.clone()));
        let tokens = Arc::new(TokenVerifier::new(&config).unwrap());
        let resolver = Arc::new(CredentialResolver::new(
            directory.clone(),
            api_keys.clone(),
            tokens,
            subscriptions,
        ));

        let store = Arc::new(MemoryCounterStore::new());
        let quota = Arc::new(QuotaEngine::new(store.clone(), Duration::from_millis(500)));

        Fixture {
            pipeline: AuthPipeline::new(resolver, Some(quota)),
            api_keys,
            directory,
            store,
        }
    }

    fn token(sub: &str, email: &str, exp_offset_secs: i64) -> String {
        let claims = crate::auth::jwt::Claims {
            sub: sub.to_string(),
            email: email.to_string(),
            exp: Utc::now().timestamp() + exp_offset_secs,
            iat: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_no_credentials_is_unauthorized() {
        let f = fixture().await;
        let err = f
            .pipeline
            .authorize(None, None, Some("10.0.0.1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
    }

    #[tokio::test]
    async fn test_token_materializes_user_once() {
        let f = fixture().await;
        let t = token("auth0|abc", "a@b.com", 3_600);

        let first = f.pipeline.authorize(Some(&t), None, None).await.unwrap();
        let second = f.pipeline.authorize(Some(&t), None, None).await.unwrap();

        assert_eq!(first.principal.user_id, second.principal.user_id);
        // Second request counted against the same subject
        assert_eq!(
            second.quota.status(crate::core::quota::Window::Minute).remaining,
            first.quota.status(crate::core::quota::Window::Minute).remaining - 1
        );
    }

    #[tokio::test]
    async fn test_invalid_bearer_fails_even_with_valid_key() {
        let f = fixture().await;
        let user = f
            .directory
            .get_or_create_user("auth0|abc", "a@b.com")
            .await
            .unwrap();
        let key = f.api_keys.create_key(user.id, "ci", None, None).await.unwrap();

        let expired = token("auth0|abc", "a@b.com", -3_600);
        let err = f
            .pipeline
            .authorize(Some(&expired), Some(&key.raw_key), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Jwt(_) | ApiError::Auth(_)));
    }

    #[tokio::test]
    async fn test_failed_authentication_consumes_no_quota() {
        let f = fixture().await;
        let expired = token("auth0|abc", "a@b.com", -3_600);

        let _ = f.pipeline.authorize(Some(&expired), None, None).await;
        let _ = f.pipeline.authorize(None, Some("sg-bogus"), None).await;

        // No counter was ever created
        f.store.purge_expired();
        assert_eq!(f.store.len(), 0);
    }

    #[tokio::test]
    async fn test_api_key_counts_against_credential() {
        let f = fixture().await;
        let user = f
            .directory
            .get_or_create_user("auth0|abc", "a@b.com")
            .await
            .unwrap();
        let key = f.api_keys.create_key(user.id, "ci", None, None).await.unwrap();

        let decision = f
            .pipeline
            .authorize(None, Some(&key.raw_key), None)
            .await
            .unwrap();
        assert_eq!(decision.principal.credential_id, Some(key.record.id));
    }

    #[tokio::test]
    async fn test_inactive_user_is_forbidden() {
        let f = fixture().await;
        let t = token("auth0|abc", "a@b.com", 3_600);

        let decision = f.pipeline.authorize(Some(&t), None, None).await.unwrap();
        f.directory
            .set_user_active(decision.principal.user_id, false)
            .await
            .unwrap();

        let err = f.pipeline.authorize(Some(&t), None, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_throttle_keeps_principal_and_surfaces_as_rate_limited() {
        let f = fixture().await;
        let t = token("auth0|burst", "b@c.com", 3_600);

        // Free plan allows 10 per minute
        for _ in 0..10 {
            let decision = f.pipeline.authorize(Some(&t), None, None).await.unwrap();
            assert!(decision.quota.allowed);
        }

        let throttled = f.pipeline.authorize(Some(&t), None, None).await.unwrap();
        assert!(!throttled.quota.allowed);
        assert!(throttled.quota.retry_after.unwrap() <= 60);
        assert_eq!(throttled.principal.email, "b@c.com");

        match throttled.admitted() {
            Err(ApiError::RateLimited(decision)) => assert!(!decision.allowed),
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }
}
