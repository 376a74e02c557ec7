//! Token signature and claim verification

use super::types::Claims;
use crate::config::AuthConfig;
use crate::utils::error::{ApiError, Result};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use tracing::debug;

/// Verifies bearer tokens signed by the identity provider
///
/// Supports HS256 (shared secret) and RS256 (provider public key), selected
/// per token by the header's `alg`. Any other algorithm is rejected outright
/// so a token cannot downgrade itself to `none`.
pub struct TokenVerifier {
    hmac_key: DecodingKey,
    rsa_key: Option<DecodingKey>,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let rsa_key = match &config.jwt_public_key_pem {
            Some(pem) => Some(
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| ApiError::config(format!("Invalid RSA public key: {}", e)))?,
            ),
            None => None,
        };

        Ok(Self {
            hmac_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            rsa_key,
        })
    }

    /// Verify signature and expiry, returning the token's claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token)?;

        let (key, algorithm) = match header.alg {
            Algorithm::HS256 => (&self.hmac_key, Algorithm::HS256),
            Algorithm::RS256 => match &self.rsa_key {
                Some(key) => (key, Algorithm::RS256),
                None => {
                    return Err(ApiError::auth(
                        "RS256 tokens are not accepted: no public key configured",
                    ))
                }
            },
            other => {
                debug!("Rejecting token with unsupported algorithm {:?}", other);
                return Err(ApiError::auth("Unsupported token signing algorithm"));
            }
        };

        let mut validation = Validation::new(algorithm);
        // Tokens are minted for the provider's own audience values
        validation.validate_aud = false;

        let data = decode::<Claims>(token, key, &validation)?;

        if data.claims.email.is_empty() {
            return Err(ApiError::auth("Token is missing the email claim"));
        }

        Ok(data.claims)
    }
}
