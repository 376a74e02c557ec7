//! Authentication configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for HS256-signed tokens; minimum 32 bytes
    pub jwt_secret: String,
    /// PEM-encoded RSA public key for RS256-signed tokens, when issued
    pub jwt_public_key_pem: Option<String>,
    /// Header carrying long-lived keys
    pub api_key_header: String,
    /// Maximum keys a single user may hold
    pub max_keys_per_user: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-to-a-real-secret-of-32-bytes-or-more".to_string(),
            jwt_public_key_pem: None,
            api_key_header: "X-API-Key".to_string(),
            max_keys_per_user: 10,
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("jwt_secret must be at least 32 characters".to_string());
        }
        if self.api_key_header.is_empty() {
            return Err("api_key_header must not be empty".to_string());
        }
        if self.max_keys_per_user == 0 {
            return Err("max_keys_per_user must be at least 1".to_string());
        }
        Ok(())
    }
}
