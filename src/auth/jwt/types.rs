//! Token claim types

use serde::{Deserialize, Serialize};

/// Claims required from the identity provider's tokens
///
/// `sub` is the stable external identity the local user record keys on;
/// `email` is denormalized for display and audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer-assigned subject identifier
    pub sub: String,
    /// Verified email address
    pub email: String,
    /// Expiry, unix seconds
    pub exp: i64,
    /// Issued-at, unix seconds
    #[serde(default)]
    pub iat: Option<i64>,
}
