//! User account model
//!
//! Authentication itself lives with the external identity provider; this
//! model only stores account metadata synchronized lazily on first sight of
//! a verified token subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Numeric user id
    pub id: i64,
    /// Identity-provider subject claim this account was materialized from
    pub subject: String,
    /// Account email
    pub email: String,
    /// Account role
    pub role: UserRole,
    /// Inactive accounts fail authorization (403), not authentication
    pub is_active: bool,
    /// Lifetime authenticated-request counter
    pub usage_count: u64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
