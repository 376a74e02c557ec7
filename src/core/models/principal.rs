//! Resolved caller identity

use super::plan::{Plan, PlanLimits};
use serde::Serialize;

/// Which credential kind authenticated the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthVia {
    /// Short-lived signed token (Authorization: Bearer)
    Token,
    /// Long-lived API key (X-API-Key)
    Key,
}

/// Resolved identity of one request
///
/// Computed per request from User + Credential + Plan; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    /// Numeric user id
    pub user_id: i64,
    /// Account email
    pub email: String,
    /// Effective plan at resolution time
    pub plan: Plan,
    /// Originating API key id when authenticated via long-lived key
    pub credential_id: Option<i64>,
    /// Credential kind used
    pub via: AuthVia,
    /// Per-credential override limits, if the key carries its own
    #[serde(skip_serializing)]
    pub limit_override: Option<PlanLimits>,
}

impl Principal {
    /// The limits the quota engine enforces for this request
    pub fn quota_limits(&self) -> PlanLimits {
        self.limit_override.unwrap_or(self.plan.limits)
    }
}
