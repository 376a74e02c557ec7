//! Usage audit log entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable audit record of one completed request
///
/// Created once per request after the response is produced; never mutated.
/// Retention and cleanup are external concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageLogEntry {
    /// Authenticated user, when resolution succeeded
    pub user_id: Option<i64>,
    /// API key used, when authenticated via long-lived key
    pub api_key_id: Option<i64>,
    /// Request path
    pub endpoint: String,
    /// HTTP method
    pub method: String,
    /// Final response status
    pub status_code: u16,
    /// Wall-clock latency
    pub response_time_ms: u64,
    /// Client network address
    pub ip_address: Option<String>,
    /// Client user agent
    pub user_agent: Option<String>,
    /// Request correlation id
    pub request_id: Option<String>,
    /// Plan in effect at request time
    pub plan_name: Option<String>,
    /// Whether the quota engine throttled this request
    pub rate_limited: bool,
    /// Error text for failed requests
    pub error_message: Option<String>,
    /// Entry timestamp
    pub created_at: DateTime<Utc>,
}
