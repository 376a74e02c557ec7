//! API key handler types

use crate::core::models::ApiKey;
use serde::Serialize;

/// A freshly minted key
///
/// `raw_key` is the only copy of the secret that will ever exist; it is
/// returned to the caller once and never stored or logged.
#[derive(Debug, Serialize)]
pub struct CreatedKey {
    /// Full key string, shown exactly once
    pub raw_key: String,
    /// Stored record (hash only, no secret)
    #[serde(flatten)]
    pub record: ApiKey,
}
