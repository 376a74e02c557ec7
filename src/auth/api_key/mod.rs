//! API key lifecycle and verification

mod creation;
mod management;
mod types;


pub use types::CreatedKey;

use crate::config::AuthConfig;
use crate::storage::Directory;
use std::sync::Arc;

/// Issues, verifies and revokes long-lived API keys
pub struct ApiKeyHandler {
    pub(crate) directory: Arc<dyn Directory>,
    pub(crate) config: AuthConfig,
}

impl ApiKeyHandler {
    pub fn new(directory: Arc<dyn Directory>, config: AuthConfig) -> Self {
        Self { directory, config }
    }
}
