//! Application state shared across HTTP handlers

use crate::auth::ApiKeyHandler;
use crate::config::Config;
use crate::core::pipeline::AuthPipeline;
use crate::services::{MemoryUsageSink, SubscriptionService, UsageRecorder};
use crate::storage::Directory;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// All fields are Arc-wrapped so cloning the state per worker is cheap.
/// Everything is wired explicitly at startup; there are no globals.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (shared read-only)
    pub config: Arc<Config>,
    /// Authentication plus quota admission
    pub pipeline: Arc<AuthPipeline>,
    /// API key lifecycle operations
    pub api_keys: Arc<ApiKeyHandler>,
    /// Plan and subscription management
    pub subscriptions: Arc<SubscriptionService>,
    /// Fire-and-forget usage recording
    pub usage: UsageRecorder,
    /// Usage entries, readable for the usage endpoint
    pub usage_log: Arc<MemoryUsageSink>,
    /// Durable record store
    pub directory: Arc<dyn Directory>,
}
