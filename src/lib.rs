//! Statgate: tiered authentication and multi-window rate limiting for a
//! sports-statistics API.
//!
//! Requests authenticate with either a bearer token or a long-lived API
//! key, resolve to a subscription plan, and are counted against fixed
//! minute, hour and day windows in an atomic counter store. Counter
//! outages fail open: the API stays available without enforcement.

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use utils::error::{ApiError, Result};
