//! HTTP server
//!
//! This module provides the HTTP surface: application state, middleware,
//! route handlers and server startup.

pub mod builder;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use builder::build_state;
pub use server::run_server;
pub use state::AppState;
