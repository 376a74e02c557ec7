//! Configuration models

pub mod auth;
pub mod plans;
pub mod quota;
pub mod redis;
pub mod server;

pub use auth::AuthConfig;
pub use plans::PlanConfig;
pub use quota::QuotaConfig;
pub use redis::RedisConfig;
pub use server::ServerConfig;
