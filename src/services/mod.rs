//! Application services

pub mod subscription;
pub mod usage;

pub use subscription::SubscriptionService;
pub use usage::{MemoryUsageSink, UsageRecorder, UsageSink};
