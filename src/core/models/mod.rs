//! Domain model types

pub mod api_key;
pub mod plan;
pub mod principal;
pub mod subscription;
pub mod usage;
pub mod user;

pub use api_key::{ApiKey, NewApiKey};
pub use plan::{Plan, PlanLimits};
pub use principal::{AuthVia, Principal};
pub use subscription::{BillingCycle, NewSubscription, Subscription, SubscriptionStatus};
pub use usage::UsageLogEntry;
pub use user::{User, UserRole};
