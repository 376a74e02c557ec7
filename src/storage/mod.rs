//! Storage layer
//!
//! Two independent concerns: the `Directory` trait owns durable records
//! (users, keys, plans, subscriptions) and `CounterStore` owns volatile
//! quota counters. They scale and fail independently; a counter outage
//! must never take authentication down with it.

pub mod counter;
pub mod memory;
pub mod redis;

use crate::core::models::{
    ApiKey, NewApiKey, NewSubscription, Plan, Subscription, SubscriptionStatus, User,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable record store for users, API keys, plans and subscriptions
#[async_trait]
pub trait Directory: Send + Sync {
    /// Look up a user by token subject, creating an active record on first
    /// sight. Must be idempotent: concurrent calls for the same subject
    /// resolve to one user.
    async fn get_or_create_user(&self, subject: &str, email: &str) -> Result<User>;

    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn set_user_active(&self, user_id: i64, is_active: bool) -> Result<()>;

    /// Bump the user's lifetime request counter
    async fn record_user_request(&self, user_id: i64) -> Result<()>;

    async fn insert_api_key(&self, new_key: NewApiKey) -> Result<ApiKey>;

    /// Every key that has not been revoked, across all users
    async fn active_api_keys(&self) -> Result<Vec<ApiKey>>;

    async fn api_keys_for_user(&self, user_id: i64) -> Result<Vec<ApiKey>>;

    async fn find_api_key(&self, key_id: i64) -> Result<Option<ApiKey>>;

    /// Soft delete: flips `is_active` off and stamps `revoked_at`
    async fn revoke_api_key(&self, key_id: i64, now: DateTime<Utc>) -> Result<()>;

    /// Stamp `last_used_at`; callers treat failures as best-effort
    async fn touch_api_key(&self, key_id: i64, now: DateTime<Utc>) -> Result<()>;

    async fn plans(&self) -> Result<Vec<Plan>>;

    async fn find_plan(&self, name: &str) -> Result<Option<Plan>>;

    async fn upsert_plan(&self, plan: Plan) -> Result<()>;

    async fn insert_subscription(&self, new_sub: NewSubscription) -> Result<Subscription>;

    async fn find_subscription(&self, subscription_id: i64) -> Result<Option<Subscription>>;

    async fn update_subscription(&self, subscription: Subscription) -> Result<()>;

    /// The user's most recent subscription in `Active` status, if any
    async fn active_subscription(&self, user_id: i64) -> Result<Option<Subscription>>;
}

/// Shared helper: newest active subscription wins when history holds several
pub(crate) fn latest_active(
    mut subs: Vec<Subscription>,
    user_id: i64,
) -> Option<Subscription> {
    subs.retain(|s| s.user_id == user_id && s.status == SubscriptionStatus::Active);
    subs.sort_by_key(|s| s.subscribed_at);
    subs.pop()
}
