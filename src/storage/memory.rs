//! In-memory directory
//!
//! Backs tests and single-node deployments. All state lives behind one
//! `RwLock`; writes are short and the lock is never held across an await.

use super::{latest_active, Directory};
use crate::core::models::{
    ApiKey, NewApiKey, NewSubscription, Plan, Subscription, SubscriptionStatus, User, UserRole,
};
use crate::utils::error::{ApiError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    users_by_subject: HashMap<String, i64>,
    api_keys: HashMap<i64, ApiKey>,
    plans: HashMap<String, Plan>,
    subscriptions: HashMap<i64, Subscription>,
    next_user_id: i64,
    next_key_id: i64,
    next_subscription_id: i64,
}

/// `Directory` over process-local hash maps
#[derive(Default)]
pub struct MemoryDirectory {
    inner: RwLock<Inner>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn get_or_create_user(&self, subject: &str, email: &str) -> Result<User> {
        let mut inner = self.inner.write();

        if let Some(id) = inner.users_by_subject.get(subject).copied() {
            if let Some(user) = inner.users.get(&id) {
                return Ok(user.clone());
            }
        }

        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            subject: subject.to_string(),
            email: email.to_string(),
            role: UserRole::User,
            is_active: true,
            usage_count: 0,
            created_at: Utc::now(),
        };
        inner.users_by_subject.insert(subject.to_string(), user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.inner.read().users.get(&user_id).cloned())
    }

    async fn set_user_active(&self, user_id: i64, is_active: bool) -> Result<()> {
        let mut inner = self.inner.write();
        match inner.users.get_mut(&user_id) {
            Some(user) => {
                user.is_active = is_active;
                Ok(())
            }
            None => Err(ApiError::not_found("User not found")),
        }
    }

    async fn record_user_request(&self, user_id: i64) -> Result<()> {
        let mut inner = self.inner.write();
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.usage_count += 1;
        }
        Ok(())
    }

    async fn insert_api_key(&self, new_key: NewApiKey) -> Result<ApiKey> {
        let mut inner = self.inner.write();
        inner.next_key_id += 1;
        let key = ApiKey {
            id: inner.next_key_id,
            user_id: new_key.user_id,
            name: new_key.name,
            key_hash: new_key.key_hash,
            last_chars: new_key.last_chars,
            is_active: true,
            revoked_at: None,
            expires_at: new_key.expires_at,
            last_used_at: None,
            limits: new_key.limits,
            created_at: Utc::now(),
        };
        inner.api_keys.insert(key.id, key.clone());
        Ok(key)
    }

    async fn active_api_keys(&self) -> Result<Vec<ApiKey>> {
        Ok(self
            .inner
            .read()
            .api_keys
            .values()
            .filter(|k| k.is_active)
            .cloned()
            .collect())
    }

    async fn api_keys_for_user(&self, user_id: i64) -> Result<Vec<ApiKey>> {
        let mut keys: Vec<ApiKey> = self
            .inner
            .read()
            .api_keys
            .values()
            .filter(|k| k.user_id == user_id)
            .cloned()
            .collect();
        keys.sort_by_key(|k| k.id);
        Ok(keys)
    }

    async fn find_api_key(&self, key_id: i64) -> Result<Option<ApiKey>> {
        Ok(self.inner.read().api_keys.get(&key_id).cloned())
    }

    async fn revoke_api_key(&self, key_id: i64, now: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.write();
        match inner.api_keys.get_mut(&key_id) {
            Some(key) => {
                key.is_active = false;
                key.revoked_at = Some(now);
                Ok(())
            }
            None => Err(ApiError::not_found("API key not found")),
        }
    }

    async fn touch_api_key(&self, key_id: i64, now: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.write();
        if let Some(key) = inner.api_keys.get_mut(&key_id) {
            key.last_used_at = Some(now);
        }
        Ok(())
    }

    async fn plans(&self) -> Result<Vec<Plan>> {
        let mut plans: Vec<Plan> = self.inner.read().plans.values().cloned().collect();
        plans.sort_by_key(|p| p.display_order);
        Ok(plans)
    }

    async fn find_plan(&self, name: &str) -> Result<Option<Plan>> {
        Ok(self.inner.read().plans.get(name).cloned())
    }

    async fn upsert_plan(&self, plan: Plan) -> Result<()> {
        self.inner.write().plans.insert(plan.name.clone(), plan);
        Ok(())
    }

    async fn insert_subscription(&self, new_sub: NewSubscription) -> Result<Subscription> {
        let mut inner = self.inner.write();
        inner.next_subscription_id += 1;
        let sub = Subscription {
            id: inner.next_subscription_id,
            user_id: new_sub.user_id,
            plan_name: new_sub.plan_name,
            status: SubscriptionStatus::Active,
            billing_cycle: new_sub.billing_cycle,
            subscribed_at: new_sub.subscribed_at,
            current_period_start: new_sub.current_period_start,
            current_period_end: new_sub.current_period_end,
            cancelled_at: None,
            cancel_at_period_end: false,
            auto_renew: true,
            price_paid_cents: new_sub.price_paid_cents,
        };
        inner.subscriptions.insert(sub.id, sub.clone());
        Ok(sub)
    }

    async fn find_subscription(&self, subscription_id: i64) -> Result<Option<Subscription>> {
        Ok(self.inner.read().subscriptions.get(&subscription_id).cloned())
    }

    async fn update_subscription(&self, subscription: Subscription) -> Result<()> {
        let mut inner = self.inner.write();
        match inner.subscriptions.get_mut(&subscription.id) {
            Some(slot) => {
                *slot = subscription;
                Ok(())
            }
            None => Err(ApiError::not_found("Subscription not found")),
        }
    }

    async fn active_subscription(&self, user_id: i64) -> Result<Option<Subscription>> {
        let subs: Vec<Subscription> = self.inner.read().subscriptions.values().cloned().collect();
        Ok(latest_active(subs, user_id))
    }
}
