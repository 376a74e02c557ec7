//! Subscription management
//!
//! Owns the plan a user is entitled to. Reads are side-effect free:
//! resolving an effective plan never mutates subscription state, so an
//! expired subscription simply stops granting its plan rather than being
//! flipped to cancelled on the read path.

use crate::core::models::{
    BillingCycle, NewSubscription, Plan, Subscription, SubscriptionStatus,
};
use crate::storage::Directory;
use crate::utils::error::{ApiError, Result};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

pub struct SubscriptionService {
    directory: Arc<dyn Directory>,
}

impl SubscriptionService {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// The plan currently granted to a user.
    ///
    /// Falls back to the built-in free plan when the user has no active
    /// subscription, when the subscription's period has lapsed, or when it
    /// names a plan that no longer exists.
    pub async fn effective_plan(&self, user_id: i64) -> Result<Plan> {
        let now = Utc::now();

        let Some(sub) = self.directory.active_subscription(user_id).await? else {
            return Ok(Plan::free());
        };
        if !sub.is_active(now) {
            debug!(
                "Subscription {} for user {} lapsed at {}, serving free plan",
                sub.id, user_id, sub.current_period_end
            );
            return Ok(Plan::free());
        }

        match self.directory.find_plan(&sub.plan_name).await? {
            Some(plan) if plan.is_active => Ok(plan),
            _ => {
                debug!(
                    "Plan {} referenced by subscription {} is unavailable, serving free plan",
                    sub.plan_name, sub.id
                );
                Ok(Plan::free())
            }
        }
    }

    /// Subscribe a user to a plan, superseding any current subscription
    pub async fn subscribe(
        &self,
        user_id: i64,
        plan_name: &str,
        cycle: BillingCycle,
    ) -> Result<Subscription> {
        let plan = self
            .directory
            .find_plan(plan_name)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| ApiError::not_found(format!("Plan '{}' not found", plan_name)))?;

        // One active subscription per user; the old one is cancelled first
        if let Some(mut current) = self.directory.active_subscription(user_id).await? {
            current.status = SubscriptionStatus::Cancelled;
            current.cancelled_at = Some(Utc::now());
            self.directory.update_subscription(current).await?;
        }

        let now = Utc::now();
        let (period, price) = match cycle {
            BillingCycle::Monthly => (Duration::days(30), plan.price_monthly_cents),
            BillingCycle::Yearly => (Duration::days(365), plan.price_yearly_cents),
        };

        let sub = self
            .directory
            .insert_subscription(NewSubscription {
                user_id,
                plan_name: plan.name.clone(),
                billing_cycle: cycle,
                subscribed_at: now,
                current_period_start: now,
                current_period_end: now + period,
                price_paid_cents: price,
            })
            .await?;

        info!(
            "User {} subscribed to {} ({:?}), period ends {}",
            user_id, plan.name, cycle, sub.current_period_end
        );
        Ok(sub)
    }

    /// Cancel a subscription. Access continues until the paid period ends.
    pub async fn cancel(&self, user_id: i64, subscription_id: i64) -> Result<Subscription> {
        let mut sub = self.owned_subscription(user_id, subscription_id).await?;

        if sub.status == SubscriptionStatus::Cancelled {
            return Err(ApiError::Conflict(
                "Subscription is already cancelled".to_string(),
            ));
        }

        sub.cancel_at_period_end = true;
        sub.auto_renew = false;
        sub.cancelled_at = Some(Utc::now());
        self.directory.update_subscription(sub.clone()).await?;

        info!(
            "Subscription {} for user {} cancelled, active until {}",
            sub.id, user_id, sub.current_period_end
        );
        Ok(sub)
    }

    /// Undo a pending cancellation before the period ends
    pub async fn reactivate(&self, user_id: i64, subscription_id: i64) -> Result<Subscription> {
        let mut sub = self.owned_subscription(user_id, subscription_id).await?;

        if !sub.cancel_at_period_end {
            return Err(ApiError::Conflict(
                "Subscription is not pending cancellation".to_string(),
            ));
        }
        if sub.current_period_end <= Utc::now() {
            return Err(ApiError::Conflict(
                "Subscription period has already ended".to_string(),
            ));
        }

        sub.cancel_at_period_end = false;
        sub.auto_renew = true;
        sub.cancelled_at = None;
        self.directory.update_subscription(sub.clone()).await?;

        info!("Subscription {} for user {} reactivated", sub.id, user_id);
        Ok(sub)
    }

    /// Every plan available for subscription, in display order
    pub async fn list_plans(&self) -> Result<Vec<Plan>> {
        let mut plans = self.directory.plans().await?;
        plans.retain(|p| p.is_active);
        Ok(plans)
    }

    /// Install the given plan catalog, updating entries that already exist
    pub async fn seed_plans(&self, plans: Vec<Plan>) -> Result<()> {
        let count = plans.len();
        for plan in plans {
            self.directory.upsert_plan(plan).await?;
        }
        info!("Seeded {} subscription plans", count);
        Ok(())
    }

    async fn owned_subscription(
        &self,
        user_id: i64,
        subscription_id: i64,
    ) -> Result<Subscription> {
        let sub = self
            .directory
            .find_subscription(subscription_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Subscription not found"))?;

        if sub.user_id != user_id {
            return Err(ApiError::forbidden(
                "Subscription belongs to another user",
            ));
        }
        Ok(sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::PlanLimits;
    use crate::storage::memory::MemoryDirectory;

    fn pro_plan() -> Plan {
        Plan {
            name: "pro".to_string(),
            display_name: "Pro".to_string(),
            limits: PlanLimits::new(100, 2_000, 20_000),
            price_monthly_cents: 2_900,
            price_yearly_cents: 29_000,
            is_active: true,
            display_order: 2,
        }
    }

    async fn service() -> (SubscriptionService, Arc<MemoryDirectory>) {
        let dir = Arc::new(MemoryDirectory::new());
        let svc = SubscriptionService::new(dir.clone());
        svc.seed_plans(vec![Plan::free(), pro_plan()]).await.unwrap();
        (svc, dir)
    }

    #[tokio::test]
    async fn test_user_without_subscription_gets_free_plan() {
        let (svc, _) = service().await;
        let plan = svc.effective_plan(1).await.unwrap();
        assert_eq!(plan.name, "free");
        assert_eq!(plan.limits.per_minute, 10);
    }

    #[tokio::test]
    async fn test_subscribe_grants_plan() {
        let (svc, _) = service().await;

        let sub = svc.subscribe(1, "pro", BillingCycle::Monthly).await.unwrap();
        assert_eq!(sub.price_paid_cents, 2_900);

        let plan = svc.effective_plan(1).await.unwrap();
        assert_eq!(plan.name, "pro");
    }

    #[tokio::test]
    async fn test_subscribe_to_unknown_plan_fails() {
        let (svc, _) = service().await;
        let err = svc
            .subscribe(1, "platinum", BillingCycle::Monthly)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancelled_subscription_grants_until_period_end() {
        let (svc, _) = service().await;

        let sub = svc.subscribe(1, "pro", BillingCycle::Monthly).await.unwrap();
        let cancelled = svc.cancel(1, sub.id).await.unwrap();
        assert!(cancelled.cancel_at_period_end);

        // Status stays Active and the period has not ended yet
        let plan = svc.effective_plan(1).await.unwrap();
        assert_eq!(plan.name, "pro");
    }

    #[tokio::test]
    async fn test_cancel_is_owner_only() {
        let (svc, _) = service().await;
        let sub = svc.subscribe(1, "pro", BillingCycle::Monthly).await.unwrap();

        let err = svc.cancel(2, sub.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_reactivate_clears_pending_cancellation() {
        let (svc, _) = service().await;
        let sub = svc.subscribe(1, "pro", BillingCycle::Yearly).await.unwrap();

        svc.cancel(1, sub.id).await.unwrap();
        let reactivated = svc.reactivate(1, sub.id).await.unwrap();

        assert!(!reactivated.cancel_at_period_end);
        assert!(reactivated.auto_renew);
        assert!(reactivated.cancelled_at.is_none());
    }

    #[tokio::test]
    async fn test_reactivate_without_pending_cancellation_conflicts() {
        let (svc, _) = service().await;
        let sub = svc.subscribe(1, "pro", BillingCycle::Monthly).await.unwrap();

        let err = svc.reactivate(1, sub.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_resubscribe_supersedes_current() {
        let (svc, dir) = service().await;

        let first = svc.subscribe(1, "pro", BillingCycle::Monthly).await.unwrap();
        let second = svc.subscribe(1, "pro", BillingCycle::Yearly).await.unwrap();
        assert_ne!(first.id, second.id);

        let old = dir.find_subscription(first.id).await.unwrap().unwrap();
        assert_eq!(old.status, SubscriptionStatus::Cancelled);

        let active = dir.active_subscription(1).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
    }
}
