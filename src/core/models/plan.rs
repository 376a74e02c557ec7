//! Subscription plan catalog types

use serde::{Deserialize, Serialize};

/// Per-window request ceilings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Maximum requests per minute
    pub per_minute: u32,
    /// Maximum requests per hour
    pub per_hour: u32,
    /// Maximum requests per day
    pub per_day: u32,
}

impl PlanLimits {
    pub fn new(per_minute: u32, per_hour: u32, per_day: u32) -> Self {
        Self {
            per_minute,
            per_hour,
            per_day,
        }
    }
}

/// Named rate-limit tier
///
/// Plans are mutated only by subscription-management operations; the rate
/// limiter reads them but never writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan key ('free', 'pro', 'enterprise')
    pub name: String,
    /// Human-readable display name
    pub display_name: String,
    /// Request ceilings for this tier
    pub limits: PlanLimits,
    /// Monthly price in USD cents
    pub price_monthly_cents: i64,
    /// Yearly price in USD cents
    pub price_yearly_cents: i64,
    /// Whether the plan can be subscribed to
    pub is_active: bool,
    /// Sort order for UI display
    pub display_order: i32,
}

impl Plan {
    /// The canonical free plan every user falls back to
    pub fn free() -> Self {
        Self {
            name: "free".to_string(),
            display_name: "Free Plan".to_string(),
            limits: PlanLimits::new(10, 100, 1000),
            price_monthly_cents: 0,
            price_yearly_cents: 0,
            is_active: true,
            display_order: 1,
        }
    }
}
