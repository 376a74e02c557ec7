//! Plan catalog configuration

use crate::core::models::{Plan, PlanLimits};
use serde::{Deserialize, Serialize};

/// One plan in the seeded catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub name: String,
    pub display_name: String,
    pub requests_per_minute: u32,
    pub requests_per_hour: u32,
    pub requests_per_day: u32,
    #[serde(default)]
    pub price_monthly_cents: i64,
    #[serde(default)]
    pub price_yearly_cents: i64,
    #[serde(default)]
    pub display_order: i32,
}

impl PlanConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.requests_per_minute == 0
            || self.requests_per_hour == 0
            || self.requests_per_day == 0
        {
            return Err("all window limits must be positive".to_string());
        }
        if self.requests_per_minute > self.requests_per_hour
            || self.requests_per_hour > self.requests_per_day
        {
            return Err("limits must not shrink as windows grow".to_string());
        }
        Ok(())
    }
}

impl From<&PlanConfig> for Plan {
    fn from(c: &PlanConfig) -> Self {
        Plan {
            name: c.name.clone(),
            display_name: c.display_name.clone(),
            limits: PlanLimits::new(
                c.requests_per_minute,
                c.requests_per_hour,
                c.requests_per_day,
            ),
            price_monthly_cents: c.price_monthly_cents,
            price_yearly_cents: c.price_yearly_cents,
            is_active: true,
            display_order: c.display_order,
        }
    }
}

/// Catalog installed when the configuration names no plans
pub fn default_catalog() -> Vec<Plan> {
    vec![
        Plan::free(),
        Plan {
            name: "pro".to_string(),
            display_name: "Pro".to_string(),
            limits: PlanLimits::new(100, 2_000, 20_000),
            price_monthly_cents: 2_900,
            price_yearly_cents: 29_000,
            is_active: true,
            display_order: 2,
        },
        Plan {
            name: "enterprise".to_string(),
            display_name: "Enterprise".to_string(),
            limits: PlanLimits::new(1_000, 20_000, 200_000),
            price_monthly_cents: 19_900,
            price_yearly_cents: 199_000,
            is_active: true,
            display_order: 3,
        },
    ]
}
