//! Quota decision and per-window accounting

use super::window::Window;
use crate::core::models::PlanLimits;
use actix_web::http::header::{HeaderName, HeaderValue};
use serde::Serialize;

/// Accounting snapshot for one window
#[derive(Debug, Clone, Serialize)]
pub struct WindowStatus {
    /// Window kind
    pub window: Window,
    /// Plan ceiling for this window
    pub limit: u32,
    /// Requests left in the current window (post-increment)
    pub remaining: u32,
    /// Unix timestamp at which the window resets
    pub reset: i64,
}

/// Outcome of one admission check
///
/// All three windows are always evaluated and reported, so response headers
/// carry complete minute/hour/day accounting whether the request was
/// admitted or denied.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaDecision {
    /// Whether the request is admitted
    pub allowed: bool,
    /// True when the counter store was unavailable and the engine failed open
    pub degraded: bool,
    /// Minute, hour, day accounting in that order
    pub windows: [WindowStatus; 3],
    /// Shortest violated window, when denied
    pub violated: Option<Window>,
    /// Seconds until the violated window resets, when denied
    pub retry_after: Option<i64>,
}

impl QuotaDecision {
    /// Permissive decision used when the counter store is unreachable:
    /// availability of the wrapped API outranks rate-limit precision.
    pub fn fail_open(limits: &PlanLimits, now: i64) -> Self {
        let mut decision = Self::unchecked(limits, now);
        decision.degraded = true;
        decision
    }

    /// Permissive decision for deployments running with quota disabled.
    /// Headers stay well-formed so clients see a consistent surface.
    pub fn unchecked(limits: &PlanLimits, now: i64) -> Self {
        let windows = Window::ALL.map(|window| WindowStatus {
            window,
            limit: window.limit_of(limits),
            remaining: window.limit_of(limits),
            reset: window.reset_at(now),
        });

        Self {
            allowed: true,
            degraded: false,
            windows,
            violated: None,
            retry_after: None,
        }
    }

    /// Accounting for a given window kind
    pub fn status(&self, window: Window) -> &WindowStatus {
        // Window::ALL and self.windows share the minute/hour/day order
        &self.windows[Window::ALL
            .iter()
            .position(|w| *w == window)
            .unwrap_or(0)]
    }

    /// Human-readable denial detail naming the violated window and limit
    pub fn detail(&self) -> String {
        match self.violated {
            Some(window) => {
                let status = self.status(window);
                format!(
                    "{} requests per {}. Resets at {}",
                    status.limit,
                    window.as_str(),
                    status.reset
                )
            }
            None => "within limits".to_string(),
        }
    }

    /// Rate-limit header set for this decision
    ///
    /// Header names are a compatibility surface; do not rename.
    pub fn header_pairs(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut pairs = Vec::with_capacity(9);
        for status in &self.windows {
            let (limit, remaining, reset) = match status.window {
                Window::Minute => (
                    HeaderName::from_static("x-ratelimit-limit-minute"),
                    HeaderName::from_static("x-ratelimit-remaining-minute"),
                    HeaderName::from_static("x-ratelimit-reset-minute"),
                ),
                Window::Hour => (
                    HeaderName::from_static("x-ratelimit-limit-hour"),
                    HeaderName::from_static("x-ratelimit-remaining-hour"),
                    HeaderName::from_static("x-ratelimit-reset-hour"),
                ),
                Window::Day => (
                    HeaderName::from_static("x-ratelimit-limit-day"),
                    HeaderName::from_static("x-ratelimit-remaining-day"),
                    HeaderName::from_static("x-ratelimit-reset-day"),
                ),
            };
            pairs.push((limit, numeric_value(status.limit as i64)));
            pairs.push((remaining, numeric_value(status.remaining as i64)));
            pairs.push((reset, numeric_value(status.reset)));
        }
        pairs
    }
}

fn numeric_value(n: i64) -> HeaderValue {
    HeaderValue::from_str(&n.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}
