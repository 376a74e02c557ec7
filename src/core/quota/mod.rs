//! Multi-window quota engine
//!
//! Fixed-window counting over an external atomic counter store. The engine
//! itself is stateless and horizontally shareable: all contention resolves
//! through the store's atomic increment, never application-level locking.

mod decision;
mod window;


pub use decision::{QuotaDecision, WindowStatus};
pub use window::Window;

use crate::core::models::{PlanLimits, Principal};
use crate::storage::counter::CounterStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Identity a counter key is built from
///
/// Precedence: credential id when the request used a long-lived key, then
/// resolved user id, then caller network address. The same precedence must
/// feed both the admission decision and header reporting or the reported
/// remaining counts desynchronize from the enforced key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaSubject {
    Credential(i64),
    User(i64),
    Ip(String),
}

impl QuotaSubject {
    /// Subject for a resolved (or anonymous) request
    pub fn for_request(principal: Option<&Principal>, peer_ip: Option<&str>) -> Self {
        match principal {
            Some(p) => match p.credential_id {
                Some(id) => QuotaSubject::Credential(id),
                None => QuotaSubject::User(p.user_id),
            },
            None => QuotaSubject::Ip(peer_ip.unwrap_or("unknown").to_string()),
        }
    }

    /// Counter key for one (subject, window, window-start) triple
    pub fn counter_key(&self, window: Window, window_start: i64) -> String {
        match self {
            QuotaSubject::Credential(id) => {
                format!("ratelimit:apikey:{}:{}:{}", id, window.as_str(), window_start)
            }
            QuotaSubject::User(id) => {
                format!("ratelimit:user:{}:{}:{}", id, window.as_str(), window_start)
            }
            QuotaSubject::Ip(ip) => {
                format!("ratelimit:ip:{}:{}:{}", ip, window.as_str(), window_start)
            }
        }
    }
}

/// Fixed-window quota engine
pub struct QuotaEngine {
    /// External atomic counter store
    store: Arc<dyn CounterStore>,
    /// Bound on each store round trip; a timeout is treated as a store error
    store_timeout: Duration,
}

impl QuotaEngine {
    pub fn new(store: Arc<dyn CounterStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Admit or deny one request, returning complete per-window accounting.
    ///
    /// The atomic increment is the admission check: every window is
    /// incremented before any limit comparison, in the same logical step, so
    /// the reported triple reflects a single point-in-time snapshot. A denied
    /// request has still consumed quota; the increment is never rolled back.
    ///
    /// Any store error or timeout fails open: the request is allowed with
    /// the plan's full limits reported as remaining.
    pub async fn check(
        &self,
        subject: &QuotaSubject,
        limits: &PlanLimits,
        now: DateTime<Utc>,
    ) -> QuotaDecision {
        let now_s = now.timestamp();

        let mut counts = [0_i64; 3];
        for (slot, window) in Window::ALL.into_iter().enumerate() {
            let key = subject.counter_key(window, window.window_start(now_s));
            let ttl = Duration::from_secs(window.length_secs() as u64);

            let incremented = tokio::time::timeout(self.store_timeout, self.store.incr(&key, ttl));
            counts[slot] = match incremented.await {
                Ok(Ok(count)) => count,
                Ok(Err(e)) => {
                    warn!("Counter store error for {}, failing open: {}", key, e);
                    return QuotaDecision::fail_open(limits, now_s);
                }
                Err(_) => {
                    warn!(
                        "Counter store timed out after {:?} for {}, failing open",
                        self.store_timeout, key
                    );
                    return QuotaDecision::fail_open(limits, now_s);
                }
            };
        }

        let windows = [0usize, 1, 2].map(|slot| {
            let window = Window::ALL[slot];
            let limit = window.limit_of(limits);
            WindowStatus {
                window,
                limit,
                remaining: (limit as i64 - counts[slot]).max(0) as u32,
                reset: window.reset_at(now_s),
            }
        });

        // Shortest violated window drives the error detail and Retry-After
        let violated = Window::ALL
            .into_iter()
            .zip(counts)
            .find(|(window, count)| *count > window.limit_of(limits) as i64)
            .map(|(window, _)| window);

        let retry_after = violated.map(|window| (window.reset_at(now_s) - now_s).max(1));

        if let Some(window) = violated {
            debug!(
                "Quota exceeded for {:?} on {} window: {}/{}",
                subject,
                window.as_str(),
                counts[Window::ALL.iter().position(|w| *w == window).unwrap_or(0)],
                window.limit_of(limits)
            );
        }

        QuotaDecision {
            allowed: violated.is_none(),
            degraded: false,
            windows,
            violated,
            retry_after,
        }
    }
}
