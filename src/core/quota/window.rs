//! Fixed-window time bucketing
//!
//! Windows are clock-aligned: each interval starts at a multiple of its
//! length on the unix timeline, so every caller in the same minute shares
//! the same bucket regardless of when their first request landed.

use crate::core::models::PlanLimits;
use serde::Serialize;

/// Accounting window kind, ordered by ascending granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Minute,
    Hour,
    Day,
}

impl Window {
    /// All windows, shortest first — evaluation order matters: a
    /// burst-limited caller is told about the minute ceiling, not the
    /// less actionable daily one.
    pub const ALL: [Window; 3] = [Window::Minute, Window::Hour, Window::Day];

    /// Window length in seconds
    pub fn length_secs(&self) -> i64 {
        match self {
            Window::Minute => 60,
            Window::Hour => 3_600,
            Window::Day => 86_400,
        }
    }

    /// Key fragment and header suffix for this window
    pub fn as_str(&self) -> &'static str {
        match self {
            Window::Minute => "minute",
            Window::Hour => "hour",
            Window::Day => "day",
        }
    }

    /// Start of the window containing `now` (unix seconds)
    pub fn window_start(&self, now: i64) -> i64 {
        (now / self.length_secs()) * self.length_secs()
    }

    /// Unix timestamp at which the window containing `now` resets
    pub fn reset_at(&self, now: i64) -> i64 {
        self.window_start(now) + self.length_secs()
    }

    /// The plan ceiling for this window
    pub fn limit_of(&self, limits: &PlanLimits) -> u32 {
        match self {
            Window::Minute => limits.per_minute,
            Window::Hour => limits.per_hour,
            Window::Day => limits.per_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_start_is_clock_aligned() {
        // 2024-01-01T10:30:45Z
        let now = 1_704_105_045;
        assert_eq!(Window::Minute.window_start(now), 1_704_105_000);
        assert_eq!(Window::Hour.window_start(now), 1_704_103_200);
        assert_eq!(Window::Day.window_start(now) % 86_400, 0);
    }

    #[test]
    fn test_window_start_at_exact_boundary() {
        let boundary = 1_704_105_000;
        assert_eq!(Window::Minute.window_start(boundary), boundary);
        assert_eq!(Window::Minute.reset_at(boundary), boundary + 60);
    }

    #[test]
    fn test_adjacent_minutes_have_distinct_starts() {
        let now = 1_704_105_030;
        let next_minute = now + 60;
        assert_ne!(
            Window::Minute.window_start(now),
            Window::Minute.window_start(next_minute)
        );
    }

    #[test]
    fn test_limit_selection() {
        let limits = PlanLimits::new(10, 100, 1000);
        assert_eq!(Window::Minute.limit_of(&limits), 10);
        assert_eq!(Window::Hour.limit_of(&limits), 100);
        assert_eq!(Window::Day.limit_of(&limits), 1000);
    }

    #[test]
    fn test_evaluation_order_is_shortest_first() {
        assert_eq!(Window::ALL[0], Window::Minute);
        assert_eq!(Window::ALL[2], Window::Day);
    }
}
