//! Fixed-window rate limiting for bursty create actions.

use std::{collections::HashMap, time::Duration};

use serde::Deserialize;
use tokio::time::Instant;

/// Key used when the caller has no stable identity.
pub const ANONYMOUS: &str = "anonymous";

/// Thresholds of a [`RateLimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LimitConfig {
    pub max_attempts: u32,
    pub window_ms: u64,
}

impl LimitConfig {
    pub const fn new(max_attempts: u32, window_ms: u64) -> Self {
        Self {
            max_attempts,
            window_ms,
        }
    }

    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counter keyed by actor.
///
/// Counters live in a plain map: the store drives the limiter from a single
/// logical task, so no locking is involved.
#[derive(Debug)]
pub struct RateLimiter {
    config: LimitConfig,
    windows: HashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(config: LimitConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
        }
    }

    pub fn config(&self) -> LimitConfig {
        self.config
    }

    /// Count an attempt for `key`; `false` once the live window is exhausted.
    pub fn is_allowed(&mut self, key: &str) -> bool {
        let now = Instant::now();
        match self.windows.get_mut(key) {
            Some(window) if now < window.reset_at => {
                if window.count < self.config.max_attempts {
                    window.count += 1;
                    true
                } else {
                    false
                }
            }
            _ => {
                self.windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.config.window(),
                    },
                );
                true
            }
        }
    }

    /// Expiry of the live window for `key`, if any.
    pub fn reset_time(&self, key: &str) -> Option<Instant> {
        let now = Instant::now();
        self.windows
            .get(key)
            .map(|window| window.reset_at)
            .filter(|reset_at| now < *reset_at)
    }

    /// Time left until `key` may act again, zero when it already may.
    pub fn retry_after(&self, key: &str) -> Duration {
        self.reset_time(key)
            .map(|reset_at| reset_at.saturating_duration_since(Instant::now()))
            .unwrap_or_default()
    }

    /// Attempts counted in the live window for `key`.
    pub fn attempts(&self, key: &str) -> u32 {
        let now = Instant::now();
        self.windows
            .get(key)
            .filter(|window| now < window.reset_at)
            .map_or(0, |window| window.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fourth_attempt_in_window_is_denied() {
        let mut limiter = RateLimiter::new(LimitConfig::new(3, 60_000));

        assert!(limiter.is_allowed("alice"));
        assert!(limiter.is_allowed("alice"));
        assert!(limiter.is_allowed("alice"));
        assert!(!limiter.is_allowed("alice"));
        assert_eq!(limiter.attempts("alice"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn window_expiry_starts_a_fresh_window() {
        let mut limiter = RateLimiter::new(LimitConfig::new(3, 60_000));
        for _ in 0..4 {
            limiter.is_allowed("alice");
        }

        tokio::time::advance(Duration::from_millis(60_001)).await;

        assert!(limiter.is_allowed("alice"));
        assert_eq!(limiter.attempts("alice"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let mut limiter = RateLimiter::new(LimitConfig::new(1, 1_000));

        assert!(limiter.is_allowed("alice"));
        assert!(!limiter.is_allowed("alice"));
        assert!(limiter.is_allowed(ANONYMOUS));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_time_tracks_the_live_window() {
        let mut limiter = RateLimiter::new(LimitConfig::new(1, 10_000));
        assert_eq!(limiter.reset_time("alice"), None);

        let started = Instant::now();
        limiter.is_allowed("alice");
        assert_eq!(
            limiter.reset_time("alice"),
            Some(started + Duration::from_secs(10))
        );

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(limiter.retry_after("alice"), Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(7)).await;
        assert_eq!(limiter.reset_time("alice"), None);
        assert_eq!(limiter.retry_after("alice"), Duration::ZERO);
    }
}
