//! # Reconnect Policy
//!
//! Capped exponential backoff for subscribers whose bus connection closed.
//! A worker re-subscribes with a fresh [`crate::Subscription`]; events
//! published while it was disconnected are not replayed.

use std::time::Duration;

/// Backoff schedule for re-subscribing to the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Multiplier applied after each failed attempt.
    pub factor: u32,
}

impl ReconnectPolicy {
    /// 500ms, doubling, capped at 30s.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            factor: 2,
        }
    }

    /// Begin tracking attempts under this policy.
    #[must_use]
    pub fn start(&self) -> ReconnectState {
        ReconnectState {
            policy: *self,
            attempt: 0,
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Mutable attempt counter paired with its policy.
#[derive(Debug, Clone)]
pub struct ReconnectState {
    policy: ReconnectPolicy,
    attempt: u32,
}

impl ReconnectState {
    /// Delay to sleep before the next attempt, advancing the counter.
    pub fn next_delay(&mut self) -> Duration {
        let exp = self
            .policy
            .factor
            .saturating_pow(self.attempt.min(16))
            .max(1);
        self.attempt = self.attempt.saturating_add(1);
        self.policy
            .initial_delay
            .saturating_mul(exp)
            .min(self.policy.max_delay)
    }

    /// Number of attempts made so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Reset after a successful re-subscribe.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
