//! Outbound request throttling per provider.

use governor::{Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::NotKeyed};
use std::num::NonZeroU32;

/// Smooths outbound calls to one provider so bursts never exceed its
/// requests/minute allowance.
///
/// Each provider client owns its own throttle; waiting on one provider
/// never delays the others.
pub struct ProviderThrottle {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl ProviderThrottle {
    /// Creates a throttle allowing `rpm` requests per minute (minimum 1).
    pub fn per_minute(rpm: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(rpm.max(1)).unwrap());

        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Waits until the next request is allowed.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Non-blocking permit check. Used by tests and the probe path.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_within_quota_allowed() {
        let throttle = ProviderThrottle::per_minute(10);

        for _ in 0..10 {
            assert!(throttle.try_acquire());
        }
    }

    #[test]
    fn test_over_quota_denied() {
        let throttle = ProviderThrottle::per_minute(3);

        for _ in 0..3 {
            assert!(throttle.try_acquire());
        }
        assert!(!throttle.try_acquire());
    }

    #[test]
    fn test_zero_rpm_clamped_to_one() {
        let throttle = ProviderThrottle::per_minute(0);
        assert!(throttle.try_acquire());
    }

    #[tokio::test]
    async fn test_acquire_returns_immediately_under_quota() {
        let throttle = ProviderThrottle::per_minute(60);
        throttle.acquire().await;
    }
}
