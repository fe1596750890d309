// src/services/rate_limit.rs
// DOCUMENTATION: Per-client throttle for anonymous write endpoints
// PURPOSE: Keep itinerary creation from being scripted against the database

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::GuideError;

pub struct WriteLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl WriteLimiter {
    /// `per_minute` of zero is treated as one
    pub fn per_minute(per_minute: u32) -> Self {
        let burst = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        Self::with_quota(Quota::per_minute(burst))
    }

    fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Forget clients whose quota has fully replenished
    pub fn retain_recent(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        let after = self.limiter.len();

        if before > after {
            log::info!(
                "Rate limiter cleanup: dropped {} idle clients ({} remaining)",
                before - after,
                after
            );
        }
    }

    /// Consume one cell for the client, RateLimitExceeded once the quota is spent
    pub fn check(&self, client: &str) -> Result<(), GuideError> {
        self.limiter.check_key(&client.to_string()).map_err(|_| {
            log::warn!("Rate limit exceeded for client {}", client);
            GuideError::RateLimitExceeded
        })
    }
}

/// Start background pruning of idle clients
/// DOCUMENTATION: Without it every address that ever wrote stays in memory
pub fn start_prune_task(limiter: Arc<WriteLimiter>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            limiter.retain_recent();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_per_client() {
        let limiter = WriteLimiter::per_minute(2);

        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(matches!(
            limiter.check("10.0.0.1"),
            Err(GuideError::RateLimitExceeded)
        ));

        // Other clients have their own bucket
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_zero_quota_still_allows_one() {
        let limiter = WriteLimiter::per_minute(0);
        assert!(limiter.check("client").is_ok());
        assert!(limiter.check("client").is_err());
    }

    #[test]
    fn test_idle_clients_are_pruned() {
        let quota = Quota::with_period(Duration::from_millis(10)).unwrap();
        let limiter = WriteLimiter::with_quota(quota);

        for i in 0..500 {
            assert!(limiter.check(&format!("10.0.{}.{}", i / 256, i % 256)).is_ok());
        }
        assert_eq!(limiter.tracked_clients(), 500);

        // A spent cell is indistinguishable from a fresh client once replenished
        std::thread::sleep(Duration::from_millis(100));
        limiter.retain_recent();
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_prune_keeps_throttled_clients() {
        let limiter = WriteLimiter::per_minute(1);
        assert!(limiter.check("busy").is_ok());

        limiter.retain_recent();
        assert_eq!(limiter.tracked_clients(), 1);
        assert!(limiter.check("busy").is_err());
    }
}
