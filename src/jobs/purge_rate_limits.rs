use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::PeriodicJob;
use crate::rsvp::RsvpService;

/// Drops rate limit windows that have already expired so idle clients
/// don't hold on to memory.
#[derive(Debug)]
pub struct PurgeRateLimits;

#[async_trait]
impl PeriodicJob for PurgeRateLimits {
    fn interval(&self) -> Duration {
        // Run every minute
        Duration::from_secs(60)
    }

    async fn run_job(&self, service: &RsvpService) {
        let removed = service.limiter().purge_expired(Instant::now());
        if removed > 0 {
            tracing::debug!("Purged {} expired rate limit entries", removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rsvp::pending::PendingQueue;
    use crate::rsvp::rate_limit::{RateLimitConfig, RateLimiter};

    #[tokio::test]
    async fn test_purges_expired_windows() {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            window: Duration::from_millis(1),
            ..Default::default()
        }));
        let service = RsvpService::new(limiter.clone(), None, PendingQueue::new(1));
        limiter.allow("a");
        limiter.allow("b");
        tokio::time::sleep(Duration::from_millis(20)).await;

        PurgeRateLimits.run_job(&service).await;

        assert!(limiter.is_empty());
    }
}
