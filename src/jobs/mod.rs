//! Periodic background work that runs alongside the server.

mod purge_rate_limits;
mod retry_pending;

use std::time::Duration;

use async_trait::async_trait;

use crate::rsvp::RsvpService;

pub use purge_rate_limits::PurgeRateLimits;
pub use retry_pending::RetryPendingSubmissions;

#[async_trait]
pub trait PeriodicJob: Send + Sync + std::fmt::Debug + 'static {
    fn interval(&self) -> Duration;

    async fn run_job(&self, service: &RsvpService);
}

/// Run `job` forever on its own task, once per interval. The first run
/// happens one interval after startup.
pub fn spawn_periodic_job<J: PeriodicJob>(service: RsvpService, job: J) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(job.interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            tracing::debug!("Running job {:?}", job);
            job.run_job(&service).await;
        }
    });
}
