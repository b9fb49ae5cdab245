use std::sync::Arc;

use anyhow::Result;

use crate::core::AppConfig;
use crate::rsvp::RsvpService;
use crate::rsvp::pending::PendingQueue;
use crate::rsvp::rate_limit::RateLimiter;
use crate::rsvp::sheet::SheetClient;

pub struct AppState {
    pub config: AppConfig,
    // Long-lived, shared by every request and background job
    pub rsvp: RsvpService,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        let sheet = config
            .sheet_api_url
            .as_deref()
            .map(|url| SheetClient::new(url, config.upstream_timeout, config.retry.clone()))
            .transpose()?;
        let pending = PendingQueue::new(config.pending_capacity);

        Ok(Self {
            rsvp: RsvpService::new(limiter, sheet, pending),
            config,
        })
    }
}
