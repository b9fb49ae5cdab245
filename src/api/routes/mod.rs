//! API routes module

pub mod calendar;
pub mod health;
pub mod rsvp;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // RSVP intake
        .nest("/rsvp", rsvp::router())
        // Liveness
        .nest("/health", health::router())
        // Calendar file download
        .nest("/calendar", calendar::router())
}
