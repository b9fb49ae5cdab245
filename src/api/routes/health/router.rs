//! Router for the health API

use std::sync::{Arc, RwLock};

use axum::{Router, response::Json};

use super::public::HealthResponse;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Static liveness payload, does not touch the spreadsheet service
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("healthy"),
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        service: String::from("RSVP API"),
    })
}

/// Create the health router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(health_check))
}
