//! Router for the RSVP API

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode};

use super::public::{RsvpRequest, RsvpResponse};
use crate::api::routes::health::health_check;
use crate::api::state::AppState;
use crate::rsvp::rate_limit::client_id;
use crate::rsvp::{Outcome, RsvpError};

type SharedState = Arc<RwLock<AppState>>;

/// Accept an RSVP from the invitation page
async fn submit_rsvp(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<RsvpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RsvpResponse>), RsvpError> {
    let service = state.read().expect("Unable to read shared state").rsvp.clone();
    let client = client_id(&headers);

    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            // Throttle garbage the same as everything else
            service.check_rate(&client)?;
            return Err(RsvpError::Unknown(anyhow!(
                "Unreadable RSVP body: {}",
                rejection.body_text()
            )));
        }
    };

    let outcome = service.submit(&client, payload).await?;
    let status = match outcome {
        Outcome::Forwarded(_) => StatusCode::OK,
        Outcome::Pending(_) => StatusCode::ACCEPTED,
    };

    Ok((status, Json(RsvpResponse::from(&outcome))))
}

/// Create the RSVP router
pub fn router() -> Router<SharedState> {
    Router::new().route(
        "/",
        axum::routing::post(submit_rsvp).get(health_check),
    )
}
