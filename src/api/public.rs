//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::calendar::CalendarError;
use crate::rsvp::RsvpError;

pub use crate::api::routes::rsvp::public::ErrorResponse;

// Messages shown to guests
const INVALID_DATA: &str = "Datos inválidos";
const TOO_MANY_REQUESTS: &str = "Demasiadas solicitudes. Por favor intenta en unos minutos.";
const CONFIGURATION_ERROR: &str = "Error de configuración del servidor";
const INTERNAL_ERROR: &str = "Error interno del servidor. Por favor intenta nuevamente.";

// Errors

pub struct ApiError(anyhow::Error);

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(INTERNAL_ERROR)),
        )
            .into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Every submission failure ends up here. Guests get a generic message,
/// the details only go to the log.
impl IntoResponse for RsvpError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RsvpError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_details(INVALID_DATA, details),
            ),
            RsvpError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse::new(TOO_MANY_REQUESTS),
            ),
            RsvpError::Configuration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(CONFIGURATION_ERROR),
            ),
            RsvpError::Upstream(reason) => {
                tracing::error!("RSVP API error: {}", reason);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(INTERNAL_ERROR),
                )
            }
            RsvpError::Unknown(err) => {
                tracing::error!("RSVP API error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(INTERNAL_ERROR),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for CalendarError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(&self.to_string())),
        )
            .into_response()
    }
}

// Re-export public types from each route

pub mod calendar {
    pub use crate::api::routes::calendar::public::*;
}

pub mod health {
    pub use crate::api::routes::health::public::*;
}

pub mod rsvp {
    pub use crate::api::routes::rsvp::public::*;
}
