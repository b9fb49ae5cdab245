//! Router for the calendar API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use http::{HeaderValue, header};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::calendar::{CalendarFile, export};

type SharedState = Arc<RwLock<AppState>>;

/// Download the selected events as an .ics file
async fn calendar_handler(Query(params): Query<public::CalendarQuery>) -> Result<Response, ApiError> {
    let file = match export(params.civil, params.lunch, chrono::Utc::now()) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!("Calendar export refused: {}", e);
            return Ok(e.into_response());
        }
    };

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.file_name))?;
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static(CalendarFile::CONTENT_TYPE),
        ),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, file.content).into_response())
}

/// Create the calendar router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(calendar_handler))
}
