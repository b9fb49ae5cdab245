use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::middleware;
use axum::{Router, extract::Request, response::Response};
use http::{HeaderValue, header};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::AppState;
use crate::core::AppConfig;
use crate::jobs::{PurgeRateLimits, RetryPendingSubmissions, spawn_periodic_job};

async fn set_static_cache_control(request: Request, next: middleware::Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

pub fn app(shared_state: Arc<RwLock<AppState>>) -> Router {
    let cors = CorsLayer::permissive();
    let static_dir = shared_state
        .read()
        .expect("Unable to read shared state")
        .config
        .static_dir
        .clone();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        // Invitation page assets
        .fallback_service(
            ServiceBuilder::new()
                .layer(middleware::from_fn(set_static_cache_control))
                .service(
                    ServeDir::new(static_dir)
                        .precompressed_br()
                        .precompressed_gzip(),
                ),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Fail at startup rather than on the first guest's submission
    let sheet_api_url = config.require_sheet_api_url()?;
    tracing::info!("Forwarding RSVPs to {}", sheet_api_url);

    let app_state = AppState::new(config)?;
    let service = app_state.rsvp.clone();
    let shared_state = Arc::new(RwLock::new(app_state));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    // Background jobs each run in their own tokio task
    spawn_periodic_job(service.clone(), RetryPendingSubmissions);
    spawn_periodic_job(service, PurgeRateLimits);

    axum::serve(listener, app).await?;

    Ok(())
}
