//! Contains all the routes that this application can handle.

mod api;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

use crate::AppState;

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(app_state))
        .route("/health-check", get(health_check))
}

/// API - Routes nested under "/api" path
fn api_routes(app_state: AppState) -> Router {
    Router::new()
        // `OPTIONS` never gets here, the CORS layer answers it.
        .route(
            "/submit-email",
            post(api::submit_email).fallback(api::method_not_allowed),
        )
        .route("/ping", get(api::ping))
        .with_state(app_state)
}
