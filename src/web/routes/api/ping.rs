use axum::{extract::State, Json};

use crate::{
    web::data::{PingEnv, PingResponse},
    AppState,
};

/// Diagnostic endpoint: tells whether the deployment has a store credential.
pub async fn ping(State(app_state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        message: "pong",
        env: PingEnv {
            has_token: app_state.store.has_credential(),
            store: app_state.store.backend().to_string(),
            version: env!("CARGO_PKG_VERSION"),
        },
    })
}
