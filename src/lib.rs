pub mod app;
pub mod config;
mod error;
pub mod store;
pub mod web;

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

// re-exports
pub use app::{App, AppState};
pub use error::{Error, Result};
pub use web::serve::serve;

/// Compact, time-less console logging at `debug` for local development and tests.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(EnvFilter::new("waitlist=debug,tower_http=debug"))
        .compact()
        .init();
}

/// Full console logging filtered through `RUST_LOG`, `info` if it is unset.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
