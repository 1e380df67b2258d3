pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::errors::AppError;
use crate::gate::GateCoordinator;
use crate::middleware::headers;

/// Slash-command bodies are a few hundred bytes.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state passed to handlers.
pub struct AppState {
    pub coordinator: Arc<GateCoordinator>,
    pub config: Config,
}

/// Builds the relay's HTTP surface.
///
/// Each path also matches with a trailing slash. A known path hit with the
/// wrong method is answered like an unknown path.
pub fn router(state: Arc<AppState>) -> Router {
    type Route = MethodRouter<Arc<AppState>>;
    let incoming = || -> Route { post(handlers::incoming).fallback(fallback_404) };
    let reset = || -> Route { post(handlers::confirm_opened).fallback(fallback_404) };
    let status = || -> Route { get(handlers::gate_status).fallback(fallback_404) };

    Router::new()
        // Slack slash command
        .route("/incoming", incoming())
        .route("/incoming/", incoming())
        // Gate controller
        .route("/api/reset", reset())
        .route("/api/reset/", reset())
        .route("/api", status())
        .route("/api/", status())
        // Liveness (no auth)
        .route("/healthz", get(|| async { "ok" }))
        .fallback(fallback_404)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(headers::request_id))
        .layer(axum::middleware::from_fn(headers::security_headers))
}

async fn fallback_404() -> AppError {
    AppError::NotFound
}
