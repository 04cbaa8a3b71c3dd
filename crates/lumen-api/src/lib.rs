//! # lumen-api — HTTP Control Plane for the Light Grid
//!
//! Thin HTTP surface over a [`lumen_backend::LightingBackend`]. Fixtures
//! are addressed two ways: by coordinate through the logical grid, or
//! directly by bridge and lamp number.
//!
//! ## API Surface
//!
//! | Prefix              | Module               | Domain                     |
//! |---------------------|----------------------|----------------------------|
//! | `/lights*`          | [`routes::lights`]   | Coordinate-addressed       |
//! | `/bridges/search`   | [`routes::search`]   | Network discovery          |
//! | `/bridges*`         | [`routes::bridges`]  | Bridge registry            |
//! | `/grid*`            | [`routes::grid`]     | Logical layout             |
//!
//! ## Protocol
//!
//! Every endpoint answers HTTP 200 with a JSON body whose `state` field is
//! `"success"` or `"error"`; errors carry an `errorcode` from the taxonomy
//! in [`error`] plus a human-readable `errormessage`. Mutating endpoints
//! run the fixed [`pipeline`]: UTF-8, JSON, schema, handler.
//!
//! ## OpenAPI
//!
//! Auto-generated spec via utoipa derive macros at `/openapi.json`.

pub mod config;
pub mod discovery;
pub mod error;
pub mod openapi;
pub mod pipeline;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use crate::config::AppConfig;
pub use crate::error::{ApiError, ErrorCode};
pub use crate::state::AppState;

/// Request bodies larger than this are rejected by the transport layer.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Assemble the full application router.
///
/// Health probes (`/health/*`) are mounted outside the API routers so they
/// stay available regardless of application state.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::lights::router())
        .merge(routes::search::router())
        .merge(routes::bridges::router())
        .merge(routes::grid::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
