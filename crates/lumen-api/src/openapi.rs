//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lumen Grid API",
        version = "0.3.1",
        description = "HTTP control plane for a grid of lighting fixtures driven through vendor bridges.",
        license(name = "MIT")
    ),
    paths(
        // Lights
        crate::routes::lights::set_lights,
        crate::routes::lights::set_all_lights,
        // Bridges
        crate::routes::bridges::list_bridges,
        crate::routes::bridges::add_bridge,
        crate::routes::bridges::update_bridge,
        crate::routes::bridges::remove_bridge,
        crate::routes::bridges::lamp_search,
        crate::routes::bridges::add_user,
        crate::routes::bridges::set_bridge_lights,
        crate::routes::bridges::set_bridge_group,
        crate::routes::bridges::save_bridges,
        // Grid
        crate::routes::grid::get_grid,
        crate::routes::grid::set_grid,
        crate::routes::grid::save_grid,
        // Search
        crate::routes::search::start_search,
        crate::routes::search::poll_search,
    ),
    components(schemas(
        crate::error::ApiError,
        crate::discovery::DiscoverySnapshot,
        crate::routes::bridges::BridgeSummary,
        lumen_backend::BridgeSnapshot,
        lumen_backend::GridCell,
        lumen_backend::GridLayout,
    )),
    tags(
        (name = "lights", description = "Coordinate-addressed light changes"),
        (name = "bridges", description = "Bridge registry and per-bridge commands"),
        (name = "grid", description = "Logical grid layout"),
        (name = "search", description = "Network-wide bridge discovery"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
