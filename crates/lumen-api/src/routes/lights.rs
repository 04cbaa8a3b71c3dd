//! # Grid-Addressed Light Operations
//!
//! Changes fixtures by grid coordinate. Coordinate problems (outside the
//! layout, no bridge registered for a cell) are logged and skipped so one
//! bad coordinate never voids the rest of a batch; the batch is committed
//! as a whole afterwards.

use std::sync::OnceLock;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use lumen_backend::GridError;
use lumen_schema::{Field, JsonType, Schema};

use crate::error::ApiError;
use crate::pipeline;
use crate::state::AppState;

/// Build the lights router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lights", post(set_lights))
        .route("/lights/all", post(set_all_lights))
}

/// `[{x:int, y:int, change:object}]`
fn change_list_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::sequence(Schema::mapping(vec![
            Field::required("x", Schema::exact(JsonType::Int)),
            Field::required("y", Schema::exact(JsonType::Int)),
            Field::required("change", Schema::exact(JsonType::Object)),
        ]))
    })
}

/// Any JSON object.
fn any_change_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| Schema::exact(JsonType::Object))
}

/// POST /lights — change fixtures per coordinate.
#[utoipa::path(
    post,
    path = "/lights",
    responses((status = 200, description = "State field reports success or an error code")),
    tag = "lights"
)]
pub(crate) async fn set_lights(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = pipeline::decode(&body, change_list_schema())?;
    for item in pipeline::as_array(&data)? {
        let obj = pipeline::as_object(item)?;
        let x = pipeline::int_field(obj, "x")?;
        let y = pipeline::int_field(obj, "y")?;
        let change = pipeline::object_field(obj, "change")?;
        match state.backend.set_state(x, y, change) {
            Ok(()) => {}
            Err(err @ GridError::NoBridgeAtCoordinate { .. }) => {
                tracing::warn!(x, y, error = %err, "no bridge for coordinate, skipping");
            }
            Err(err @ GridError::OutsideGrid { .. }) => {
                tracing::warn!(x, y, error = %err, "coordinate outside grid, skipping");
            }
        }
    }
    state.backend.commit();
    Ok(pipeline::success_empty())
}

/// POST /lights/all — broadcast one change to the whole grid.
#[utoipa::path(
    post,
    path = "/lights/all",
    responses((status = 200, description = "State field reports success or an error code")),
    tag = "lights"
)]
pub(crate) async fn set_all_lights(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = pipeline::decode(&body, any_change_schema())?;
    let change = pipeline::as_object(&data)?;
    state.backend.set_all(change);
    state.backend.commit();
    Ok(pipeline::success_empty())
}
