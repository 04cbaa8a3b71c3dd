//! # Grid Layout Operations
//!
//! Read and replace the logical grid mapping coordinates to
//! bridge-and-lamp pairs, and persist the layout to the config store. The
//! layout is row-major; rows may be ragged and width is the longest row.

use std::sync::OnceLock;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Map, Value};

use lumen_backend::GridCell;
use lumen_schema::{Field, JsonType, Schema};

use crate::error::{ApiError, ErrorCode};
use crate::pipeline;
use crate::state::AppState;

/// Build the grid router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/grid", get(get_grid).post(set_grid))
        .route("/grid/save", post(save_grid))
}

/// `[[{mac:string, lamp:int}]]`
fn grid_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::sequence(Schema::sequence(Schema::mapping(vec![
            Field::required("mac", Schema::exact(JsonType::String)),
            Field::required("lamp", Schema::exact(JsonType::Int)),
        ])))
    })
}

/// GET /grid — the current layout plus its derived dimensions.
#[utoipa::path(
    get,
    path = "/grid",
    responses((status = 200, description = "Grid rows with derived width and height")),
    tag = "grid"
)]
pub(crate) async fn get_grid(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let layout = state.backend.grid();
    let mut payload = Map::new();
    payload.insert(
        "grid".to_string(),
        serde_json::to_value(&layout.rows).map_err(|_| ErrorCode::InvalidFormat)?,
    );
    payload.insert("width".to_string(), Value::from(layout.width));
    payload.insert("height".to_string(), Value::from(layout.height));
    Ok(pipeline::success(payload))
}

/// POST /grid — replace the layout.
#[utoipa::path(
    post,
    path = "/grid",
    responses((status = 200, description = "State field reports success or an error code")),
    tag = "grid"
)]
pub(crate) async fn set_grid(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = pipeline::decode(&body, grid_schema())?;
    let mut rows = Vec::new();
    for row in pipeline::as_array(&data)? {
        let mut cells = Vec::new();
        for cell in pipeline::as_array(row)? {
            let obj = pipeline::as_object(cell)?;
            cells.push(GridCell {
                mac: pipeline::str_field(obj, "mac")?.to_string(),
                lamp: pipeline::int_field(obj, "lamp")?,
            });
        }
        rows.push(cells);
    }
    state.backend.set_grid(rows);
    Ok(pipeline::success_empty())
}

/// POST /grid/save — persist the layout to the config store.
#[utoipa::path(
    post,
    path = "/grid/save",
    responses((status = 200, description = "State field reports success or an error code")),
    tag = "grid"
)]
pub(crate) async fn save_grid(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let layout = state.backend.grid();
    if let Err(err) = state.config.save_grid(&layout) {
        tracing::error!(path = %state.config.path().display(), error = %err, "grid save failed");
        return Err(ErrorCode::SaveFailed.into());
    }
    Ok(pipeline::success_empty())
}
