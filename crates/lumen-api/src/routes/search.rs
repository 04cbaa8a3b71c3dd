//! # Network Discovery Operations
//!
//! Kick off and poll network-wide bridge discovery. The work itself runs
//! on the single-flight coordinator; these handlers only translate between
//! the wire format and the coordinator's answers.

use std::sync::OnceLock;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value};

use lumen_schema::{Field, JsonType, Schema};

use crate::error::{ApiError, ErrorCode};
use crate::pipeline;
use crate::routes::bridges::summary_map;
use crate::state::AppState;

/// Build the search router.
pub fn router() -> Router<AppState> {
    Router::new().route("/bridges/search", get(poll_search).post(start_search))
}

/// `{auto_add:bool}`
fn search_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::mapping(vec![Field::required(
            "auto_add",
            Schema::exact(JsonType::Bool),
        )])
    })
}

/// POST /bridges/search — start a background discovery run.
#[utoipa::path(
    post,
    path = "/bridges/search",
    responses((status = 200, description = "Run accepted, or CURRENTLY_SEARCHING")),
    tag = "search"
)]
pub(crate) async fn start_search(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = pipeline::decode(&body, search_schema())?;
    let obj = pipeline::as_object(&data)?;
    let auto_add = pipeline::bool_field(obj, "auto_add")?;

    state.discovery.request_search(auto_add)?;
    Ok(pipeline::success_empty())
}

/// GET /bridges/search — the last completed run.
#[utoipa::path(
    get,
    path = "/bridges/search",
    responses((status = 200, description = "Last completed run, or CURRENTLY_SEARCHING")),
    tag = "search"
)]
pub(crate) async fn poll_search(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let snapshot = state.discovery.poll_status()?;
    let mut payload = Map::new();
    payload.insert(
        "finished".to_string(),
        serde_json::to_value(snapshot.completed_at).map_err(|_| ErrorCode::InvalidFormat)?,
    );
    payload.insert("bridges".to_string(), summary_map(&snapshot.bridges));
    Ok(pipeline::success(payload))
}
