//! # Bridge Registry Operations
//!
//! Registration, credentials, per-bridge lamp commands, and persistence of
//! the registry into the config store. All bridge-addressed routes take
//! the bridge's hardware identifier ("mac") as a path parameter and answer
//! `NO_SUCH_MAC` for unknown identifiers.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use lumen_backend::BridgeSnapshot;
use lumen_schema::{Field, JsonType, Schema};

use crate::error::{ApiError, ErrorCode};
use crate::pipeline;
use crate::state::AppState;

/// Device type presented to bridges when creating credentials.
const DEVICE_TYPE: &str = "lumen user";

/// Build the bridges router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bridges", axum::routing::get(list_bridges))
        .route("/bridges/add", post(add_bridge))
        .route("/bridges/save", post(save_bridges))
        .route("/bridges/:mac", post(update_bridge).delete(remove_bridge))
        .route("/bridges/:mac/lampsearch", post(lamp_search))
        .route("/bridges/:mac/adduser", post(add_user))
        .route("/bridges/:mac/lights", post(set_bridge_lights))
        .route("/bridges/:mac/lights/all", post(set_bridge_group))
}

/// Wire representation of one bridge, keyed by serial in response maps.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BridgeSummary {
    pub ip: String,
    pub username: Option<String>,
    pub valid_username: bool,
    pub lights: i64,
}

impl From<&BridgeSnapshot> for BridgeSummary {
    fn from(snapshot: &BridgeSnapshot) -> Self {
        Self {
            ip: snapshot.ip_address.clone(),
            username: snapshot.username.clone(),
            valid_username: snapshot.logged_in,
            lights: snapshot.lights,
        }
    }
}

/// `{serial: BridgeSummary}` map as a JSON value.
pub(crate) fn summary_map<'a>(
    bridges: impl IntoIterator<Item = &'a BridgeSnapshot>,
) -> Value {
    let map: BTreeMap<&str, BridgeSummary> = bridges
        .into_iter()
        .map(|b| (b.serial_number.as_str(), BridgeSummary::from(b)))
        .collect();
    serde_json::to_value(map).unwrap_or_default()
}

/// `{ip:string, username?: string|null}`
fn add_bridge_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::mapping(vec![
            Field::required("ip", Schema::exact(JsonType::String)),
            Field::optional("username", Schema::union([JsonType::String, JsonType::Null])),
        ])
    })
}

/// `{username: string|null}`
fn set_username_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::mapping(vec![Field::required(
            "username",
            Schema::union([JsonType::String, JsonType::Null]),
        )])
    })
}

/// `{username?: string}`
fn add_user_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::mapping(vec![Field::optional(
            "username",
            Schema::exact(JsonType::String),
        )])
    })
}

/// `[{light:int, change:object}]`
fn light_list_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::sequence(Schema::mapping(vec![
            Field::required("light", Schema::exact(JsonType::Int)),
            Field::required("change", Schema::exact(JsonType::Object)),
        ]))
    })
}

/// Any JSON object.
fn any_change_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| Schema::exact(JsonType::Object))
}

/// GET /bridges — list registered bridges.
#[utoipa::path(
    get,
    path = "/bridges",
    responses((status = 200, description = "Bridge map keyed by serial number")),
    tag = "bridges"
)]
pub(crate) async fn list_bridges(State(state): State<AppState>) -> Json<Value> {
    let bridges = state.backend.list_bridges();
    let mut payload = Map::new();
    payload.insert("bridges".to_string(), summary_map(&bridges));
    pipeline::success(payload)
}

/// POST /bridges/add — register a bridge by address.
#[utoipa::path(
    post,
    path = "/bridges/add",
    responses((status = 200, description = "The newly registered bridge, or an error code")),
    tag = "bridges"
)]
pub(crate) async fn add_bridge(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = pipeline::decode(&body, add_bridge_schema())?;
    let obj = pipeline::as_object(&data)?;
    let ip = pipeline::str_field(obj, "ip")?;
    let username = pipeline::opt_str_field(obj, "username");

    let snapshot = state.backend.add_bridge(ip, username)?;
    let mut payload = Map::new();
    payload.insert("bridges".to_string(), summary_map([&snapshot]));
    Ok(pipeline::success(payload))
}

/// POST /bridges/{mac} — replace a bridge's credential.
#[utoipa::path(
    post,
    path = "/bridges/{mac}",
    params(("mac" = String, Path, description = "Bridge serial number")),
    responses((status = 200, description = "Echoes the credential and its validity")),
    tag = "bridges"
)]
pub(crate) async fn update_bridge(
    State(state): State<AppState>,
    Path(mac): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = pipeline::decode(&body, set_username_schema())?;
    let obj = pipeline::as_object(&data)?;
    let username = pipeline::opt_str_field(obj, "username");

    let snapshot = state.backend.set_username(&mac, username)?;
    let mut payload = Map::new();
    payload.insert("username".to_string(), Value::from(username));
    payload.insert("valid_username".to_string(), Value::from(snapshot.logged_in));
    Ok(pipeline::success(payload))
}

/// DELETE /bridges/{mac} — deregister a bridge.
#[utoipa::path(
    delete,
    path = "/bridges/{mac}",
    params(("mac" = String, Path, description = "Bridge serial number")),
    responses((status = 200, description = "State field reports success or an error code")),
    tag = "bridges"
)]
pub(crate) async fn remove_bridge(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.backend.remove_bridge(&mac)?;
    Ok(pipeline::success_empty())
}

/// POST /bridges/{mac}/lampsearch — bridge-local scan for new lamps.
#[utoipa::path(
    post,
    path = "/bridges/{mac}/lampsearch",
    params(("mac" = String, Path, description = "Bridge serial number")),
    responses((status = 200, description = "State field reports success or an error code")),
    tag = "bridges"
)]
pub(crate) async fn lamp_search(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.backend.search_lights(&mac)?;
    Ok(pipeline::success_empty())
}

/// POST /bridges/{mac}/adduser — create a credential on a bridge.
#[utoipa::path(
    post,
    path = "/bridges/{mac}/adduser",
    params(("mac" = String, Path, description = "Bridge serial number")),
    responses((status = 200, description = "The granted username, or an error code")),
    tag = "bridges"
)]
pub(crate) async fn add_user(
    State(state): State<AppState>,
    Path(mac): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = pipeline::decode(&body, add_user_schema())?;
    let obj = pipeline::as_object(&data)?;
    let username = pipeline::opt_str_field(obj, "username");

    if !state.backend.has_bridge(&mac) {
        return Err(ErrorCode::NoSuchMac.format(&[("mac", &mac)]));
    }
    match state.backend.create_user(&mac, DEVICE_TYPE, username) {
        Ok(granted) => {
            let mut payload = Map::new();
            payload.insert("username".to_string(), Value::from(granted));
            Ok(pipeline::success(payload))
        }
        Err(err @ lumen_backend::BridgeError::NoLinkButton { .. }) => Err(err.into()),
        // Anything else the bridge rejects reads as a bad credential name.
        Err(err) => {
            tracing::debug!(mac = %mac, error = %err, "create_user rejected");
            Err(ErrorCode::InvalidName.into())
        }
    }
}

/// POST /bridges/{mac}/lights — change individual lamps on one bridge.
#[utoipa::path(
    post,
    path = "/bridges/{mac}/lights",
    params(("mac" = String, Path, description = "Bridge serial number")),
    responses((status = 200, description = "State field reports success or an error code")),
    tag = "bridges"
)]
pub(crate) async fn set_bridge_lights(
    State(state): State<AppState>,
    Path(mac): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = pipeline::decode(&body, light_list_schema())?;
    if !state.backend.has_bridge(&mac) {
        return Err(ErrorCode::NoSuchMac.format(&[("mac", &mac)]));
    }
    for item in pipeline::as_array(&data)? {
        let obj = pipeline::as_object(item)?;
        let light = pipeline::int_field(obj, "light")?;
        let change = pipeline::object_field(obj, "change")?;
        state.backend.set_light(&mac, light, change)?;
    }
    Ok(pipeline::success_empty())
}

/// POST /bridges/{mac}/lights/all — group change on one bridge.
#[utoipa::path(
    post,
    path = "/bridges/{mac}/lights/all",
    params(("mac" = String, Path, description = "Bridge serial number")),
    responses((status = 200, description = "State field reports success or an error code")),
    tag = "bridges"
)]
pub(crate) async fn set_bridge_group(
    State(state): State<AppState>,
    Path(mac): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let data = pipeline::decode(&body, any_change_schema())?;
    let change = pipeline::as_object(&data)?;
    if !state.backend.has_bridge(&mac) {
        return Err(ErrorCode::NoSuchMac.format(&[("mac", &mac)]));
    }
    state.backend.set_group(&mac, 0, change)?;
    Ok(pipeline::success_empty())
}

/// POST /bridges/save — persist registered bridges to the config store.
#[utoipa::path(
    post,
    path = "/bridges/save",
    responses((status = 200, description = "State field reports success or an error code")),
    tag = "bridges"
)]
pub(crate) async fn save_bridges(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let bridges = state.backend.list_bridges();
    if let Err(err) = state.config.save_bridges(&bridges) {
        tracing::error!(path = %state.config.path().display(), error = %err, "bridge save failed");
        return Err(ErrorCode::SaveFailed.into());
    }
    Ok(pipeline::success_empty())
}
