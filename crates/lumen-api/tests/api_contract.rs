//! # API Contract Tests
//!
//! Exercises the HTTP surface end to end against the in-memory simulated
//! backend: the uniform success/error wire format, the decode pipeline's
//! error codes, the bridge registry, grid layout, discovery, and the save
//! endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use lumen_api::config::ConfigStore;
use lumen_api::AppState;
use lumen_backend::{BridgeSnapshot, LightingBackend};
use lumen_stub::{InMemoryBackend, StaticDiscovery};

/// Everything a test needs to drive the app and inspect its sides.
struct TestHarness {
    app: axum::Router,
    backend: InMemoryBackend,
    config_path: std::path::PathBuf,
    // Held so the config directory outlives the test body.
    _dir: tempfile::TempDir,
}

fn harness_with_discovery(discovered: Vec<BridgeSnapshot>) -> TestHarness {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    let backend = InMemoryBackend::new();
    let state = AppState::new(
        Arc::new(backend.clone()),
        Arc::new(StaticDiscovery::new(discovered)),
        ConfigStore::new(&config_path),
    );
    TestHarness {
        app: lumen_api::app(state),
        backend,
        config_path,
        _dir: dir,
    }
}

fn harness() -> TestHarness {
    harness_with_discovery(Vec::new())
}

/// A harness with one logged-in bridge at 192.0.2.1 and a 1x2 grid.
fn harness_with_bridge() -> TestHarness {
    let h = harness();
    h.backend.simulate_reachable("192.0.2.1", "00aabbccddee", 3);
    h.backend
        .add_bridge("192.0.2.1", Some("tester"))
        .expect("seeded bridge adds");
    h.backend.set_grid(vec![vec![
        lumen_backend::GridCell {
            mac: "00aabbccddee".to_string(),
            lamp: 0,
        },
        lumen_backend::GridCell {
            mac: "00aabbccddee".to_string(),
            lamp: 1,
        },
    ]]);
    h
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post_json(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Body::from(body.to_string())).await
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, Body::empty()).await
}

async fn delete(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(app, "DELETE", uri, Body::empty()).await
}

fn assert_error(status: StatusCode, body: &Value, code: &str) {
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "error");
    assert_eq!(body["errorcode"], code);
    assert!(body["errormessage"].is_string());
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn liveness_probe() {
    let h = harness();
    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/health/liveness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Decode Pipeline ----------------------------------------------------------

#[tokio::test]
async fn non_utf8_body_reports_not_unicode() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        "POST",
        "/lights",
        Body::from(vec![0xff, 0xfe, 0x80]),
    )
    .await;
    assert_error(status, &body, "NOT_UNICODE");
}

#[tokio::test]
async fn malformed_json_reports_invalid_json() {
    let h = harness();
    let (status, body) = send(&h.app, "POST", "/lights", Body::from("{not json")).await;
    assert_error(status, &body, "INVALID_JSON");
}

#[tokio::test]
async fn schema_mismatch_reports_invalid_format() {
    let h = harness();
    // x must be an integer.
    let (status, body) = post_json(
        &h.app,
        "/lights",
        json!([{"x": "0", "y": 0, "change": {}}]),
    )
    .await;
    assert_error(status, &body, "INVALID_FORMAT");

    // Undeclared key.
    let (status, body) = post_json(
        &h.app,
        "/lights",
        json!([{"x": 0, "y": 0, "change": {}, "bogus": 1}]),
    )
    .await;
    assert_error(status, &body, "INVALID_FORMAT");
}

// -- Lights -------------------------------------------------------------------

#[tokio::test]
async fn set_lights_commits_changes() {
    let h = harness_with_bridge();
    let (status, body) = post_json(
        &h.app,
        "/lights",
        json!([{"x": 0, "y": 0, "change": {"on": true}}]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(
        h.backend.lamp_state("00aabbccddee", 0).unwrap()["on"],
        json!(true)
    );
}

#[tokio::test]
async fn set_lights_skips_bad_coordinates() {
    let h = harness_with_bridge();
    // The out-of-grid entry is skipped; the valid one still lands.
    let (status, body) = post_json(
        &h.app,
        "/lights",
        json!([
            {"x": 9, "y": 9, "change": {"on": true}},
            {"x": 1, "y": 0, "change": {"on": true}},
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(
        h.backend.lamp_state("00aabbccddee", 1).unwrap()["on"],
        json!(true)
    );
}

#[tokio::test]
async fn set_all_lights_broadcasts() {
    let h = harness_with_bridge();
    let (status, body) = post_json(&h.app, "/lights/all", json!({"on": false})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    for lamp in 0..2 {
        assert_eq!(
            h.backend.lamp_state("00aabbccddee", lamp).unwrap()["on"],
            json!(false)
        );
    }
}

// -- Bridge Registry ----------------------------------------------------------

#[tokio::test]
async fn list_bridges_empty_registry() {
    let h = harness();
    let (status, body) = get(&h.app, "/bridges").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(body["bridges"], json!({}));
}

#[tokio::test]
async fn add_bridge_returns_summary_keyed_by_serial() {
    let h = harness();
    h.backend.simulate_reachable("192.0.2.1", "00aabbccddee", 3);
    let (status, body) = post_json(&h.app, "/bridges/add", json!({"ip": "192.0.2.1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    let summary = &body["bridges"]["00aabbccddee"];
    assert_eq!(summary["ip"], "192.0.2.1");
    assert_eq!(summary["username"], Value::Null);
    assert_eq!(summary["valid_username"], json!(false));
    assert_eq!(summary["lights"], json!(-1));
}

#[tokio::test]
async fn add_bridge_with_username_logs_in() {
    let h = harness();
    h.backend.simulate_reachable("192.0.2.1", "00aabbccddee", 3);
    let (_, body) = post_json(
        &h.app,
        "/bridges/add",
        json!({"ip": "192.0.2.1", "username": "tester"}),
    )
    .await;
    let summary = &body["bridges"]["00aabbccddee"];
    assert_eq!(summary["username"], "tester");
    assert_eq!(summary["valid_username"], json!(true));
    assert_eq!(summary["lights"], json!(3));
}

#[tokio::test]
async fn add_bridge_unknown_address() {
    let h = harness();
    let (status, body) = post_json(&h.app, "/bridges/add", json!({"ip": "203.0.113.7"})).await;
    assert_error(status, &body, "BRIDGE_NOT_FOUND");
    assert!(body["errormessage"]
        .as_str()
        .unwrap()
        .contains("203.0.113.7"));
}

#[tokio::test]
async fn add_bridge_twice() {
    let h = harness_with_bridge();
    let (status, body) = post_json(&h.app, "/bridges/add", json!({"ip": "192.0.2.1"})).await;
    assert_error(status, &body, "BRIDGE_ALREADY_ADDED");
}

#[tokio::test]
async fn update_bridge_username_echoes_validity() {
    let h = harness_with_bridge();
    let (status, body) = post_json(
        &h.app,
        "/bridges/00aabbccddee",
        json!({"username": "other"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(body["username"], "other");
    assert_eq!(body["valid_username"], json!(true));

    // Clearing the credential logs the bridge out.
    let (_, body) = post_json(&h.app, "/bridges/00aabbccddee", json!({"username": null})).await;
    assert_eq!(body["username"], Value::Null);
    assert_eq!(body["valid_username"], json!(false));
}

#[tokio::test]
async fn update_bridge_unknown_mac() {
    let h = harness();
    let (status, body) = post_json(
        &h.app,
        "/bridges/deadbeef0000",
        json!({"username": "tester"}),
    )
    .await;
    assert_error(status, &body, "NO_SUCH_MAC");
    assert!(body["errormessage"]
        .as_str()
        .unwrap()
        .contains("deadbeef0000"));
}

#[tokio::test]
async fn remove_bridge_then_listing_is_empty() {
    let h = harness_with_bridge();
    let (status, body) = delete(&h.app, "/bridges/00aabbccddee").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");

    let (_, body) = get(&h.app, "/bridges").await;
    assert_eq!(body["bridges"], json!({}));

    let (status, body) = delete(&h.app, "/bridges/00aabbccddee").await;
    assert_error(status, &body, "NO_SUCH_MAC");
}

#[tokio::test]
async fn lamp_search_reaches_the_bridge() {
    let h = harness_with_bridge();
    let (status, body) = post_json(&h.app, "/bridges/00aabbccddee/lampsearch", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(h.backend.lamp_search_count("00aabbccddee"), Some(1));

    let (status, body) = post_json(&h.app, "/bridges/deadbeef0000/lampsearch", json!({})).await;
    assert_error(status, &body, "NO_SUCH_MAC");
}

#[tokio::test]
async fn add_user_requires_link_button() {
    let h = harness_with_bridge();
    let (status, body) = post_json(&h.app, "/bridges/00aabbccddee/adduser", json!({})).await;
    assert_error(status, &body, "NO_LINKBUTTON");

    h.backend.press_link_button("00aabbccddee");
    let (status, body) = post_json(&h.app, "/bridges/00aabbccddee/adduser", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert!(body["username"]
        .as_str()
        .unwrap()
        .starts_with("00aabbccddee-user-"));
}

#[tokio::test]
async fn add_user_with_rejected_name() {
    let h = harness_with_bridge();
    h.backend.press_link_button("00aabbccddee");
    let (status, body) = post_json(
        &h.app,
        "/bridges/00aabbccddee/adduser",
        json!({"username": "bad\nname"}),
    )
    .await;
    assert_error(status, &body, "INVALID_NAME");
}

#[tokio::test]
async fn add_user_unknown_mac() {
    let h = harness();
    let (status, body) = post_json(&h.app, "/bridges/deadbeef0000/adduser", json!({})).await;
    assert_error(status, &body, "NO_SUCH_MAC");
}

#[tokio::test]
async fn bridge_lights_set_individual_lamps() {
    let h = harness_with_bridge();
    let (status, body) = post_json(
        &h.app,
        "/bridges/00aabbccddee/lights",
        json!([{"light": 2, "change": {"hue": 40000}}]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(
        h.backend.lamp_state("00aabbccddee", 2).unwrap()["hue"],
        json!(40000)
    );
}

#[tokio::test]
async fn bridge_lights_all_touches_every_lamp() {
    let h = harness_with_bridge();
    let (status, body) = post_json(
        &h.app,
        "/bridges/00aabbccddee/lights/all",
        json!({"on": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    for lamp in 0..3 {
        assert_eq!(
            h.backend.lamp_state("00aabbccddee", lamp).unwrap()["on"],
            json!(true)
        );
    }
}

#[tokio::test]
async fn save_bridges_persists_registry() {
    let h = harness_with_bridge();
    let (status, body) = post_json(&h.app, "/bridges/save", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");

    let stored = ConfigStore::new(&h.config_path).load_or_default().unwrap();
    assert_eq!(stored.ips, vec!["192.0.2.1"]);
    assert_eq!(stored.usernames["00aabbccddee"], "tester");
}

// -- Grid ---------------------------------------------------------------------

#[tokio::test]
async fn get_grid_reports_layout_and_dimensions() {
    let h = harness_with_bridge();
    let (status, body) = get(&h.app, "/grid").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(body["width"], json!(2));
    assert_eq!(body["height"], json!(1));
    assert_eq!(body["grid"][0][1]["lamp"], json!(1));
}

#[tokio::test]
async fn set_grid_replaces_layout() {
    let h = harness_with_bridge();
    let (status, body) = post_json(
        &h.app,
        "/grid",
        json!([[{"mac": "00aabbccddee", "lamp": 2}]]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");

    let (_, body) = get(&h.app, "/grid").await;
    assert_eq!(body["width"], json!(1));
    assert_eq!(body["grid"][0][0]["lamp"], json!(2));
}

#[tokio::test]
async fn set_grid_rejects_malformed_cells() {
    let h = harness();
    let (status, body) = post_json(&h.app, "/grid", json!([[{"mac": "a"}]])).await;
    assert_error(status, &body, "INVALID_FORMAT");
}

#[tokio::test]
async fn save_grid_persists_layout() {
    let h = harness_with_bridge();
    let (status, body) = post_json(&h.app, "/grid/save", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");

    let stored = ConfigStore::new(&h.config_path).load_or_default().unwrap();
    assert_eq!(stored.grid.len(), 1);
    assert_eq!(stored.grid[0].len(), 2);
}

// -- Discovery ----------------------------------------------------------------

#[tokio::test]
async fn poll_search_before_any_run() {
    let h = harness();
    let (status, body) = get(&h.app, "/bridges/search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(body["finished"], Value::Null);
    assert_eq!(body["bridges"], json!({}));
}

#[tokio::test]
async fn search_requires_auto_add_flag() {
    let h = harness();
    let (status, body) = post_json(&h.app, "/bridges/search", json!({})).await;
    assert_error(status, &body, "INVALID_FORMAT");
}

#[tokio::test]
async fn completed_search_reports_discovered_bridges() {
    let h = harness_with_discovery(vec![BridgeSnapshot {
        serial_number: "00aabbccddee".to_string(),
        ip_address: "192.0.2.1".to_string(),
        username: None,
        logged_in: false,
        lights: -1,
    }]);
    let (status, body) = post_json(&h.app, "/bridges/search", json!({"auto_add": false})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");

    // The scan runs in the background; poll until it publishes.
    for _ in 0..200 {
        let (_, body) = get(&h.app, "/bridges/search").await;
        if body["state"] == "success" && !body["finished"].is_null() {
            assert_eq!(body["bridges"]["00aabbccddee"]["ip"], "192.0.2.1");
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("search never finished");
}

#[tokio::test]
async fn search_with_auto_add_registers_bridges() {
    let h = harness_with_discovery(vec![BridgeSnapshot {
        serial_number: "00aabbccddee".to_string(),
        ip_address: "192.0.2.1".to_string(),
        username: None,
        logged_in: false,
        lights: -1,
    }]);
    h.backend.simulate_reachable("192.0.2.1", "00aabbccddee", 3);

    let (status, _) = post_json(&h.app, "/bridges/search", json!({"auto_add": true})).await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..200 {
        if h.backend.has_bridge("00aabbccddee") {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("bridge was never auto-added");
}

// -- Wire Format --------------------------------------------------------------

#[tokio::test]
async fn every_failure_rides_http_200() {
    let h = harness();
    let cases = [
        post_json(&h.app, "/bridges/add", json!({"ip": "203.0.113.7"})).await,
        post_json(&h.app, "/bridges/deadbeef0000", json!({"username": null})).await,
        post_json(&h.app, "/lights", json!({"not": "a list"})).await,
        send(&h.app, "POST", "/lights", Body::from("nope")).await,
    ];
    for (status, body) in cases {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "error");
    }
}

#[tokio::test]
async fn openapi_spec_is_served() {
    let h = harness();
    let (status, body) = get(&h.app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/lights"].is_object());
    assert!(body["paths"]["/bridges/search"].is_object());
}
