//! # Request Pipeline
//!
//! Every mutating endpoint runs the same fixed stage order:
//!
//! 1. **Parse** — the raw body is decoded as UTF-8 ([`ErrorCode::NotUnicode`])
//!    and then as JSON ([`ErrorCode::InvalidJson`]).
//! 2. **Validate** — the document is matched against the endpoint's
//!    [`Schema`] ([`ErrorCode::InvalidFormat`]; deliberately no detail on
//!    which field failed).
//! 3. **Dispatch** — the handler body runs with the validated document and
//!    any path parameters, returning a payload or an [`ApiError`].
//! 4. **Encode** — success payloads are merged with `"state": "success"`
//!    and written as JSON; errors encode via their `IntoResponse` impl.
//!    Both use the same transport status.
//!
//! An earlier stage's failure short-circuits the later stages. Read
//! endpoints skip stages 1–2 entirely.
//!
//! The accessor helpers at the bottom pull typed fields out of a validated
//! document without `unwrap`: after stage 2 the shapes are guaranteed, but
//! the helpers stay total and fall back to [`ErrorCode::InvalidFormat`].

use axum::Json;
use serde_json::{Map, Value};

use lumen_schema::Schema;

use crate::error::{ApiError, ErrorCode};

/// Stage 1: UTF-8 then JSON.
pub fn parse(body: &[u8]) -> Result<Value, ApiError> {
    let text = std::str::from_utf8(body).map_err(|_| ErrorCode::NotUnicode)?;
    let value = serde_json::from_str(text).map_err(|_| ErrorCode::InvalidJson)?;
    Ok(value)
}

/// Stage 2: structural schema match.
pub fn validate(value: Value, schema: &Schema) -> Result<Value, ApiError> {
    if schema.matches(&value) {
        Ok(value)
    } else {
        tracing::debug!("request body failed schema validation");
        Err(ErrorCode::InvalidFormat.into())
    }
}

/// Stages 1 and 2 composed.
pub fn decode(body: &[u8], schema: &Schema) -> Result<Value, ApiError> {
    validate(parse(body)?, schema)
}

/// Stage 4 for success payloads: merge `"state": "success"` into the body.
pub fn success(mut payload: Map<String, Value>) -> Json<Value> {
    payload.insert("state".to_string(), Value::from("success"));
    Json(Value::Object(payload))
}

/// A bare `{"state": "success"}` body.
pub fn success_empty() -> Json<Value> {
    success(Map::new())
}

// -- Typed accessors over validated documents ---------------------------------

/// View a validated document as an object.
pub fn as_object(value: &Value) -> Result<&Map<String, Value>, ApiError> {
    value.as_object().ok_or_else(|| ErrorCode::InvalidFormat.into())
}

/// View a validated document as an array.
pub fn as_array(value: &Value) -> Result<&Vec<Value>, ApiError> {
    value.as_array().ok_or_else(|| ErrorCode::InvalidFormat.into())
}

/// Required integer field.
pub fn int_field(obj: &Map<String, Value>, key: &str) -> Result<i64, ApiError> {
    obj.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| ErrorCode::InvalidFormat.into())
}

/// Required string field.
pub fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str, ApiError> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ErrorCode::InvalidFormat.into())
}

/// Required boolean field.
pub fn bool_field(obj: &Map<String, Value>, key: &str) -> Result<bool, ApiError> {
    obj.get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| ErrorCode::InvalidFormat.into())
}

/// Required object-valued field.
pub fn object_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Map<String, Value>, ApiError> {
    obj.get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| ErrorCode::InvalidFormat.into())
}

/// Optional string field; absent and `null` both read as `None`.
pub fn opt_str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_schema::{Field, JsonType};
    use serde_json::json;

    fn lights_schema() -> Schema {
        Schema::sequence(Schema::mapping(vec![
            Field::required("x", Schema::exact(JsonType::Int)),
            Field::required("y", Schema::exact(JsonType::Int)),
            Field::required("change", Schema::exact(JsonType::Object)),
        ]))
    }

    #[test]
    fn parse_rejects_invalid_utf8() {
        let err = parse(&[0xff, 0xfe, 0x80]).unwrap_err();
        assert_eq!(err.errorcode, "NOT_UNICODE");
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let err = parse(b"{not json").unwrap_err();
        assert_eq!(err.errorcode, "INVALID_JSON");
        let err = parse(b"").unwrap_err();
        assert_eq!(err.errorcode, "INVALID_JSON");
    }

    #[test]
    fn utf8_failure_wins_over_json_failure() {
        // Malformed bytes never reach the JSON stage.
        let err = decode(&[0xc3, 0x28], &lights_schema()).unwrap_err();
        assert_eq!(err.errorcode, "NOT_UNICODE");
    }

    #[test]
    fn decode_rejects_schema_mismatch() {
        let body = br#"[{"x": "0", "y": 0, "change": {}}]"#;
        let err = decode(body, &lights_schema()).unwrap_err();
        assert_eq!(err.errorcode, "INVALID_FORMAT");
    }

    #[test]
    fn decode_accepts_valid_document() {
        let body = br#"[{"x": 0, "y": 1, "change": {"on": true}}]"#;
        let value = decode(body, &lights_schema()).unwrap();
        assert_eq!(value[0]["y"], json!(1));
    }

    #[test]
    fn success_merges_state_field() {
        let mut payload = Map::new();
        payload.insert("username".to_string(), json!("tester"));
        let Json(body) = success(payload);
        assert_eq!(body["state"], "success");
        assert_eq!(body["username"], "tester");
    }

    #[test]
    fn success_round_trips_through_wire_format() {
        let mut payload = Map::new();
        payload.insert("bridges".to_string(), json!({"00aabbccddee": {"lights": 3}}));
        let Json(body) = success(payload);
        let encoded = serde_json::to_string(&body).unwrap();
        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn accessors_read_validated_fields() {
        let doc = json!({"ip": "192.0.2.1", "auto_add": true, "lamp": 3, "change": {}});
        let obj = as_object(&doc).unwrap();
        assert_eq!(str_field(obj, "ip").unwrap(), "192.0.2.1");
        assert!(bool_field(obj, "auto_add").unwrap());
        assert_eq!(int_field(obj, "lamp").unwrap(), 3);
        assert!(object_field(obj, "change").unwrap().is_empty());
        assert_eq!(opt_str_field(obj, "missing"), None);
    }

    #[test]
    fn accessors_fail_closed() {
        let doc = json!({"ip": 5});
        let obj = as_object(&doc).unwrap();
        assert_eq!(str_field(obj, "ip").unwrap_err().errorcode, "INVALID_FORMAT");
        assert_eq!(as_array(&doc).unwrap_err().errorcode, "INVALID_FORMAT");
    }
}
