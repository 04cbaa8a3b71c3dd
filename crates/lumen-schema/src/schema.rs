//! # Schema Grammar & Matcher
//!
//! The schema grammar mirrors the shapes the API accepts:
//!
//! - `Exact(t)` — the value's runtime type must be `t`.
//! - `Union(ts)` — the value's runtime type must be one of `ts`.
//! - `Sequence(inner)` — homogeneous array; every element matches `inner`.
//!   An empty array always passes.
//! - `Tuple(items)` — array of exactly `items.len()` elements; element *i*
//!   matches `items[i]`.
//! - `Mapping(fields)` — object; required keys must be present, present keys
//!   must be declared (no additional keys tolerated), and each present
//!   key's value matches its field schema.
//!
//! A schema is fully determined at construction time and never mutated;
//! matching is a pure function with no side effects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Runtime type of a JSON value.
///
/// A number is [`Int`](JsonType::Int) iff it is representable as `i64` or
/// `u64`; any number carrying a fractional part classifies as
/// [`Float`](JsonType::Float). Booleans are their own type and never match
/// `Int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonType {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
}

impl JsonType {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> JsonType {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    JsonType::Int
                } else {
                    JsonType::Float
                }
            }
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }
}

/// One declared key of a [`Schema::Mapping`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// The object key this field matches.
    pub key: String,
    /// Schema applied to the key's value when present.
    pub schema: Schema,
    /// Whether the key must be present.
    pub required: bool,
}

impl Field {
    /// Declare a key that must be present.
    pub fn required(key: impl Into<String>, schema: Schema) -> Self {
        Self {
            key: key.into(),
            schema,
            required: true,
        }
    }

    /// Declare a key that may be absent.
    pub fn optional(key: impl Into<String>, schema: Schema) -> Self {
        Self {
            key: key.into(),
            schema,
            required: false,
        }
    }
}

/// Recursive description of an expected JSON shape.
///
/// Structural checks (`Mapping`/`Sequence`/`Tuple`) are schema nodes, not
/// members of a [`Union`]; a union expresses alternatives between scalar
/// runtime types only (e.g. string-or-null).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Schema {
    /// Value must have exactly this runtime type.
    Exact(JsonType),
    /// Value's runtime type must be one of these.
    Union(Vec<JsonType>),
    /// Homogeneous array; every element matches the inner schema.
    Sequence(Box<Schema>),
    /// Fixed-length array; element *i* matches schema *i*.
    Tuple(Vec<Schema>),
    /// Object with a closed set of declared keys.
    Mapping(Vec<Field>),
}

impl Schema {
    /// Value must have runtime type `t`.
    pub fn exact(t: JsonType) -> Self {
        Schema::Exact(t)
    }

    /// Value's runtime type must be one of `ts`.
    pub fn union(ts: impl Into<Vec<JsonType>>) -> Self {
        Schema::Union(ts.into())
    }

    /// Homogeneous array of `inner`.
    pub fn sequence(inner: Schema) -> Self {
        Schema::Sequence(Box::new(inner))
    }

    /// Fixed-shape array.
    pub fn tuple(items: impl Into<Vec<Schema>>) -> Self {
        Schema::Tuple(items.into())
    }

    /// Object with the declared fields and no others.
    pub fn mapping(fields: impl Into<Vec<Field>>) -> Self {
        Schema::Mapping(fields.into())
    }

    /// Match a JSON value against this schema.
    ///
    /// Pure and side-effect free: repeated calls with identical inputs
    /// return identical results, and object key order never affects the
    /// outcome. The result is a single boolean — no partial-failure
    /// diagnostics are produced.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Schema::Exact(t) => JsonType::of(value) == *t,
            Schema::Union(ts) => ts.contains(&JsonType::of(value)),
            Schema::Sequence(inner) => match value.as_array() {
                Some(items) => items.iter().all(|item| inner.matches(item)),
                None => false,
            },
            Schema::Tuple(schemas) => match value.as_array() {
                Some(items) => {
                    items.len() == schemas.len()
                        && schemas.iter().zip(items).all(|(s, v)| s.matches(v))
                }
                None => false,
            },
            Schema::Mapping(fields) => match value.as_object() {
                Some(obj) => {
                    // Every present key must be declared.
                    if !obj.keys().all(|k| fields.iter().any(|f| f.key == *k)) {
                        return false;
                    }
                    // Every required key must be present.
                    if !fields
                        .iter()
                        .filter(|f| f.required)
                        .all(|f| obj.contains_key(&f.key))
                    {
                        return false;
                    }
                    // Recurse per present key.
                    fields.iter().all(|f| match obj.get(&f.key) {
                        Some(v) => f.schema.matches(v),
                        None => true,
                    })
                }
                None => false,
            },
        }
    }
}
