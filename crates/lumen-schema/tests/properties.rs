//! Property tests for the schema matcher.
//!
//! The matcher must be a pure function of `(schema, value)`: deterministic
//! across repeated calls, insensitive to object key order, and total over
//! arbitrary JSON documents.

use lumen_schema::{Field, JsonType, Schema};
use proptest::prelude::*;
use serde_json::Value;

/// Strategy producing arbitrary JSON documents, nested up to three levels.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[a-z0-9 ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 32, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// A representative schema from the API surface: the /lights body.
fn lights_schema() -> Schema {
    Schema::sequence(Schema::mapping(vec![
        Field::required("x", Schema::exact(JsonType::Int)),
        Field::required("y", Schema::exact(JsonType::Int)),
        Field::required("change", Schema::exact(JsonType::Object)),
    ]))
}

proptest! {
    #[test]
    fn matching_is_deterministic(doc in arb_json()) {
        let schema = lights_schema();
        let first = schema.matches(&doc);
        prop_assert_eq!(schema.matches(&doc), first);
        prop_assert_eq!(schema.matches(&doc), first);
    }

    #[test]
    fn exact_agrees_with_classification(doc in arb_json()) {
        let t = JsonType::of(&doc);
        prop_assert!(Schema::exact(t).matches(&doc));
        prop_assert!(Schema::union([t]).matches(&doc));
    }

    #[test]
    fn union_is_order_insensitive(doc in arb_json()) {
        let a = Schema::union([JsonType::String, JsonType::Null, JsonType::Int]);
        let b = Schema::union([JsonType::Int, JsonType::String, JsonType::Null]);
        prop_assert_eq!(a.matches(&doc), b.matches(&doc));
    }

    #[test]
    fn key_order_never_affects_mapping(x in any::<i64>(), y in any::<i64>()) {
        let schema = Schema::mapping(vec![
            Field::required("x", Schema::exact(JsonType::Int)),
            Field::optional("y", Schema::exact(JsonType::Int)),
        ]);
        let forward: Value =
            serde_json::from_str(&format!(r#"{{"x": {x}, "y": {y}}}"#)).unwrap();
        let reversed: Value =
            serde_json::from_str(&format!(r#"{{"y": {y}, "x": {x}}}"#)).unwrap();
        prop_assert_eq!(schema.matches(&forward), schema.matches(&reversed));
        prop_assert!(schema.matches(&forward));
    }

    #[test]
    fn sequence_of_valid_elements_matches(xs in prop::collection::vec(any::<i64>(), 0..12)) {
        let schema = Schema::sequence(Schema::exact(JsonType::Int));
        let doc = Value::from(xs);
        prop_assert!(schema.matches(&doc));
    }
}
