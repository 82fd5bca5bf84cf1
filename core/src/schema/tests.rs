//! Tests for the schema model and dynamic values

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::EvalError;
use crate::remote::types::expr::register_expression_transform;
use crate::schema::{
    DynamicValue, PrimitiveValue, Schema, SchemaAndValue, SchemaCase, SchemaField, SchemaValue,
    StandardType, TransformRegistry,
};

fn person_schema() -> Schema {
    Schema::Record {
        name: "Person".to_string(),
        fields: vec![
            SchemaField {
                name: "name".to_string(),
                schema: Schema::STRING,
            },
            SchemaField {
                name: "age".to_string(),
                schema: Schema::INT,
            },
        ],
    }
}

fn person(name: &str, age: i32) -> DynamicValue {
    DynamicValue::Record {
        name: "Person".to_string(),
        fields: vec![
            ("name".to_string(), DynamicValue::string(name)),
            ("age".to_string(), DynamicValue::int(age)),
        ],
    }
}

/* ===================== Structural equality ===================== */

#[test]
fn test_structural_equality_compares_shape() {
    assert_eq!(
        Schema::pair(Schema::INT, Schema::BOOL),
        Schema::pair(Schema::INT, Schema::BOOL)
    );
    assert_ne!(
        Schema::pair(Schema::INT, Schema::BOOL),
        Schema::pair(Schema::BOOL, Schema::INT)
    );
}

#[test]
fn test_structural_equality_includes_field_names() {
    let renamed = Schema::Record {
        name: "Person".to_string(),
        fields: vec![
            SchemaField {
                name: "full_name".to_string(),
                schema: Schema::STRING,
            },
            SchemaField {
                name: "age".to_string(),
                schema: Schema::INT,
            },
        ],
    };
    assert_ne!(person_schema(), renamed);
}

#[test]
fn test_erased_strips_transform_layers() {
    let wrapped = Schema::transform("Wrapper", Schema::option(Schema::transform("Inner", Schema::INT)));
    assert_eq!(wrapped.erased(), Schema::option(Schema::INT));
}

/* ===================== Tuples ===================== */

#[test]
fn test_tuple_of_right_nests() {
    let schema = Schema::tuple_of(vec![Schema::INT, Schema::BOOL, Schema::STRING]);
    assert_eq!(
        schema,
        Schema::pair(Schema::INT, Schema::pair(Schema::BOOL, Schema::STRING))
    );
    assert_eq!(schema.tuple_arity(), 3);
}

#[test]
fn test_tuple_component_counts_leaves_from_left() {
    let schema = Schema::tuple_of(vec![Schema::INT, Schema::BOOL, Schema::STRING]);
    assert_eq!(schema.tuple_component(0), Some(&Schema::INT));
    assert_eq!(schema.tuple_component(1), Some(&Schema::BOOL));
    assert_eq!(schema.tuple_component(2), Some(&Schema::STRING));
    assert_eq!(schema.tuple_component(3), None);
}

/* ===================== Well-formedness ===================== */

#[test]
fn test_check_accepts_matching_record() {
    person("ada", 36).check(&person_schema()).unwrap();
}

#[test]
fn test_check_rejects_wrong_primitive() {
    let err = DynamicValue::bool(true).check(&Schema::INT).unwrap_err();
    assert!(matches!(err, EvalError::BadShape(_)));
}

#[test]
fn test_check_rejects_unknown_enum_case() {
    let schema = Schema::Enum {
        name: "Color".to_string(),
        cases: vec![
            SchemaCase {
                name: "Red".to_string(),
                schema: Schema::UNIT,
            },
            SchemaCase {
                name: "Green".to_string(),
                schema: Schema::UNIT,
            },
        ],
    };
    let value = DynamicValue::enum_case("Blue", DynamicValue::UNIT);
    assert!(matches!(
        value.check(&schema).unwrap_err(),
        EvalError::BadShape(_)
    ));
}

#[test]
fn test_check_strips_transform_layers() {
    let schema = Schema::transform("Tagged", Schema::INT);
    DynamicValue::int(3).check(&schema).unwrap();
}

#[test]
fn test_check_against_fail_schema_fails() {
    let err = DynamicValue::int(3)
        .check(&Schema::fail("no schema"))
        .unwrap_err();
    assert!(matches!(err, EvalError::BadShape(_)));
}

/* ===================== Default ordering ===================== */

#[test]
fn test_primitive_ordering() {
    assert_eq!(
        DynamicValue::int(1).compare(&DynamicValue::int(2)).unwrap(),
        Ordering::Less
    );
    assert_eq!(
        DynamicValue::string("b")
            .compare(&DynamicValue::string("a"))
            .unwrap(),
        Ordering::Greater
    );
}

#[test]
fn test_float_ordering_is_total() {
    let nan = DynamicValue::Primitive(PrimitiveValue::Double(f64::NAN));
    let one = DynamicValue::Primitive(PrimitiveValue::Double(1.0));
    // total_cmp puts NaN above every number
    assert_eq!(one.compare(&nan).unwrap(), Ordering::Less);
    assert_eq!(nan.compare(&nan).unwrap(), Ordering::Equal);
}

#[test]
fn test_tuple_ordering_is_lexicographic() {
    let a = DynamicValue::pair(DynamicValue::int(1), DynamicValue::int(9));
    let b = DynamicValue::pair(DynamicValue::int(2), DynamicValue::int(0));
    assert_eq!(a.compare(&b).unwrap(), Ordering::Less);
}

#[test]
fn test_option_ordering_puts_none_first() {
    let none = DynamicValue::None;
    let some = DynamicValue::some(DynamicValue::int(0));
    assert_eq!(none.compare(&some).unwrap(), Ordering::Less);
}

#[test]
fn test_either_ordering_puts_left_first() {
    let left = DynamicValue::left(DynamicValue::int(9));
    let right = DynamicValue::right(DynamicValue::int(0));
    assert_eq!(left.compare(&right).unwrap(), Ordering::Less);
}

#[test]
fn test_enum_ordering_by_case_then_payload() {
    let failure = DynamicValue::enum_case("Failure", DynamicValue::int(0));
    let success = DynamicValue::enum_case("Success", DynamicValue::int(0));
    assert_eq!(failure.compare(&success).unwrap(), Ordering::Less);

    let small = DynamicValue::enum_case("Success", DynamicValue::int(1));
    let large = DynamicValue::enum_case("Success", DynamicValue::int(2));
    assert_eq!(small.compare(&large).unwrap(), Ordering::Less);
}

#[test]
fn test_sequence_ordering_by_items_then_length() {
    let short = DynamicValue::Sequence(vec![DynamicValue::int(1)]);
    let long = DynamicValue::Sequence(vec![DynamicValue::int(1), DynamicValue::int(2)]);
    assert_eq!(short.compare(&long).unwrap(), Ordering::Less);
}

#[test]
fn test_compare_rejects_shape_mismatch() {
    let err = DynamicValue::int(1)
        .compare(&DynamicValue::None)
        .unwrap_err();
    assert!(matches!(err, EvalError::BadShape(_)));
}

/* ===================== Typed bridge ===================== */

#[test]
fn test_typed_roundtrip_of_composites() {
    let value: (Option<i32>, Vec<bool>) = (Some(3), vec![true, false]);
    let pair = SchemaAndValue::of(&value);
    pair.check().unwrap();
    assert_eq!(
        pair.into_typed::<(Option<i32>, Vec<bool>)>().unwrap(),
        value
    );
}

#[test]
fn test_narrowing_rejects_wrong_schema() {
    let pair = SchemaAndValue::of(&42i32);
    let err = pair.into_typed::<i64>().unwrap_err();
    assert!(matches!(err, EvalError::TypeMismatch { .. }));
}

#[test]
fn test_narrowing_ignores_transform_layers() {
    let pair = SchemaAndValue::new(
        Schema::transform("UserId", Schema::INT),
        DynamicValue::int(7),
    );
    assert_eq!(pair.into_typed::<i32>().unwrap(), 7);
}

/* ===================== Schema serde ===================== */

#[test]
fn test_schema_serde_roundtrip() {
    let schema = Schema::either(
        person_schema(),
        Schema::map(Schema::STRING, Schema::set(Schema::LONG)),
    );
    let json = serde_json::to_string(&schema).unwrap();
    let decoded: Schema = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, schema);
}

#[test]
fn test_transform_schema_serializes_name_and_inner_only() {
    let schema = Schema::transform("UserId", Schema::INT);
    let json = serde_json::to_value(&schema).unwrap();
    assert_eq!(json["type"], "Transform");
    assert_eq!(json["value"]["name"], "UserId");
    let decoded: Schema = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, schema);
}

/* ===================== Transform registry ===================== */

#[test]
fn test_registry_reattaches_codecs_by_name() {
    let mut registry = TransformRegistry::new();
    registry.register(
        "Doubled",
        Arc::new(|v: &DynamicValue| Ok(v.clone())),
        Arc::new(|v: &DynamicValue| Ok(v.clone())),
    );
    assert!(registry.contains("Doubled"));
    assert!(!registry.contains("Halved"));
    let codec = registry.get("Doubled").unwrap();
    let roundtripped = (codec.decode)(&DynamicValue::int(2)).unwrap();
    assert_eq!(roundtripped, DynamicValue::int(2));
}

#[test]
fn test_expression_transform_validates_encoded_blueprints() {
    let mut registry = TransformRegistry::new();
    register_expression_transform(&mut registry);
    let codec = registry.get("Expression").unwrap();

    let encoded = crate::remote::builders::remote(&1)
        .to_dynamic()
        .unwrap();
    (codec.decode)(&encoded).unwrap();

    let garbage = DynamicValue::string("not an expression");
    assert!((codec.decode)(&garbage).is_err());
}

/* ===================== Primitive tags ===================== */

#[test]
fn test_primitive_values_know_their_tags() {
    assert_eq!(DynamicValue::int(1).check(&Schema::INT).is_ok(), true);
    assert_eq!(
        PrimitiveValue::String("x".to_string()).standard_type(),
        StandardType::String
    );
    assert_eq!(
        PrimitiveValue::Throwable {
            message: "m".to_string()
        }
        .standard_type(),
        StandardType::Throwable
    );
}
