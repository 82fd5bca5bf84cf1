//! Tests for the serialization contract
//!
//! The expression tree encodes as a tagged sum
//! `{ "case": <Name>, "value": <payload> }`; schemas travel as their
//! own serde form (the reified schema AST). Round-trips must preserve
//! structural equality.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use maplit::btreemap;

use super::helpers::{eval_ok, eval_typed, roundtrip_and_eval};
use crate::remote::builders::{
    add, branch, fn1, ignore, iterate, lazy, less_than_equal, nested, remote, tuple3,
};
use crate::remote::context::InMemoryRemoteContext;
use crate::remote::eval::eval_dynamic;
use crate::remote::types::expr::{expression_schema, Expression};
use crate::remote::types::numeric::NumericType;
use crate::schema::{DynamicValue, Schema, SchemaAndValue};

/* ===================== Wire shape ===================== */

#[test]
fn test_literal_wire_shape() {
    let json = serde_json::to_value(&remote(&true)).unwrap();
    assert_eq!(json["case"], "Literal");
    assert!(json["value"]["schema"].is_object());
    assert!(json["value"]["value"].is_object());
}

#[test]
fn test_operator_case_names_are_stable() {
    let add_json = serde_json::to_value(&add(remote(&1), remote(&2), NumericType::Int)).unwrap();
    assert_eq!(add_json["case"], "AddNumeric");
    assert_eq!(add_json["value"]["numeric"], "Int");

    let tuple_json =
        serde_json::to_value(&tuple3(remote(&1), remote(&2), remote(&3))).unwrap();
    assert_eq!(tuple_json["case"], "Tuple3");
    assert!(tuple_json["value"].is_array());
}

#[test]
fn test_schema_encodes_as_reified_ast() {
    let schema = Schema::option(Schema::pair(Schema::INT, Schema::STRING));
    let json = serde_json::to_value(&schema).unwrap();
    assert_eq!(json["type"], "Option");
    let decoded: Schema = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, schema);
}

/* ===================== Expression round-trips ===================== */

// Every helper-driven test already round-trips its expression; these
// cover trees that exercise every payload kind in one place.

#[test]
fn test_ignore_is_unit() {
    assert_eq!(eval_typed::<()>(&ignore()), ());
}

#[test]
fn test_roundtrip_of_composite_expression() {
    let expr = branch(
        less_than_equal(remote(&1), remote(&2)),
        add(remote(&1), remote(&2), NumericType::Int),
        remote(&0),
    )
    .unwrap();
    assert_eq!(eval_typed::<i32>(&expr), 3);
}

#[test]
fn test_roundtrip_of_function_and_iteration() {
    let expr = iterate(
        remote(&0),
        fn1(Schema::INT, |x| add(x, remote(&3), NumericType::Int)),
        fn1(Schema::INT, |x| less_than_equal(x, remote(&8))),
    );
    let json = serde_json::to_string(&expr).unwrap();
    let decoded: Expression = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, expr);
    assert_eq!(eval_typed::<i32>(&decoded), 9);
}

#[test]
fn test_roundtrip_preserves_temporal_literals() {
    let instant = chrono::DateTime::from_timestamp(1_000, 500).unwrap();
    let duration = chrono::TimeDelta::seconds(90) + chrono::TimeDelta::nanoseconds(250);
    let expr = tuple3(remote(&instant), remote(&duration), remote(&'x'));
    assert_eq!(
        eval_typed::<(chrono::DateTime<chrono::Utc>, chrono::TimeDelta, char)>(&expr),
        (instant, duration, 'x')
    );
}

#[test]
fn test_roundtrip_preserves_map_and_set_literals() {
    let map: BTreeMap<String, i64> = btreemap! {
        "one".to_string() => 1,
        "two".to_string() => 2,
    };
    assert_eq!(eval_typed::<BTreeMap<String, i64>>(&remote(&map)), map);
}

/* ===================== Value round-trips ===================== */

#[test]
fn test_value_roundtrip_through_dynamic() {
    let value = (1, "two".to_string(), Some(3i64));
    let lifted = SchemaAndValue::of(&value);
    lifted.check().unwrap();
    assert_eq!(lifted.into_typed::<(i32, String, Option<i64>)>().unwrap(), value);
}

#[test]
fn test_literal_evaluates_to_its_own_pair() {
    let value = vec![true, false];
    let result = eval_ok(&remote(&value));
    assert_eq!(result, SchemaAndValue::of(&value));
}

#[test]
fn test_schema_and_value_serde_roundtrip() {
    let pair = SchemaAndValue::of(&(chrono::TimeDelta::seconds(5), 1i64));
    let json = serde_json::to_string(&pair).unwrap();
    let decoded: SchemaAndValue = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, pair);
}

/* ===================== Nested ===================== */

#[test]
fn test_nested_lifts_a_blueprint_to_a_value() {
    let inner = add(remote(&1), remote(&2), NumericType::Int);
    let result = eval_ok(&nested(inner.clone()));
    assert_eq!(result.schema, expression_schema());
    assert_eq!(Expression::from_dynamic(&result.value).unwrap(), inner);
}

/* ===================== Lazy ===================== */

#[test]
fn test_lazy_defers_and_caches() {
    let forced = Arc::new(AtomicUsize::new(0));
    let counter = forced.clone();
    let expr = lazy(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        remote(&7)
    });
    assert_eq!(forced.load(Ordering::SeqCst), 0);

    let mut ctx = InMemoryRemoteContext::new();
    assert_eq!(
        eval_dynamic(&expr, &mut ctx).unwrap().value,
        DynamicValue::int(7)
    );
    assert_eq!(
        eval_dynamic(&expr, &mut ctx).unwrap().value,
        DynamicValue::int(7)
    );
    // The thunk ran exactly once across both evaluations
    assert_eq!(forced.load(Ordering::SeqCst), 1);
}

#[test]
fn test_lazy_serializes_its_forced_form() {
    let expr = lazy(|| add(remote(&2), remote(&3), NumericType::Int));
    let result = roundtrip_and_eval(&expr).unwrap();
    assert_eq!(result.value, DynamicValue::int(5));
}
