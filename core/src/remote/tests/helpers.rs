//! Test helpers for the remote expression core
//!
//! Every evaluation helper pushes the expression through a serde
//! round-trip first and asserts the decoded tree is structurally equal
//! to the original, so the serialization contract is exercised by
//! every test. Successful evaluations additionally assert schema
//! stability: the schema component of the result must equal
//! `Expression::schema()`.

use crate::error::{EvalError, Result};
use crate::remote::context::InMemoryRemoteContext;
use crate::remote::eval::eval_dynamic;
use crate::remote::types::expr::Expression;
use crate::schema::{SchemaAndValue, SchemaValue};

/// Serde round-trip, then evaluate in a fresh in-memory context
pub fn roundtrip_and_eval(expr: &Expression) -> Result<SchemaAndValue> {
    let json = serde_json::to_string(expr).expect("expression serialization failed");
    let decoded: Expression =
        serde_json::from_str(&json).expect("expression deserialization failed");
    assert_eq!(&decoded, expr, "serde round-trip changed the expression");

    let mut ctx = InMemoryRemoteContext::new();
    eval_dynamic(&decoded, &mut ctx)
}

/// Evaluate an expression that must succeed
pub fn eval_ok(expr: &Expression) -> SchemaAndValue {
    let result = roundtrip_and_eval(expr).expect("evaluation failed");
    assert_eq!(
        result.schema,
        expr.schema(),
        "evaluation result schema diverged from the static schema"
    );
    result
}

/// Evaluate and narrow to a typed host value
pub fn eval_typed<A: SchemaValue>(expr: &Expression) -> A {
    eval_ok(expr).into_typed().expect("narrowing failed")
}

/// Evaluate an expression that must fail
pub fn eval_err(expr: &Expression) -> EvalError {
    roundtrip_and_eval(expr).expect_err("evaluation unexpectedly succeeded")
}
