//! Tests for the numeric and fractional operator families

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use super::helpers::{eval_err, eval_typed};
use crate::error::{ArithmeticCause, EvalError};
use crate::remote::builders::{
    abs, add, asin, atan, ceil, div, floor, log, max, min, modulo, mul, neg, pow, remote, root,
    round, sin, sub,
};
use crate::remote::types::numeric::{FractionalType, NumericType};

/* ===================== Integer instances ===================== */

#[test]
fn test_add_int() {
    assert_eq!(
        eval_typed::<i32>(&add(remote(&1), remote(&2), NumericType::Int)),
        3
    );
}

#[test]
fn test_sub_long() {
    assert_eq!(
        eval_typed::<i64>(&sub(remote(&10i64), remote(&3i64), NumericType::Long)),
        7
    );
}

#[test]
fn test_mul_short() {
    assert_eq!(
        eval_typed::<i16>(&mul(remote(&6i16), remote(&7i16), NumericType::Short)),
        42
    );
}

#[test]
fn test_div_truncates_toward_zero() {
    assert_eq!(
        eval_typed::<i32>(&div(remote(&7), remote(&2), NumericType::Int)),
        3
    );
    assert_eq!(
        eval_typed::<i32>(&div(remote(&-7), remote(&2), NumericType::Int)),
        -3
    );
}

#[test]
fn test_div_by_zero_fails() {
    let err = eval_err(&div(remote(&1), remote(&0), NumericType::Int));
    assert_eq!(err, EvalError::Arithmetic(ArithmeticCause::DivideByZero));
}

#[test]
fn test_mod_computes_modulo() {
    // The remainder operation, not addition
    assert_eq!(
        eval_typed::<i32>(&modulo(remote(&10), remote(&3), NumericType::Int)),
        1
    );
    assert_eq!(
        eval_typed::<i32>(&modulo(remote(&9), remote(&3), NumericType::Int)),
        0
    );
}

#[test]
fn test_mod_by_zero_fails() {
    let err = eval_err(&modulo(remote(&1), remote(&0), NumericType::Int));
    assert_eq!(err, EvalError::Arithmetic(ArithmeticCause::DivideByZero));
}

#[test]
fn test_add_overflow_fails() {
    let err = eval_err(&add(remote(&i32::MAX), remote(&1), NumericType::Int));
    assert_eq!(err, EvalError::Arithmetic(ArithmeticCause::Overflow));
}

#[test]
fn test_neg_and_abs() {
    assert_eq!(
        eval_typed::<i32>(&neg(remote(&5), NumericType::Int)),
        -5
    );
    assert_eq!(
        eval_typed::<i32>(&abs(remote(&-5), NumericType::Int)),
        5
    );
}

#[test]
fn test_neg_overflow_fails() {
    let err = eval_err(&neg(remote(&i32::MIN), NumericType::Int));
    assert_eq!(err, EvalError::Arithmetic(ArithmeticCause::Overflow));
}

#[test]
fn test_min_max() {
    assert_eq!(
        eval_typed::<i32>(&min(remote(&3), remote(&9), NumericType::Int)),
        3
    );
    assert_eq!(
        eval_typed::<i32>(&max(remote(&3), remote(&9), NumericType::Int)),
        9
    );
}

#[test]
fn test_pow_int() {
    assert_eq!(
        eval_typed::<i32>(&pow(remote(&2), remote(&10), NumericType::Int)),
        1024
    );
}

#[test]
fn test_pow_negative_exponent_is_domain_error() {
    let err = eval_err(&pow(remote(&2), remote(&-1), NumericType::Int));
    assert_eq!(err, EvalError::Arithmetic(ArithmeticCause::Domain));
}

#[test]
fn test_root_int() {
    // Cube root of 27
    assert_eq!(
        eval_typed::<i32>(&root(remote(&27), remote(&3), NumericType::Int)),
        3
    );
}

#[test]
fn test_log_int() {
    // log2(1024)
    assert_eq!(
        eval_typed::<i32>(&log(remote(&1024), remote(&2), NumericType::Int)),
        10
    );
}

#[test]
fn test_log_of_non_positive_is_domain_error() {
    let err = eval_err(&log(remote(&0), remote(&2), NumericType::Int));
    assert_eq!(err, EvalError::Arithmetic(ArithmeticCause::Domain));
}

#[test]
fn test_floor_ceil_round_are_identity_on_integers() {
    assert_eq!(eval_typed::<i32>(&floor(remote(&7), NumericType::Int)), 7);
    assert_eq!(eval_typed::<i32>(&ceil(remote(&7), NumericType::Int)), 7);
    assert_eq!(eval_typed::<i32>(&round(remote(&7), NumericType::Int)), 7);
}

/* ===================== Instance selection ===================== */

#[test]
fn test_operand_must_match_instance() {
    // A Long literal fed to the Int instance
    let err = eval_err(&add(remote(&1i64), remote(&2i64), NumericType::Int));
    assert!(matches!(err, EvalError::TypeMismatch { .. }));
}

/* ===================== Big integers ===================== */

#[test]
fn test_bigint_mul_does_not_overflow() {
    let a = BigInt::from(i64::MAX);
    let expr = mul(remote(&a), remote(&a), NumericType::BigInt);
    let expected = BigInt::from(i64::MAX) * BigInt::from(i64::MAX);
    assert_eq!(eval_typed::<BigInt>(&expr), expected);
}

#[test]
fn test_bigint_div_by_zero_fails() {
    let err = eval_err(&div(
        remote(&BigInt::from(1)),
        remote(&BigInt::from(0)),
        NumericType::BigInt,
    ));
    assert_eq!(err, EvalError::Arithmetic(ArithmeticCause::DivideByZero));
}

/* ===================== Floats ===================== */

#[test]
fn test_double_arithmetic() {
    assert_eq!(
        eval_typed::<f64>(&add(remote(&1.5), remote(&2.25), NumericType::Double)),
        3.75
    );
    assert_eq!(
        eval_typed::<f64>(&floor(remote(&2.9), NumericType::Double)),
        2.0
    );
    assert_eq!(
        eval_typed::<f64>(&ceil(remote(&2.1), NumericType::Double)),
        3.0
    );
    assert_eq!(
        eval_typed::<f64>(&round(remote(&2.5), NumericType::Double)),
        3.0
    );
}

#[test]
fn test_float_div_follows_ieee() {
    // Floats keep IEEE semantics: no divide-by-zero error
    let result = eval_typed::<f64>(&div(remote(&1.0), remote(&0.0), NumericType::Double));
    assert!(result.is_infinite());
}

#[test]
fn test_double_root() {
    let result = eval_typed::<f64>(&root(remote(&2.0), remote(&2.0), NumericType::Double));
    assert!((result - std::f64::consts::SQRT_2).abs() < 1e-12);
}

/* ===================== Big decimals ===================== */

#[test]
fn test_bigdecimal_add_is_exact() {
    let a: BigDecimal = "0.1".parse().unwrap();
    let b: BigDecimal = "0.2".parse().unwrap();
    let expected: BigDecimal = "0.3".parse().unwrap();
    assert_eq!(
        eval_typed::<BigDecimal>(&add(remote(&a), remote(&b), NumericType::BigDecimal)),
        expected
    );
}

#[test]
fn test_bigdecimal_floor_and_ceil() {
    let v: BigDecimal = "2.5".parse().unwrap();
    let floor_expected: BigDecimal = "2".parse().unwrap();
    let ceil_expected: BigDecimal = "3".parse().unwrap();
    assert_eq!(
        eval_typed::<BigDecimal>(&floor(remote(&v), NumericType::BigDecimal)),
        floor_expected
    );
    assert_eq!(
        eval_typed::<BigDecimal>(&ceil(remote(&v), NumericType::BigDecimal)),
        ceil_expected
    );
}

/* ===================== Fractional ===================== */

#[test]
fn test_sin_double() {
    let result = eval_typed::<f64>(&sin(remote(&0.0), FractionalType::Double));
    assert_eq!(result, 0.0);
}

#[test]
fn test_asin_double() {
    let result = eval_typed::<f64>(&asin(remote(&1.0), FractionalType::Double));
    assert!((result - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
}

#[test]
fn test_asin_out_of_domain_fails() {
    let err = eval_err(&asin(remote(&2.0), FractionalType::Double));
    assert_eq!(err, EvalError::Arithmetic(ArithmeticCause::Domain));
}

#[test]
fn test_atan_float() {
    let result = eval_typed::<f32>(&atan(remote(&0.0f32), FractionalType::Float));
    assert_eq!(result, 0.0);
}
