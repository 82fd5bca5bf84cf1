//! Numeric and fractional instances
//!
//! Arithmetic in the expression algebra is parameterised by a closed
//! instance selector rather than an open trait object: the set of
//! instances is fixed by the serialization format. Each instance packs
//! the operations for one numeric type and knows its result schema.
//!
//! Integer instances use checked arithmetic (overflow and division by
//! zero are `ArithmeticError`s); float instances follow IEEE 754 for
//! the closed operations and fail with a domain error where the result
//! leaves the reals (`Log`, `Root`, `Asin`).

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{ArithmeticCause, EvalError, Result};
use crate::schema::{PrimitiveValue, Schema, StandardType};

/* ===================== Operation selectors ===================== */

/// Binary numeric operation (not serialized; the expression case name
/// carries the operation on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
    Pow,
    Root,
    Log,
}

/// Unary numeric operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericUnaryOp {
    Neg,
    Abs,
    Floor,
    Ceil,
    Round,
}

/// Unary fractional operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractionalOp {
    Sin,
    Asin,
    Atan,
}

fn arithmetic(cause: ArithmeticCause) -> EvalError {
    EvalError::Arithmetic(cause)
}

/* ===================== Numeric instances ===================== */

/// Closed set of numeric instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericType {
    Short,
    Int,
    Long,
    BigInt,
    Float,
    Double,
    BigDecimal,
}

impl NumericType {
    /// Schema of this instance's values (also the result schema of
    /// every operation of the instance)
    pub fn schema(&self) -> Schema {
        Schema::Primitive(match self {
            NumericType::Short => StandardType::Short,
            NumericType::Int => StandardType::Int,
            NumericType::Long => StandardType::Long,
            NumericType::BigInt => StandardType::BigInt,
            NumericType::Float => StandardType::Float,
            NumericType::Double => StandardType::Double,
            NumericType::BigDecimal => StandardType::BigDecimal,
        })
    }

    fn mismatch(&self, actual: &PrimitiveValue) -> EvalError {
        EvalError::mismatch(
            &self.schema(),
            &Schema::Primitive(actual.standard_type()),
        )
    }

    /// Apply a binary operation to two values of this instance
    pub fn apply_binary(
        &self,
        op: NumericBinaryOp,
        left: &PrimitiveValue,
        right: &PrimitiveValue,
    ) -> Result<PrimitiveValue> {
        use PrimitiveValue as P;
        match (self, left, right) {
            (NumericType::Short, P::Short(a), P::Short(b)) => {
                int_binary(op, *a, *b).map(P::Short)
            }
            (NumericType::Int, P::Int(a), P::Int(b)) => int_binary(op, *a, *b).map(P::Int),
            (NumericType::Long, P::Long(a), P::Long(b)) => int_binary(op, *a, *b).map(P::Long),
            (NumericType::BigInt, P::BigInt(a), P::BigInt(b)) => {
                bigint_binary(op, a, b).map(P::BigInt)
            }
            (NumericType::Float, P::Float(a), P::Float(b)) => {
                float_binary(op, *a as f64, *b as f64).map(|r| P::Float(r as f32))
            }
            (NumericType::Double, P::Double(a), P::Double(b)) => {
                float_binary(op, *a, *b).map(P::Double)
            }
            (NumericType::BigDecimal, P::BigDecimal(a), P::BigDecimal(b)) => {
                bigdecimal_binary(op, a, b).map(P::BigDecimal)
            }
            (_, l, r) => {
                if l.standard_type() != self.schema_tag() {
                    Err(self.mismatch(l))
                } else {
                    Err(self.mismatch(r))
                }
            }
        }
    }

    /// Apply a unary operation to a value of this instance
    pub fn apply_unary(&self, op: NumericUnaryOp, value: &PrimitiveValue) -> Result<PrimitiveValue> {
        use PrimitiveValue as P;
        match (self, value) {
            (NumericType::Short, P::Short(a)) => int_unary(op, *a).map(P::Short),
            (NumericType::Int, P::Int(a)) => int_unary(op, *a).map(P::Int),
            (NumericType::Long, P::Long(a)) => int_unary(op, *a).map(P::Long),
            (NumericType::BigInt, P::BigInt(a)) => Ok(P::BigInt(bigint_unary(op, a))),
            (NumericType::Float, P::Float(a)) => Ok(P::Float(float_unary(op, *a as f64) as f32)),
            (NumericType::Double, P::Double(a)) => Ok(P::Double(float_unary(op, *a))),
            (NumericType::BigDecimal, P::BigDecimal(a)) => Ok(P::BigDecimal(bigdecimal_unary(op, a))),
            (_, v) => Err(self.mismatch(v)),
        }
    }

    fn schema_tag(&self) -> StandardType {
        match self.schema() {
            Schema::Primitive(t) => t,
            _ => unreachable!(),
        }
    }
}

/* ===================== Fractional instances ===================== */

/// Closed set of fractional instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractionalType {
    Float,
    Double,
    BigDecimal,
}

impl FractionalType {
    pub fn schema(&self) -> Schema {
        Schema::Primitive(match self {
            FractionalType::Float => StandardType::Float,
            FractionalType::Double => StandardType::Double,
            FractionalType::BigDecimal => StandardType::BigDecimal,
        })
    }

    /// Apply a fractional operation to a value of this instance
    pub fn apply(&self, op: FractionalOp, value: &PrimitiveValue) -> Result<PrimitiveValue> {
        use PrimitiveValue as P;
        match (self, value) {
            (FractionalType::Float, P::Float(a)) => {
                fractional(op, *a as f64).map(|r| P::Float(r as f32))
            }
            (FractionalType::Double, P::Double(a)) => fractional(op, *a).map(P::Double),
            (FractionalType::BigDecimal, P::BigDecimal(a)) => {
                let x = a.to_f64().ok_or(arithmetic(ArithmeticCause::Overflow))?;
                let r = fractional(op, x)?;
                BigDecimal::from_f64(r)
                    .ok_or(arithmetic(ArithmeticCause::Domain))
                    .map(P::BigDecimal)
            }
            (_, v) => Err(EvalError::mismatch(
                &self.schema(),
                &Schema::Primitive(v.standard_type()),
            )),
        }
    }
}

fn fractional(op: FractionalOp, x: f64) -> Result<f64> {
    let r = match op {
        FractionalOp::Sin => x.sin(),
        FractionalOp::Asin => x.asin(),
        FractionalOp::Atan => x.atan(),
    };
    if r.is_nan() && !x.is_nan() {
        Err(arithmetic(ArithmeticCause::Domain))
    } else {
        Ok(r)
    }
}

/* ===================== Integer arithmetic ===================== */

trait CheckedInt: Copy + PartialOrd {
    fn c_add(self, rhs: Self) -> Option<Self>;
    fn c_sub(self, rhs: Self) -> Option<Self>;
    fn c_mul(self, rhs: Self) -> Option<Self>;
    fn c_div(self, rhs: Self) -> Option<Self>;
    fn c_rem(self, rhs: Self) -> Option<Self>;
    fn c_neg(self) -> Option<Self>;
    fn c_abs(self) -> Option<Self>;
    fn c_pow(self, exp: u32) -> Option<Self>;
    fn is_zero(self) -> bool;
    fn to_f64(self) -> f64;
    fn to_u32(self) -> Option<u32>;
    fn from_f64(v: f64) -> Option<Self>;
}

macro_rules! checked_int {
    ($ty:ty) => {
        impl CheckedInt for $ty {
            fn c_add(self, rhs: Self) -> Option<Self> {
                self.checked_add(rhs)
            }
            fn c_sub(self, rhs: Self) -> Option<Self> {
                self.checked_sub(rhs)
            }
            fn c_mul(self, rhs: Self) -> Option<Self> {
                self.checked_mul(rhs)
            }
            fn c_div(self, rhs: Self) -> Option<Self> {
                self.checked_div(rhs)
            }
            fn c_rem(self, rhs: Self) -> Option<Self> {
                self.checked_rem(rhs)
            }
            fn c_neg(self) -> Option<Self> {
                self.checked_neg()
            }
            fn c_abs(self) -> Option<Self> {
                self.checked_abs()
            }
            fn c_pow(self, exp: u32) -> Option<Self> {
                self.checked_pow(exp)
            }
            fn is_zero(self) -> bool {
                self == 0
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn to_u32(self) -> Option<u32> {
                u32::try_from(self).ok()
            }
            fn from_f64(v: f64) -> Option<Self> {
                if v.is_finite() && v >= <$ty>::MIN as f64 && v <= <$ty>::MAX as f64 {
                    Some(v as $ty)
                } else {
                    None
                }
            }
        }
    };
}

checked_int!(i16);
checked_int!(i32);
checked_int!(i64);

fn int_binary<T: CheckedInt>(op: NumericBinaryOp, a: T, b: T) -> Result<T> {
    match op {
        NumericBinaryOp::Add => a.c_add(b).ok_or(arithmetic(ArithmeticCause::Overflow)),
        NumericBinaryOp::Sub => a.c_sub(b).ok_or(arithmetic(ArithmeticCause::Overflow)),
        NumericBinaryOp::Mul => a.c_mul(b).ok_or(arithmetic(ArithmeticCause::Overflow)),
        NumericBinaryOp::Div => {
            if b.is_zero() {
                Err(arithmetic(ArithmeticCause::DivideByZero))
            } else {
                a.c_div(b).ok_or(arithmetic(ArithmeticCause::Overflow))
            }
        }
        NumericBinaryOp::Mod => {
            if b.is_zero() {
                Err(arithmetic(ArithmeticCause::DivideByZero))
            } else {
                a.c_rem(b).ok_or(arithmetic(ArithmeticCause::Overflow))
            }
        }
        NumericBinaryOp::Min => Ok(if b < a { b } else { a }),
        NumericBinaryOp::Max => Ok(if b > a { b } else { a }),
        NumericBinaryOp::Pow => {
            let exp = b.to_u32().ok_or(arithmetic(ArithmeticCause::Domain))?;
            a.c_pow(exp).ok_or(arithmetic(ArithmeticCause::Overflow))
        }
        NumericBinaryOp::Root => {
            let r = float_root(a.to_f64(), b.to_f64())?;
            T::from_f64(r.round()).ok_or(arithmetic(ArithmeticCause::Overflow))
        }
        NumericBinaryOp::Log => {
            let r = float_log(a.to_f64(), b.to_f64())?;
            T::from_f64(r.round()).ok_or(arithmetic(ArithmeticCause::Overflow))
        }
    }
}

fn int_unary<T: CheckedInt>(op: NumericUnaryOp, a: T) -> Result<T> {
    match op {
        NumericUnaryOp::Neg => a.c_neg().ok_or(arithmetic(ArithmeticCause::Overflow)),
        NumericUnaryOp::Abs => a.c_abs().ok_or(arithmetic(ArithmeticCause::Overflow)),
        // Integers are their own floor, ceiling and rounding
        NumericUnaryOp::Floor | NumericUnaryOp::Ceil | NumericUnaryOp::Round => Ok(a),
    }
}

/* ===================== Float arithmetic ===================== */

fn float_binary(op: NumericBinaryOp, a: f64, b: f64) -> Result<f64> {
    match op {
        NumericBinaryOp::Add => Ok(a + b),
        NumericBinaryOp::Sub => Ok(a - b),
        NumericBinaryOp::Mul => Ok(a * b),
        NumericBinaryOp::Div => Ok(a / b),
        NumericBinaryOp::Mod => Ok(a % b),
        NumericBinaryOp::Min => Ok(a.min(b)),
        NumericBinaryOp::Max => Ok(a.max(b)),
        NumericBinaryOp::Pow => Ok(a.powf(b)),
        NumericBinaryOp::Root => float_root(a, b),
        NumericBinaryOp::Log => float_log(a, b),
    }
}

fn float_unary(op: NumericUnaryOp, a: f64) -> f64 {
    match op {
        NumericUnaryOp::Neg => -a,
        NumericUnaryOp::Abs => a.abs(),
        NumericUnaryOp::Floor => a.floor(),
        NumericUnaryOp::Ceil => a.ceil(),
        NumericUnaryOp::Round => a.round(),
    }
}

/// `n`th root of `x`
fn float_root(x: f64, n: f64) -> Result<f64> {
    if n == 0.0 {
        return Err(arithmetic(ArithmeticCause::Domain));
    }
    let r = x.powf(1.0 / n);
    if r.is_nan() && !x.is_nan() {
        Err(arithmetic(ArithmeticCause::Domain))
    } else {
        Ok(r)
    }
}

/// Logarithm of `x` in base `base`
fn float_log(x: f64, base: f64) -> Result<f64> {
    if x <= 0.0 || base <= 0.0 || base == 1.0 {
        return Err(arithmetic(ArithmeticCause::Domain));
    }
    Ok(x.ln() / base.ln())
}

/* ===================== BigInt arithmetic ===================== */

fn bigint_binary(op: NumericBinaryOp, a: &BigInt, b: &BigInt) -> Result<BigInt> {
    match op {
        NumericBinaryOp::Add => Ok(a + b),
        NumericBinaryOp::Sub => Ok(a - b),
        NumericBinaryOp::Mul => Ok(a * b),
        NumericBinaryOp::Div => {
            if b.is_zero() {
                Err(arithmetic(ArithmeticCause::DivideByZero))
            } else {
                Ok(a / b)
            }
        }
        NumericBinaryOp::Mod => {
            if b.is_zero() {
                Err(arithmetic(ArithmeticCause::DivideByZero))
            } else {
                Ok(a % b)
            }
        }
        NumericBinaryOp::Min => Ok(a.min(b).clone()),
        NumericBinaryOp::Max => Ok(a.max(b).clone()),
        NumericBinaryOp::Pow => {
            let exp = b.to_u32().ok_or(arithmetic(ArithmeticCause::Domain))?;
            Ok(a.pow(exp))
        }
        NumericBinaryOp::Root => {
            let x = a.to_f64().ok_or(arithmetic(ArithmeticCause::Overflow))?;
            let n = b.to_f64().ok_or(arithmetic(ArithmeticCause::Overflow))?;
            let r = float_root(x, n)?;
            BigInt::from_f64(r.round()).ok_or(arithmetic(ArithmeticCause::Domain))
        }
        NumericBinaryOp::Log => {
            let x = a.to_f64().ok_or(arithmetic(ArithmeticCause::Overflow))?;
            let base = b.to_f64().ok_or(arithmetic(ArithmeticCause::Overflow))?;
            let r = float_log(x, base)?;
            BigInt::from_f64(r.round()).ok_or(arithmetic(ArithmeticCause::Domain))
        }
    }
}

fn bigint_unary(op: NumericUnaryOp, a: &BigInt) -> BigInt {
    match op {
        NumericUnaryOp::Neg => -a,
        NumericUnaryOp::Abs => a.abs(),
        NumericUnaryOp::Floor | NumericUnaryOp::Ceil | NumericUnaryOp::Round => a.clone(),
    }
}

/* ===================== BigDecimal arithmetic ===================== */

fn bigdecimal_binary(op: NumericBinaryOp, a: &BigDecimal, b: &BigDecimal) -> Result<BigDecimal> {
    match op {
        NumericBinaryOp::Add => Ok(a + b),
        NumericBinaryOp::Sub => Ok(a - b),
        NumericBinaryOp::Mul => Ok(a * b),
        NumericBinaryOp::Div => {
            if b.is_zero() {
                Err(arithmetic(ArithmeticCause::DivideByZero))
            } else {
                Ok(a / b)
            }
        }
        NumericBinaryOp::Mod => {
            if b.is_zero() {
                Err(arithmetic(ArithmeticCause::DivideByZero))
            } else {
                Ok(a % b)
            }
        }
        NumericBinaryOp::Min => Ok(a.min(b).clone()),
        NumericBinaryOp::Max => Ok(a.max(b).clone()),
        NumericBinaryOp::Pow | NumericBinaryOp::Root | NumericBinaryOp::Log => {
            let x = a.to_f64().ok_or(arithmetic(ArithmeticCause::Overflow))?;
            let y = b.to_f64().ok_or(arithmetic(ArithmeticCause::Overflow))?;
            let r = match op {
                NumericBinaryOp::Pow => x.powf(y),
                NumericBinaryOp::Root => float_root(x, y)?,
                _ => float_log(x, y)?,
            };
            BigDecimal::from_f64(r).ok_or(arithmetic(ArithmeticCause::Domain))
        }
    }
}

fn bigdecimal_unary(op: NumericUnaryOp, a: &BigDecimal) -> BigDecimal {
    match op {
        NumericUnaryOp::Neg => -a,
        NumericUnaryOp::Abs => a.abs(),
        NumericUnaryOp::Floor => a.with_scale_round(0, RoundingMode::Floor),
        NumericUnaryOp::Ceil => a.with_scale_round(0, RoundingMode::Ceiling),
        NumericUnaryOp::Round => a.with_scale_round(0, RoundingMode::HalfUp),
    }
}
