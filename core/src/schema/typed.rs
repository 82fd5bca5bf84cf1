//! Typed bridge
//!
//! `SchemaValue` connects host Rust types to the dynamic value
//! universe: each implementing type knows its schema and converts to
//! and from `DynamicValue`. This is what `remote()` lifting and typed
//! evaluation narrow through; structure is communicated via schema
//! only, never via host reflection.

use std::collections::{BTreeMap, BTreeSet};

use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeDelta, Utc};
use num_bigint::BigInt;

use crate::error::{EvalError, Result};
use crate::schema::{DynamicValue, PrimitiveValue, Schema, StandardType, TimeUnit};

/// A host type with a schema and a dynamic-value round-trip
pub trait SchemaValue: Sized {
    fn schema() -> Schema;
    fn to_dynamic(&self) -> DynamicValue;
    fn from_dynamic(value: &DynamicValue) -> Result<Self>;
}

/// An untagged two-sided sum, the host form of `Schema::Either`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

fn expect_primitive(value: &DynamicValue, expected: StandardType) -> Result<&PrimitiveValue> {
    match value {
        DynamicValue::Primitive(p) if p.standard_type() == expected => Ok(p),
        DynamicValue::Primitive(p) => Err(EvalError::BadShape(format!(
            "expected {expected}, got {}",
            p.standard_type()
        ))),
        other => Err(EvalError::BadShape(format!(
            "expected {expected} primitive, got {other:?}"
        ))),
    }
}

/* ===================== Primitives ===================== */

macro_rules! primitive_schema_value {
    ($ty:ty, $tag:ident, $variant:ident) => {
        impl SchemaValue for $ty {
            fn schema() -> Schema {
                Schema::Primitive(StandardType::$tag)
            }

            fn to_dynamic(&self) -> DynamicValue {
                DynamicValue::Primitive(PrimitiveValue::$variant(self.clone()))
            }

            fn from_dynamic(value: &DynamicValue) -> Result<Self> {
                match expect_primitive(value, StandardType::$tag)? {
                    PrimitiveValue::$variant(v) => Ok(v.clone()),
                    _ => unreachable!(),
                }
            }
        }
    };
}

primitive_schema_value!(bool, Bool, Bool);
primitive_schema_value!(i8, Byte, Byte);
primitive_schema_value!(i16, Short, Short);
primitive_schema_value!(i32, Int, Int);
primitive_schema_value!(i64, Long, Long);
primitive_schema_value!(BigInt, BigInt, BigInt);
primitive_schema_value!(f32, Float, Float);
primitive_schema_value!(f64, Double, Double);
primitive_schema_value!(BigDecimal, BigDecimal, BigDecimal);
primitive_schema_value!(char, Char, Char);
primitive_schema_value!(String, String, String);
primitive_schema_value!(DateTime<Utc>, Instant, Instant);
primitive_schema_value!(TimeDelta, Duration, Duration);
primitive_schema_value!(TimeUnit, TimeUnit, TimeUnit);

impl SchemaValue for () {
    fn schema() -> Schema {
        Schema::UNIT
    }

    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::UNIT
    }

    fn from_dynamic(value: &DynamicValue) -> Result<Self> {
        expect_primitive(value, StandardType::Unit).map(|_| ())
    }
}

/* ===================== Composites ===================== */

impl<A: SchemaValue> SchemaValue for Option<A> {
    fn schema() -> Schema {
        Schema::option(A::schema())
    }

    fn to_dynamic(&self) -> DynamicValue {
        match self {
            Some(v) => DynamicValue::some(v.to_dynamic()),
            None => DynamicValue::None,
        }
    }

    fn from_dynamic(value: &DynamicValue) -> Result<Self> {
        match value {
            DynamicValue::None => Ok(None),
            DynamicValue::Some(v) => Ok(Some(A::from_dynamic(v)?)),
            other => Err(EvalError::BadShape(format!(
                "expected option value, got {other:?}"
            ))),
        }
    }
}

impl<L: SchemaValue, R: SchemaValue> SchemaValue for Either<L, R> {
    fn schema() -> Schema {
        Schema::either(L::schema(), R::schema())
    }

    fn to_dynamic(&self) -> DynamicValue {
        match self {
            Either::Left(v) => DynamicValue::left(v.to_dynamic()),
            Either::Right(v) => DynamicValue::right(v.to_dynamic()),
        }
    }

    fn from_dynamic(value: &DynamicValue) -> Result<Self> {
        match value {
            DynamicValue::Left(v) => Ok(Either::Left(L::from_dynamic(v)?)),
            DynamicValue::Right(v) => Ok(Either::Right(R::from_dynamic(v)?)),
            other => Err(EvalError::BadShape(format!(
                "expected either value, got {other:?}"
            ))),
        }
    }
}

impl<A: SchemaValue> SchemaValue for Vec<A> {
    fn schema() -> Schema {
        Schema::sequence(A::schema())
    }

    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::Sequence(self.iter().map(A::to_dynamic).collect())
    }

    fn from_dynamic(value: &DynamicValue) -> Result<Self> {
        match value {
            DynamicValue::Sequence(items) => items.iter().map(A::from_dynamic).collect(),
            other => Err(EvalError::BadShape(format!(
                "expected sequence value, got {other:?}"
            ))),
        }
    }
}

impl<K: SchemaValue + Ord, V: SchemaValue> SchemaValue for BTreeMap<K, V> {
    fn schema() -> Schema {
        Schema::map(K::schema(), V::schema())
    }

    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::Map(
            self.iter()
                .map(|(k, v)| (k.to_dynamic(), v.to_dynamic()))
                .collect(),
        )
    }

    fn from_dynamic(value: &DynamicValue) -> Result<Self> {
        match value {
            DynamicValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| Ok((K::from_dynamic(k)?, V::from_dynamic(v)?)))
                .collect(),
            other => Err(EvalError::BadShape(format!(
                "expected map value, got {other:?}"
            ))),
        }
    }
}

impl<A: SchemaValue + Ord> SchemaValue for BTreeSet<A> {
    fn schema() -> Schema {
        Schema::set(A::schema())
    }

    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::Set(self.iter().map(A::to_dynamic).collect())
    }

    fn from_dynamic(value: &DynamicValue) -> Result<Self> {
        match value {
            DynamicValue::Set(items) => items.iter().map(A::from_dynamic).collect(),
            other => Err(EvalError::BadShape(format!(
                "expected set value, got {other:?}"
            ))),
        }
    }
}

/* ===================== Tuples ===================== */

// Tuples are right-nested pairs at the dynamic level, so `(a, b, c)`
// converts to `Tuple(a, Tuple(b, c))`. Larger construction arities go
// through the expression builders.

impl<A: SchemaValue, B: SchemaValue> SchemaValue for (A, B) {
    fn schema() -> Schema {
        Schema::pair(A::schema(), B::schema())
    }

    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::pair(self.0.to_dynamic(), self.1.to_dynamic())
    }

    fn from_dynamic(value: &DynamicValue) -> Result<Self> {
        match value {
            DynamicValue::Tuple { first, second } => {
                Ok((A::from_dynamic(first)?, B::from_dynamic(second)?))
            }
            other => Err(EvalError::BadShape(format!(
                "expected pair value, got {other:?}"
            ))),
        }
    }
}

impl<A: SchemaValue, B: SchemaValue, C: SchemaValue> SchemaValue for (A, B, C) {
    fn schema() -> Schema {
        Schema::pair(A::schema(), <(B, C)>::schema())
    }

    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::pair(
            self.0.to_dynamic(),
            DynamicValue::pair(self.1.to_dynamic(), self.2.to_dynamic()),
        )
    }

    fn from_dynamic(value: &DynamicValue) -> Result<Self> {
        match value {
            DynamicValue::Tuple { first, second } => {
                let a = A::from_dynamic(first)?;
                let (b, c) = <(B, C)>::from_dynamic(second)?;
                Ok((a, b, c))
            }
            other => Err(EvalError::BadShape(format!(
                "expected tuple value, got {other:?}"
            ))),
        }
    }
}

impl<A: SchemaValue, B: SchemaValue, C: SchemaValue, D: SchemaValue> SchemaValue for (A, B, C, D) {
    fn schema() -> Schema {
        Schema::pair(A::schema(), <(B, C, D)>::schema())
    }

    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::pair(
            self.0.to_dynamic(),
            DynamicValue::pair(
                self.1.to_dynamic(),
                DynamicValue::pair(self.2.to_dynamic(), self.3.to_dynamic()),
            ),
        )
    }

    fn from_dynamic(value: &DynamicValue) -> Result<Self> {
        match value {
            DynamicValue::Tuple { first, second } => {
                let a = A::from_dynamic(first)?;
                let (b, c, d) = <(B, C, D)>::from_dynamic(second)?;
                Ok((a, b, c, d))
            }
            other => Err(EvalError::BadShape(format!(
                "expected tuple value, got {other:?}"
            ))),
        }
    }
}

impl<A: SchemaValue, B: SchemaValue, C: SchemaValue, D: SchemaValue, E: SchemaValue> SchemaValue
    for (A, B, C, D, E)
{
    fn schema() -> Schema {
        Schema::pair(A::schema(), <(B, C, D, E)>::schema())
    }

    fn to_dynamic(&self) -> DynamicValue {
        DynamicValue::pair(
            self.0.to_dynamic(),
            DynamicValue::pair(
                self.1.to_dynamic(),
                DynamicValue::pair(
                    self.2.to_dynamic(),
                    DynamicValue::pair(self.3.to_dynamic(), self.4.to_dynamic()),
                ),
            ),
        )
    }

    fn from_dynamic(value: &DynamicValue) -> Result<Self> {
        match value {
            DynamicValue::Tuple { first, second } => {
                let a = A::from_dynamic(first)?;
                let (b, c, d, e) = <(B, C, D, E)>::from_dynamic(second)?;
                Ok((a, b, c, d, e))
            }
            other => Err(EvalError::BadShape(format!(
                "expected tuple value, got {other:?}"
            ))),
        }
    }
}
