//! Dynamic values
//!
//! A `DynamicValue` is the schema-tagged, tree-shaped runtime value
//! the evaluator produces. It mirrors the shape of `Schema`: a value
//! is well-formed against a schema iff the two trees match recursively
//! after stripping `Transform` layers.

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeDelta, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::schema::{Schema, SchemaValue, StandardType};

/* ===================== Time units ===================== */

/// Closed set of temporal units, ordered from finest to coarsest
///
/// The ordering matters: unit values compare by granularity, and
/// truncation walks this scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Nanos,
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of one unit in nanoseconds
    pub fn nanos(&self) -> i64 {
        match self {
            TimeUnit::Nanos => 1,
            TimeUnit::Micros => 1_000,
            TimeUnit::Millis => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60 * 1_000_000_000,
            TimeUnit::Hours => 3_600 * 1_000_000_000,
            TimeUnit::Days => 86_400 * 1_000_000_000,
        }
    }
}

/* ===================== Primitive values ===================== */

/// A primitive value, tagged with its `StandardType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PrimitiveValue {
    Unit,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    BigInt(BigInt),
    Float(f32),
    Double(f64),
    BigDecimal(BigDecimal),
    Char(char),
    String(String),
    Instant(DateTime<Utc>),
    Duration(#[serde(with = "serde_timedelta")] TimeDelta),
    TimeUnit(TimeUnit),
    Throwable { message: String },
    Uri(String),
}

impl PrimitiveValue {
    /// The tag this value carries
    pub fn standard_type(&self) -> StandardType {
        match self {
            PrimitiveValue::Unit => StandardType::Unit,
            PrimitiveValue::Bool(_) => StandardType::Bool,
            PrimitiveValue::Byte(_) => StandardType::Byte,
            PrimitiveValue::Short(_) => StandardType::Short,
            PrimitiveValue::Int(_) => StandardType::Int,
            PrimitiveValue::Long(_) => StandardType::Long,
            PrimitiveValue::BigInt(_) => StandardType::BigInt,
            PrimitiveValue::Float(_) => StandardType::Float,
            PrimitiveValue::Double(_) => StandardType::Double,
            PrimitiveValue::BigDecimal(_) => StandardType::BigDecimal,
            PrimitiveValue::Char(_) => StandardType::Char,
            PrimitiveValue::String(_) => StandardType::String,
            PrimitiveValue::Instant(_) => StandardType::Instant,
            PrimitiveValue::Duration(_) => StandardType::Duration,
            PrimitiveValue::TimeUnit(_) => StandardType::TimeUnit,
            PrimitiveValue::Throwable { .. } => StandardType::Throwable,
            PrimitiveValue::Uri(_) => StandardType::Uri,
        }
    }

    /// Compare two primitives of the same tag
    ///
    /// Floats use `total_cmp`, so the ordering is total even in the
    /// presence of NaN.
    pub fn compare(&self, other: &PrimitiveValue) -> Result<Ordering> {
        use PrimitiveValue as P;
        match (self, other) {
            (P::Unit, P::Unit) => Ok(Ordering::Equal),
            (P::Bool(a), P::Bool(b)) => Ok(a.cmp(b)),
            (P::Byte(a), P::Byte(b)) => Ok(a.cmp(b)),
            (P::Short(a), P::Short(b)) => Ok(a.cmp(b)),
            (P::Int(a), P::Int(b)) => Ok(a.cmp(b)),
            (P::Long(a), P::Long(b)) => Ok(a.cmp(b)),
            (P::BigInt(a), P::BigInt(b)) => Ok(a.cmp(b)),
            (P::Float(a), P::Float(b)) => Ok(a.total_cmp(b)),
            (P::Double(a), P::Double(b)) => Ok(a.total_cmp(b)),
            (P::BigDecimal(a), P::BigDecimal(b)) => Ok(a.cmp(b)),
            (P::Char(a), P::Char(b)) => Ok(a.cmp(b)),
            (P::String(a), P::String(b)) => Ok(a.cmp(b)),
            (P::Instant(a), P::Instant(b)) => Ok(a.cmp(b)),
            (P::Duration(a), P::Duration(b)) => Ok(a.cmp(b)),
            (P::TimeUnit(a), P::TimeUnit(b)) => Ok(a.cmp(b)),
            (P::Throwable { message: a }, P::Throwable { message: b }) => Ok(a.cmp(b)),
            (P::Uri(a), P::Uri(b)) => Ok(a.cmp(b)),
            (a, b) => Err(EvalError::BadShape(format!(
                "cannot compare {} with {}",
                a.standard_type(),
                b.standard_type()
            ))),
        }
    }
}

/* ===================== Dynamic values ===================== */

/// A schema-tagged runtime value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DynamicValue {
    Primitive(PrimitiveValue),
    Some(Box<DynamicValue>),
    None,
    Left(Box<DynamicValue>),
    Right(Box<DynamicValue>),
    Tuple {
        first: Box<DynamicValue>,
        second: Box<DynamicValue>,
    },
    Sequence(Vec<DynamicValue>),
    Map(Vec<(DynamicValue, DynamicValue)>),
    Set(Vec<DynamicValue>),
    Record {
        name: String,
        fields: Vec<(String, DynamicValue)>,
    },
    Enum {
        case: String,
        payload: Box<DynamicValue>,
    },
}

impl DynamicValue {
    pub const UNIT: DynamicValue = DynamicValue::Primitive(PrimitiveValue::Unit);

    pub fn primitive(p: PrimitiveValue) -> DynamicValue {
        DynamicValue::Primitive(p)
    }

    pub fn bool(b: bool) -> DynamicValue {
        DynamicValue::Primitive(PrimitiveValue::Bool(b))
    }

    pub fn int(n: i32) -> DynamicValue {
        DynamicValue::Primitive(PrimitiveValue::Int(n))
    }

    pub fn long(n: i64) -> DynamicValue {
        DynamicValue::Primitive(PrimitiveValue::Long(n))
    }

    pub fn string(s: impl Into<String>) -> DynamicValue {
        DynamicValue::Primitive(PrimitiveValue::String(s.into()))
    }

    pub fn some(v: DynamicValue) -> DynamicValue {
        DynamicValue::Some(Box::new(v))
    }

    pub fn left(v: DynamicValue) -> DynamicValue {
        DynamicValue::Left(Box::new(v))
    }

    pub fn right(v: DynamicValue) -> DynamicValue {
        DynamicValue::Right(Box::new(v))
    }

    pub fn pair(first: DynamicValue, second: DynamicValue) -> DynamicValue {
        DynamicValue::Tuple {
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    /// Canonical right-nested tuple over `items` (mirrors `Schema::tuple_of`)
    pub fn tuple_of(items: Vec<DynamicValue>) -> DynamicValue {
        let mut iter = items.into_iter().rev();
        let last = match iter.next() {
            Some(v) => v,
            None => return DynamicValue::UNIT,
        };
        iter.fold(last, |acc, v| DynamicValue::pair(v, acc))
    }

    pub fn enum_case(case: impl Into<String>, payload: DynamicValue) -> DynamicValue {
        DynamicValue::Enum {
            case: case.into(),
            payload: Box::new(payload),
        }
    }

    /// Number of leaves in the right-nested pair spine
    pub fn tuple_arity(&self) -> u32 {
        match self {
            DynamicValue::Tuple { second, .. } => 1 + second.tuple_arity(),
            _ => 1,
        }
    }

    /// The `index`th tuple component (0-based, counting leaves from the left)
    pub fn tuple_component(&self, index: u32) -> Option<&DynamicValue> {
        match (self, index) {
            (DynamicValue::Tuple { first, .. }, 0) => Some(first.as_ref()),
            (DynamicValue::Tuple { second, .. }, n) => second.tuple_component(n - 1),
            (leaf, 0) => Some(leaf),
            _ => None,
        }
    }

    /* ===================== Well-formedness ===================== */

    /// Verify that this value matches `schema` recursively
    ///
    /// `Transform` layers are stripped before matching. A mismatch is
    /// `EvalError::BadShape`; checking against `Schema::Fail` fails
    /// unconditionally.
    pub fn check(&self, schema: &Schema) -> Result<()> {
        match (self, schema) {
            (v, Schema::Transform { inner, .. }) => v.check(inner),
            (_, Schema::Fail(msg)) => Err(EvalError::BadShape(format!("fail schema: {msg}"))),
            (DynamicValue::Primitive(p), Schema::Primitive(t)) => {
                if p.standard_type() == *t {
                    Ok(())
                } else {
                    Err(EvalError::BadShape(format!(
                        "expected {t}, got {}",
                        p.standard_type()
                    )))
                }
            }
            (DynamicValue::None, Schema::Option(_)) => Ok(()),
            (DynamicValue::Some(v), Schema::Option(inner)) => v.check(inner),
            (DynamicValue::Left(v), Schema::Either { left, .. }) => v.check(left),
            (DynamicValue::Right(v), Schema::Either { right, .. }) => v.check(right),
            (
                DynamicValue::Tuple { first, second },
                Schema::Tuple {
                    first: fs,
                    second: ss,
                },
            ) => {
                first.check(fs)?;
                second.check(ss)
            }
            (DynamicValue::Sequence(items), Schema::Sequence(elem)) => {
                items.iter().try_for_each(|v| v.check(elem))
            }
            (DynamicValue::Map(entries), Schema::Map { key, value }) => {
                entries.iter().try_for_each(|(k, v)| {
                    k.check(key)?;
                    v.check(value)
                })
            }
            (DynamicValue::Set(items), Schema::Set(elem)) => {
                items.iter().try_for_each(|v| v.check(elem))
            }
            (DynamicValue::Record { name, fields }, Schema::Record { name: sname, fields: sfields }) => {
                if name != sname || fields.len() != sfields.len() {
                    return Err(EvalError::BadShape(format!(
                        "record {name} does not match schema record {sname}"
                    )));
                }
                for ((fname, fvalue), sfield) in fields.iter().zip(sfields) {
                    if fname != &sfield.name {
                        return Err(EvalError::BadShape(format!(
                            "record field {fname} does not match schema field {}",
                            sfield.name
                        )));
                    }
                    fvalue.check(&sfield.schema)?;
                }
                Ok(())
            }
            (DynamicValue::Enum { case, payload }, Schema::Enum { name, cases }) => {
                match cases.iter().find(|c| &c.name == case) {
                    Some(c) => payload.check(&c.schema),
                    None => Err(EvalError::BadShape(format!(
                        "case {case} is not a case of enum {name}"
                    ))),
                }
            }
            (value, schema) => Err(EvalError::BadShape(format!(
                "value shape {} does not match schema {schema}",
                value.shape_name()
            ))),
        }
    }

    /* ===================== Ordering ===================== */

    /// Default total ordering over shape-compatible values
    ///
    /// Tuples and sequences compare lexicographically, `None < Some`,
    /// `Left < Right`, records field-by-field in declared order, enums
    /// by case tag then payload. Shape mismatch is `BadShape`.
    pub fn compare(&self, other: &DynamicValue) -> Result<Ordering> {
        use DynamicValue as D;
        match (self, other) {
            (D::Primitive(a), D::Primitive(b)) => a.compare(b),
            (D::None, D::None) => Ok(Ordering::Equal),
            (D::None, D::Some(_)) => Ok(Ordering::Less),
            (D::Some(_), D::None) => Ok(Ordering::Greater),
            (D::Some(a), D::Some(b)) => a.compare(b),
            (D::Left(a), D::Left(b)) => a.compare(b),
            (D::Left(_), D::Right(_)) => Ok(Ordering::Less),
            (D::Right(_), D::Left(_)) => Ok(Ordering::Greater),
            (D::Right(a), D::Right(b)) => a.compare(b),
            (
                D::Tuple { first, second },
                D::Tuple {
                    first: of,
                    second: os,
                },
            ) => match first.compare(of)? {
                Ordering::Equal => second.compare(os),
                ord => Ok(ord),
            },
            (D::Sequence(a), D::Sequence(b)) => compare_items(a, b),
            (D::Set(a), D::Set(b)) => compare_items(a, b),
            (D::Map(a), D::Map(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b) {
                    match ka.compare(kb)? {
                        Ordering::Equal => {}
                        ord => return Ok(ord),
                    }
                    match va.compare(vb)? {
                        Ordering::Equal => {}
                        ord => return Ok(ord),
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (D::Record { fields: a, .. }, D::Record { fields: b, .. }) => {
                for ((_, va), (_, vb)) in a.iter().zip(b) {
                    match va.compare(vb)? {
                        Ordering::Equal => {}
                        ord => return Ok(ord),
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (
                D::Enum { case: ca, payload: pa },
                D::Enum { case: cb, payload: pb },
            ) => match ca.cmp(cb) {
                Ordering::Equal => pa.compare(pb),
                ord => Ok(ord),
            },
            (a, b) => Err(EvalError::BadShape(format!(
                "cannot compare {} with {}",
                a.shape_name(),
                b.shape_name()
            ))),
        }
    }

    fn shape_name(&self) -> &'static str {
        match self {
            DynamicValue::Primitive(_) => "primitive",
            DynamicValue::Some(_) => "some",
            DynamicValue::None => "none",
            DynamicValue::Left(_) => "left",
            DynamicValue::Right(_) => "right",
            DynamicValue::Tuple { .. } => "tuple",
            DynamicValue::Sequence(_) => "sequence",
            DynamicValue::Map(_) => "map",
            DynamicValue::Set(_) => "set",
            DynamicValue::Record { .. } => "record",
            DynamicValue::Enum { .. } => "enum",
        }
    }
}

fn compare_items(a: &[DynamicValue], b: &[DynamicValue]) -> Result<Ordering> {
    for (va, vb) in a.iter().zip(b) {
        match va.compare(vb)? {
            Ordering::Equal => {}
            ord => return Ok(ord),
        }
    }
    Ok(a.len().cmp(&b.len()))
}

/* ===================== SchemaAndValue ===================== */

/// The uniform evaluation result: a value paired with its schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaAndValue {
    pub schema: Schema,
    pub value: DynamicValue,
}

impl SchemaAndValue {
    pub fn new(schema: Schema, value: DynamicValue) -> Self {
        SchemaAndValue { schema, value }
    }

    /// Lift a host value into its dynamic form
    pub fn of<A: SchemaValue>(value: &A) -> Self {
        SchemaAndValue {
            schema: A::schema(),
            value: value.to_dynamic(),
        }
    }

    /// Verify the value is well-formed against the carried schema
    pub fn check(&self) -> Result<()> {
        self.value.check(&self.schema)
    }

    /// Narrow to a typed host value
    ///
    /// The carried schema must be structurally equal to `A::schema()`
    /// after transform erasure; the value is then converted.
    pub fn into_typed<A: SchemaValue>(self) -> Result<A> {
        let expected = A::schema();
        if self.schema.erased() != expected.erased() {
            return Err(EvalError::mismatch(&expected, &self.schema));
        }
        A::from_dynamic(&self.value)
    }
}

/* ===================== TimeDelta serde ===================== */

/// chrono's `TimeDelta` has no serde support; encode as
/// `(seconds, subsecond nanos)` with both components truncated toward
/// zero, which round-trips exactly.
mod serde_timedelta {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        (delta.num_seconds(), delta.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let (seconds, nanos) = <(i64, i32)>::deserialize(deserializer)?;
        let seconds = TimeDelta::try_seconds(seconds)
            .ok_or_else(|| serde::de::Error::custom("duration seconds out of range"))?;
        Ok(seconds + TimeDelta::nanoseconds(nanos as i64))
    }
}
