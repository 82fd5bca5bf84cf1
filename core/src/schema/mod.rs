//! Schema model
//!
//! A `Schema` is a structural description of a value's shape. Schemas
//! drive three things: polymorphism (which tuple component, which
//! numeric instance), the default ordering used by comparisons, and
//! the wire encoding. The serde representation of `Schema` is itself
//! the reified schema AST used when schemas travel inside expression
//! trees.

pub mod dynamic;
pub mod transform;
pub mod typed;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use dynamic::{DynamicValue, PrimitiveValue, SchemaAndValue, TimeUnit};
pub use transform::TransformRegistry;
pub use typed::{Either, SchemaValue};

/* ===================== Primitive tags ===================== */

/// The closed set of primitive type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardType {
    Unit,
    Bool,
    Byte,
    Short,
    Int,
    Long,
    BigInt,
    Float,
    Double,
    BigDecimal,
    Char,
    String,
    Instant,
    Duration,
    TimeUnit,
    Throwable,
    Uri,
}

impl StandardType {
    /// Lowercase display name of the tag
    pub fn name(&self) -> &'static str {
        match self {
            StandardType::Unit => "unit",
            StandardType::Bool => "bool",
            StandardType::Byte => "byte",
            StandardType::Short => "short",
            StandardType::Int => "int",
            StandardType::Long => "long",
            StandardType::BigInt => "bigint",
            StandardType::Float => "float",
            StandardType::Double => "double",
            StandardType::BigDecimal => "bigdecimal",
            StandardType::Char => "char",
            StandardType::String => "string",
            StandardType::Instant => "instant",
            StandardType::Duration => "duration",
            StandardType::TimeUnit => "timeunit",
            StandardType::Throwable => "throwable",
            StandardType::Uri => "uri",
        }
    }
}

impl fmt::Display for StandardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/* ===================== Schema ===================== */

/// A named field of a record schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub schema: Schema,
}

/// A named case of an enum schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaCase {
    pub name: String,
    pub schema: Schema,
}

/// Structural description of a value's shape
///
/// Tuples of arity greater than two are right-nested pairs:
/// `(a, b, c)` is `Tuple(a, Tuple(b, c))`. `Transform` layers a named
/// bijection onto its inner schema; the functions themselves are never
/// serialized and are reattached on the receiving side through a
/// [`TransformRegistry`]. `Fail` is the sentinel for "no schema
/// available".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Schema {
    Primitive(StandardType),
    Option(Box<Schema>),
    Either {
        left: Box<Schema>,
        right: Box<Schema>,
    },
    Tuple {
        first: Box<Schema>,
        second: Box<Schema>,
    },
    Sequence(Box<Schema>),
    Map {
        key: Box<Schema>,
        value: Box<Schema>,
    },
    Set(Box<Schema>),
    Record {
        name: String,
        fields: Vec<SchemaField>,
    },
    Enum {
        name: String,
        cases: Vec<SchemaCase>,
    },
    Transform {
        name: String,
        inner: Box<Schema>,
    },
    Fail(String),
}

impl Schema {
    /* ===================== Constructors ===================== */

    pub const UNIT: Schema = Schema::Primitive(StandardType::Unit);
    pub const BOOL: Schema = Schema::Primitive(StandardType::Bool);
    pub const INT: Schema = Schema::Primitive(StandardType::Int);
    pub const LONG: Schema = Schema::Primitive(StandardType::Long);
    pub const STRING: Schema = Schema::Primitive(StandardType::String);
    pub const INSTANT: Schema = Schema::Primitive(StandardType::Instant);
    pub const DURATION: Schema = Schema::Primitive(StandardType::Duration);

    pub fn option(inner: Schema) -> Schema {
        Schema::Option(Box::new(inner))
    }

    pub fn either(left: Schema, right: Schema) -> Schema {
        Schema::Either {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn pair(first: Schema, second: Schema) -> Schema {
        Schema::Tuple {
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    pub fn sequence(elem: Schema) -> Schema {
        Schema::Sequence(Box::new(elem))
    }

    pub fn map(key: Schema, value: Schema) -> Schema {
        Schema::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn set(elem: Schema) -> Schema {
        Schema::Set(Box::new(elem))
    }

    pub fn transform(name: impl Into<String>, inner: Schema) -> Schema {
        Schema::Transform {
            name: name.into(),
            inner: Box::new(inner),
        }
    }

    pub fn fail(msg: impl Into<String>) -> Schema {
        Schema::Fail(msg.into())
    }

    /// Canonical right-nested tuple shape for `items`.
    ///
    /// `[a]` stays `a`; `[a, b, c]` becomes `Tuple(a, Tuple(b, c))`.
    pub fn tuple_of(items: Vec<Schema>) -> Schema {
        let mut iter = items.into_iter().rev();
        let last = match iter.next() {
            Some(s) => s,
            None => return Schema::fail("empty tuple"),
        };
        iter.fold(last, |acc, s| Schema::pair(s, acc))
    }

    /* ===================== Tuple descent ===================== */

    /// Number of leaves in the right-nested pair spine
    pub fn tuple_arity(&self) -> u32 {
        match self {
            Schema::Tuple { second, .. } => 1 + second.tuple_arity(),
            _ => 1,
        }
    }

    /// Schema of the `index`th tuple component (0-based, left-to-right)
    pub fn tuple_component(&self, index: u32) -> Option<&Schema> {
        match (self, index) {
            (Schema::Tuple { first, .. }, 0) => Some(first.as_ref()),
            (Schema::Tuple { second, .. }, n) => second.tuple_component(n - 1),
            (leaf, 0) => Some(leaf),
            _ => None,
        }
    }

    /* ===================== Transform stripping ===================== */

    /// Shape with `Transform` layers removed, for narrowing comparisons
    pub fn erased(&self) -> Schema {
        match self {
            Schema::Transform { inner, .. } => inner.erased(),
            Schema::Option(inner) => Schema::option(inner.erased()),
            Schema::Either { left, right } => Schema::either(left.erased(), right.erased()),
            Schema::Tuple { first, second } => Schema::pair(first.erased(), second.erased()),
            Schema::Sequence(elem) => Schema::sequence(elem.erased()),
            Schema::Map { key, value } => Schema::map(key.erased(), value.erased()),
            Schema::Set(elem) => Schema::set(elem.erased()),
            Schema::Record { name, fields } => Schema::Record {
                name: name.clone(),
                fields: fields
                    .iter()
                    .map(|f| SchemaField {
                        name: f.name.clone(),
                        schema: f.schema.erased(),
                    })
                    .collect(),
            },
            Schema::Enum { name, cases } => Schema::Enum {
                name: name.clone(),
                cases: cases
                    .iter()
                    .map(|c| SchemaCase {
                        name: c.name.clone(),
                        schema: c.schema.erased(),
                    })
                    .collect(),
            },
            other => other.clone(),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Primitive(t) => write!(f, "{t}"),
            Schema::Option(inner) => write!(f, "option<{inner}>"),
            Schema::Either { left, right } => write!(f, "either<{left}, {right}>"),
            Schema::Tuple { first, second } => write!(f, "tuple<{first}, {second}>"),
            Schema::Sequence(elem) => write!(f, "list<{elem}>"),
            Schema::Map { key, value } => write!(f, "map<{key}, {value}>"),
            Schema::Set(elem) => write!(f, "set<{elem}>"),
            Schema::Record { name, .. } => write!(f, "record {name}"),
            Schema::Enum { name, .. } => write!(f, "enum {name}"),
            Schema::Transform { name, inner } => write!(f, "{inner} via {name}"),
            Schema::Fail(msg) => write!(f, "fail({msg})"),
        }
    }
}
