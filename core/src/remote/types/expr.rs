//! The expression algebra
//!
//! An `Expression` is an immutable, serializable blueprint for a
//! computation. It never embeds host code: functions are compiled into
//! a fresh variable plus a body that references it, and every variant
//! carries enough schema information to answer [`Expression::schema`]
//! without evaluating.
//!
//! The serde representation is the wire contract: a tagged sum
//! `{ "case": <Name>, "value": <payload> }` whose case names form a
//! closed set. Adding a variant is a format version bump.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::remote::types::lazy::LazyExpr;
use crate::remote::types::numeric::{FractionalType, NumericType};
use crate::schema::{DynamicValue, Schema, SchemaCase, StandardType, TransformRegistry};

/* ===================== Expression ===================== */

/// A serializable computation blueprint
///
/// Operand subexpressions are boxed; auxiliary constants (numeric
/// instance selectors, tuple indexes, missing-side schemas) ride along
/// as plain fields. Tuple variants carry their construction arity in
/// the case name; their dynamic values and schemas are always the
/// canonical right-nested pair tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "case", content = "value")]
pub enum Expression {
    /* ----- Leaves ----- */
    Literal {
        value: DynamicValue,
        schema: Schema,
    },
    Ignore,
    Variable {
        name: String,
        schema: Schema,
    },
    /// A blueprint lifted to a value
    Nested {
        expr: Box<Expression>,
    },
    /// A deferred subexpression (the only self-reference mechanism)
    Lazy {
        expr: LazyExpr,
    },

    /* ----- Binding ----- */
    /// The serializable form of a one-argument function: a freshly
    /// minted input variable and the body referencing it
    EvaluatedFunction {
        input_name: String,
        input_schema: Schema,
        body: Box<Expression>,
    },
    Apply {
        function: Box<Expression>,
        argument: Box<Expression>,
    },

    /* ----- Numeric ----- */
    AddNumeric {
        left: Box<Expression>,
        right: Box<Expression>,
        numeric: NumericType,
    },
    SubNumeric {
        left: Box<Expression>,
        right: Box<Expression>,
        numeric: NumericType,
    },
    MulNumeric {
        left: Box<Expression>,
        right: Box<Expression>,
        numeric: NumericType,
    },
    DivNumeric {
        left: Box<Expression>,
        right: Box<Expression>,
        numeric: NumericType,
    },
    ModNumeric {
        left: Box<Expression>,
        right: Box<Expression>,
        numeric: NumericType,
    },
    PowNumeric {
        left: Box<Expression>,
        right: Box<Expression>,
        numeric: NumericType,
    },
    RootNumeric {
        left: Box<Expression>,
        right: Box<Expression>,
        numeric: NumericType,
    },
    LogNumeric {
        left: Box<Expression>,
        right: Box<Expression>,
        numeric: NumericType,
    },
    MinNumeric {
        left: Box<Expression>,
        right: Box<Expression>,
        numeric: NumericType,
    },
    MaxNumeric {
        left: Box<Expression>,
        right: Box<Expression>,
        numeric: NumericType,
    },
    NegNumeric {
        value: Box<Expression>,
        numeric: NumericType,
    },
    AbsNumeric {
        value: Box<Expression>,
        numeric: NumericType,
    },
    FloorNumeric {
        value: Box<Expression>,
        numeric: NumericType,
    },
    CeilNumeric {
        value: Box<Expression>,
        numeric: NumericType,
    },
    RoundNumeric {
        value: Box<Expression>,
        numeric: NumericType,
    },

    /* ----- Fractional ----- */
    SinFractional {
        value: Box<Expression>,
        fractional: FractionalType,
    },
    AsinFractional {
        value: Box<Expression>,
        fractional: FractionalType,
    },
    AtanFractional {
        value: Box<Expression>,
        fractional: FractionalType,
    },

    /* ----- Boolean ----- */
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not {
        value: Box<Expression>,
    },

    /* ----- Comparison ----- */
    Equal {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    LessThanEqual {
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /* ----- Control ----- */
    Branch {
        condition: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
    },
    /// `x <- initial; while predicate(x) { x <- step(x) }; x`
    Iterate {
        initial: Box<Expression>,
        step: Box<Expression>,
        predicate: Box<Expression>,
    },

    /* ----- Either ----- */
    EitherLeft {
        value: Box<Expression>,
        right_schema: Schema,
    },
    EitherRight {
        left_schema: Schema,
        value: Box<Expression>,
    },
    FlatMapEither {
        either: Box<Expression>,
        on_right: Box<Expression>,
        left_schema: Schema,
        right_schema: Schema,
    },
    FoldEither {
        either: Box<Expression>,
        on_left: Box<Expression>,
        on_right: Box<Expression>,
    },
    SwapEither {
        either: Box<Expression>,
    },

    /* ----- Option ----- */
    SomeValue {
        value: Box<Expression>,
    },
    FoldOption {
        option: Box<Expression>,
        if_none: Box<Expression>,
        if_some: Box<Expression>,
    },
    ZipOption {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    OptionContains {
        option: Box<Expression>,
        value: Box<Expression>,
    },

    /* ----- Try ----- */
    TryFailure {
        error: Box<Expression>,
        value_schema: Schema,
    },
    TrySuccess {
        value: Box<Expression>,
    },

    /* ----- Tuples ----- */
    Tuple2(Vec<Expression>),
    Tuple3(Vec<Expression>),
    Tuple4(Vec<Expression>),
    Tuple5(Vec<Expression>),
    Tuple6(Vec<Expression>),
    Tuple7(Vec<Expression>),
    Tuple8(Vec<Expression>),
    Tuple9(Vec<Expression>),
    Tuple10(Vec<Expression>),
    Tuple11(Vec<Expression>),
    Tuple12(Vec<Expression>),
    Tuple13(Vec<Expression>),
    Tuple14(Vec<Expression>),
    Tuple15(Vec<Expression>),
    Tuple16(Vec<Expression>),
    Tuple17(Vec<Expression>),
    Tuple18(Vec<Expression>),
    Tuple19(Vec<Expression>),
    Tuple20(Vec<Expression>),
    Tuple21(Vec<Expression>),
    Tuple22(Vec<Expression>),
    /// 0-based component access, counting leaves from the left
    TupleAccess {
        tuple: Box<Expression>,
        index: u32,
    },

    /* ----- Lists ----- */
    /// Prepend `head` to `list` (note the operand order)
    Cons {
        list: Box<Expression>,
        head: Box<Expression>,
    },
    UnCons {
        list: Box<Expression>,
    },
    /// Left fold; `body` is applied to the `(accumulator, element)` pair
    Fold {
        list: Box<Expression>,
        initial: Box<Expression>,
        body: Box<Expression>,
    },

    /* ----- Time ----- */
    InstantFromLong {
        seconds: Box<Expression>,
    },
    InstantFromLongs {
        seconds: Box<Expression>,
        nanos: Box<Expression>,
    },
    InstantFromMilli {
        millis: Box<Expression>,
    },
    InstantFromString {
        string: Box<Expression>,
    },
    InstantToTuple {
        instant: Box<Expression>,
    },
    InstantPlusDuration {
        instant: Box<Expression>,
        duration: Box<Expression>,
    },
    InstantMinusDuration {
        instant: Box<Expression>,
        duration: Box<Expression>,
    },
    InstantTruncate {
        instant: Box<Expression>,
        unit: Box<Expression>,
    },
    DurationFromString {
        string: Box<Expression>,
    },
    DurationBetweenInstants {
        start: Box<Expression>,
        end: Box<Expression>,
    },
    DurationFromBigDecimal {
        seconds: Box<Expression>,
    },
    DurationFromLong {
        seconds: Box<Expression>,
    },
    DurationFromLongs {
        seconds: Box<Expression>,
        nano_adjustment: Box<Expression>,
    },
    DurationFromAmount {
        amount: Box<Expression>,
        unit: Box<Expression>,
    },
    DurationToLongs {
        duration: Box<Expression>,
    },
    DurationToLong {
        duration: Box<Expression>,
    },
    DurationPlus {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    DurationMinus {
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /* ----- Strings ----- */
    Length {
        string: Box<Expression>,
    },
}

impl Expression {
    /// Schema of the value this expression evaluates to
    ///
    /// Answerable without evaluating; where the operand shapes make a
    /// schema underivable (e.g. `UnCons` of a non-sequence) the result
    /// is `Schema::Fail`, and evaluation of such an expression fails
    /// with the corresponding error.
    pub fn schema(&self) -> Schema {
        use Expression as E;
        match self {
            E::Literal { schema, .. } => schema.clone(),
            E::Ignore => Schema::UNIT,
            E::Variable { schema, .. } => schema.clone(),
            E::Nested { .. } => expression_schema(),
            E::Lazy { expr } => expr.force().schema(),

            E::EvaluatedFunction { body, .. } => body.schema(),
            E::Apply { function, .. } => function.schema(),

            E::AddNumeric { numeric, .. }
            | E::SubNumeric { numeric, .. }
            | E::MulNumeric { numeric, .. }
            | E::DivNumeric { numeric, .. }
            | E::ModNumeric { numeric, .. }
            | E::PowNumeric { numeric, .. }
            | E::RootNumeric { numeric, .. }
            | E::LogNumeric { numeric, .. }
            | E::MinNumeric { numeric, .. }
            | E::MaxNumeric { numeric, .. }
            | E::NegNumeric { numeric, .. }
            | E::AbsNumeric { numeric, .. }
            | E::FloorNumeric { numeric, .. }
            | E::CeilNumeric { numeric, .. }
            | E::RoundNumeric { numeric, .. } => numeric.schema(),

            E::SinFractional { fractional, .. }
            | E::AsinFractional { fractional, .. }
            | E::AtanFractional { fractional, .. } => fractional.schema(),

            E::And { .. }
            | E::Or { .. }
            | E::Not { .. }
            | E::Equal { .. }
            | E::LessThanEqual { .. }
            | E::OptionContains { .. } => Schema::BOOL,

            E::Branch { if_true, .. } => if_true.schema(),
            E::Iterate { initial, .. } => initial.schema(),

            E::EitherLeft {
                value,
                right_schema,
            } => Schema::either(value.schema(), right_schema.clone()),
            E::EitherRight { left_schema, value } => {
                Schema::either(left_schema.clone(), value.schema())
            }
            E::FlatMapEither {
                left_schema,
                right_schema,
                ..
            } => Schema::either(left_schema.clone(), right_schema.clone()),
            E::FoldEither { on_left, .. } => on_left.schema(),
            E::SwapEither { either } => match either.schema() {
                Schema::Either { left, right } => Schema::Either {
                    left: right,
                    right: left,
                },
                other => Schema::fail(format!("swap of non-either schema {other}")),
            },

            E::SomeValue { value } => Schema::option(value.schema()),
            E::FoldOption { if_none, .. } => if_none.schema(),
            E::ZipOption { left, right } => match (left.schema(), right.schema()) {
                (Schema::Option(a), Schema::Option(b)) => {
                    Schema::option(Schema::Tuple { first: a, second: b })
                }
                (a, b) => Schema::fail(format!("zip of non-option schemas {a}, {b}")),
            },

            E::TryFailure { value_schema, .. } => try_schema(value_schema.clone()),
            E::TrySuccess { value } => try_schema(value.schema()),

            E::Tuple2(items)
            | E::Tuple3(items)
            | E::Tuple4(items)
            | E::Tuple5(items)
            | E::Tuple6(items)
            | E::Tuple7(items)
            | E::Tuple8(items)
            | E::Tuple9(items)
            | E::Tuple10(items)
            | E::Tuple11(items)
            | E::Tuple12(items)
            | E::Tuple13(items)
            | E::Tuple14(items)
            | E::Tuple15(items)
            | E::Tuple16(items)
            | E::Tuple17(items)
            | E::Tuple18(items)
            | E::Tuple19(items)
            | E::Tuple20(items)
            | E::Tuple21(items)
            | E::Tuple22(items) => {
                Schema::tuple_of(items.iter().map(Expression::schema).collect())
            }
            E::TupleAccess { tuple, index } => {
                let tuple_schema = tuple.schema();
                match tuple_schema.tuple_component(*index) {
                    Some(s) => s.clone(),
                    None => Schema::fail(format!(
                        "index {index} out of range for {tuple_schema}"
                    )),
                }
            }

            E::Cons { list, .. } => list.schema(),
            E::UnCons { list } => match list.schema() {
                Schema::Sequence(elem) => Schema::option(Schema::pair(
                    (*elem).clone(),
                    Schema::Sequence(elem),
                )),
                other => Schema::fail(format!("uncons of non-sequence schema {other}")),
            },
            E::Fold { initial, .. } => initial.schema(),

            E::InstantFromLong { .. }
            | E::InstantFromLongs { .. }
            | E::InstantFromMilli { .. }
            | E::InstantFromString { .. }
            | E::InstantPlusDuration { .. }
            | E::InstantMinusDuration { .. }
            | E::InstantTruncate { .. } => Schema::INSTANT,
            E::InstantToTuple { .. } | E::DurationToLongs { .. } => {
                Schema::pair(Schema::LONG, Schema::LONG)
            }
            E::DurationFromString { .. }
            | E::DurationBetweenInstants { .. }
            | E::DurationFromBigDecimal { .. }
            | E::DurationFromLong { .. }
            | E::DurationFromLongs { .. }
            | E::DurationFromAmount { .. }
            | E::DurationPlus { .. }
            | E::DurationMinus { .. } => Schema::DURATION,
            E::DurationToLong { .. } => Schema::LONG,

            E::Length { .. } => Schema::INT,
        }
    }

    /// Dynamic form of a blueprint lifted to a value (what `Nested`
    /// evaluates to): the expression serialized to its JSON encoding,
    /// carried as a transform over a string
    pub fn to_dynamic(&self) -> Result<DynamicValue> {
        let json = serde_json::to_string(self)
            .map_err(|e| EvalError::Failed(format!("expression encoding failed: {e}")))?;
        Ok(DynamicValue::string(json))
    }

    /// Recover a blueprint from its dynamic form
    pub fn from_dynamic(value: &DynamicValue) -> Result<Expression> {
        match value {
            DynamicValue::Primitive(crate::schema::PrimitiveValue::String(json)) => {
                serde_json::from_str(json)
                    .map_err(|e| EvalError::BadShape(format!("expression decoding failed: {e}")))
            }
            other => Err(EvalError::BadShape(format!(
                "expected encoded expression string, got {other:?}"
            ))),
        }
    }
}

/* ===================== Derived schemas ===================== */

/// Name of the transform that carries encoded expressions
pub const EXPRESSION_TRANSFORM: &str = "Expression";

/// Schema of a blueprint lifted to a value: a named transform over the
/// expression's string encoding
pub fn expression_schema() -> Schema {
    Schema::transform(EXPRESSION_TRANSFORM, Schema::STRING)
}

/// Schema of a `Try` result: `Failure(throwable) | Success(value)`
pub fn try_schema(success: Schema) -> Schema {
    Schema::Enum {
        name: "Try".to_string(),
        cases: vec![
            SchemaCase {
                name: "Failure".to_string(),
                schema: Schema::Primitive(StandardType::Throwable),
            },
            SchemaCase {
                name: "Success".to_string(),
                schema: success,
            },
        ],
    }
}

/// Register the expression transform codec so a receiver can validate
/// encoded blueprints after decoding a transform schema
pub fn register_expression_transform(registry: &mut TransformRegistry) {
    fn validate(value: &DynamicValue) -> Result<DynamicValue> {
        Expression::from_dynamic(value)?;
        Ok(value.clone())
    }
    registry.register(
        EXPRESSION_TRANSFORM,
        std::sync::Arc::new(validate),
        std::sync::Arc::new(validate),
    );
}
