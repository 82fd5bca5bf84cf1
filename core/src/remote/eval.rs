//! Expression evaluation
//!
//! Structural recursion over the expression tree, producing a
//! [`SchemaAndValue`]. Subexpression results are local; variable
//! bindings flow through the [`RemoteContext`]. Evaluation is strict
//! and left-to-right except where an operator is arm-selective
//! (`Branch`, `FoldEither`, `FoldOption`) or short-circuiting
//! (`And`, `Or`). `Iterate` and `Fold` are loops, so recursion depth
//! never grows with iteration count.
//!
//! ## Function Organization
//! Functions are ordered by call hierarchy:
//! 1. eval() / eval_dynamic() - public entry points
//! 2. evaluate() - the recursive dispatcher
//! 3. operator helpers, then operand extractors

use std::cmp::Ordering;

use tracing::trace;

use crate::error::{EvalError, Result};
use crate::remote::context::RemoteContext;
use crate::remote::types::expr::{expression_schema, try_schema, Expression};
use crate::remote::types::numeric::{
    FractionalOp, FractionalType, NumericBinaryOp, NumericType, NumericUnaryOp,
};
use crate::remote::types::time;
use crate::schema::{
    DynamicValue, PrimitiveValue, Schema, SchemaAndValue, SchemaValue, TimeUnit,
};

/* ===================== Public API ===================== */

/// Evaluation limits
///
/// The default imposes no iteration bound; the flow engine layers its
/// own guards.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    pub iteration_limit: Option<u64>,
}

/// Evaluate to a dynamic value paired with its schema
pub fn eval_dynamic(
    expr: &Expression,
    ctx: &mut dyn RemoteContext,
) -> Result<SchemaAndValue> {
    eval_dynamic_with(expr, ctx, &EvalOptions::default())
}

/// Evaluate with explicit limits
pub fn eval_dynamic_with(
    expr: &Expression,
    ctx: &mut dyn RemoteContext,
    options: &EvalOptions,
) -> Result<SchemaAndValue> {
    trace!(schema = %expr.schema(), "evaluating expression");
    evaluate(expr, ctx, options)
}

/// Evaluate and narrow to a typed host value
pub fn eval<A: SchemaValue>(expr: &Expression, ctx: &mut dyn RemoteContext) -> Result<A> {
    eval_dynamic(expr, ctx)?.into_typed()
}

/* ===================== Dispatcher ===================== */

fn evaluate(
    expr: &Expression,
    ctx: &mut dyn RemoteContext,
    options: &EvalOptions,
) -> Result<SchemaAndValue> {
    use Expression as E;
    match expr {
        /* ----- Leaves ----- */
        E::Literal { value, schema } => Ok(SchemaAndValue::new(schema.clone(), value.clone())),
        E::Ignore => Ok(SchemaAndValue::new(Schema::UNIT, DynamicValue::UNIT)),
        E::Variable { name, schema } => match ctx.get_variable(name) {
            Some(value) => Ok(SchemaAndValue::new(schema.clone(), value)),
            None => Err(EvalError::Unbound(name.clone())),
        },
        E::Nested { expr } => Ok(SchemaAndValue::new(expression_schema(), expr.to_dynamic()?)),
        E::Lazy { expr } => evaluate(expr.force(), ctx, options),

        /* ----- Binding ----- */
        // Evaluating a function on its own treats it as a thunk
        E::EvaluatedFunction { body, .. } => evaluate(body, ctx, options),
        E::Apply { function, argument } => {
            let argument = evaluate(argument, ctx, options)?;
            apply_function(function, argument, ctx, options)
        }

        /* ----- Numeric ----- */
        E::AddNumeric { left, right, numeric } => {
            numeric_binary(left, right, *numeric, NumericBinaryOp::Add, ctx, options)
        }
        E::SubNumeric { left, right, numeric } => {
            numeric_binary(left, right, *numeric, NumericBinaryOp::Sub, ctx, options)
        }
        E::MulNumeric { left, right, numeric } => {
            numeric_binary(left, right, *numeric, NumericBinaryOp::Mul, ctx, options)
        }
        E::DivNumeric { left, right, numeric } => {
            numeric_binary(left, right, *numeric, NumericBinaryOp::Div, ctx, options)
        }
        E::ModNumeric { left, right, numeric } => {
            numeric_binary(left, right, *numeric, NumericBinaryOp::Mod, ctx, options)
        }
        E::PowNumeric { left, right, numeric } => {
            numeric_binary(left, right, *numeric, NumericBinaryOp::Pow, ctx, options)
        }
        E::RootNumeric { left, right, numeric } => {
            numeric_binary(left, right, *numeric, NumericBinaryOp::Root, ctx, options)
        }
        E::LogNumeric { left, right, numeric } => {
            numeric_binary(left, right, *numeric, NumericBinaryOp::Log, ctx, options)
        }
        E::MinNumeric { left, right, numeric } => {
            numeric_binary(left, right, *numeric, NumericBinaryOp::Min, ctx, options)
        }
        E::MaxNumeric { left, right, numeric } => {
            numeric_binary(left, right, *numeric, NumericBinaryOp::Max, ctx, options)
        }
        E::NegNumeric { value, numeric } => {
            numeric_unary(value, *numeric, NumericUnaryOp::Neg, ctx, options)
        }
        E::AbsNumeric { value, numeric } => {
            numeric_unary(value, *numeric, NumericUnaryOp::Abs, ctx, options)
        }
        E::FloorNumeric { value, numeric } => {
            numeric_unary(value, *numeric, NumericUnaryOp::Floor, ctx, options)
        }
        E::CeilNumeric { value, numeric } => {
            numeric_unary(value, *numeric, NumericUnaryOp::Ceil, ctx, options)
        }
        E::RoundNumeric { value, numeric } => {
            numeric_unary(value, *numeric, NumericUnaryOp::Round, ctx, options)
        }

        /* ----- Fractional ----- */
        E::SinFractional { value, fractional } => {
            fractional_unary(value, *fractional, FractionalOp::Sin, ctx, options)
        }
        E::AsinFractional { value, fractional } => {
            fractional_unary(value, *fractional, FractionalOp::Asin, ctx, options)
        }
        E::AtanFractional { value, fractional } => {
            fractional_unary(value, *fractional, FractionalOp::Atan, ctx, options)
        }

        /* ----- Boolean ----- */
        E::And { left, right } => {
            // Short-circuits on a false left operand
            if !expect_bool(evaluate(left, ctx, options)?)? {
                return Ok(bool_result(false));
            }
            Ok(bool_result(expect_bool(evaluate(right, ctx, options)?)?))
        }
        E::Or { left, right } => {
            // Short-circuits on a true left operand
            if expect_bool(evaluate(left, ctx, options)?)? {
                return Ok(bool_result(true));
            }
            Ok(bool_result(expect_bool(evaluate(right, ctx, options)?)?))
        }
        E::Not { value } => Ok(bool_result(!expect_bool(evaluate(value, ctx, options)?)?)),

        /* ----- Comparison ----- */
        E::Equal { left, right } => {
            let left = evaluate(left, ctx, options)?;
            let right = evaluate(right, ctx, options)?;
            Ok(bool_result(
                left.schema == right.schema && left.value == right.value,
            ))
        }
        E::LessThanEqual { left, right } => {
            let left = evaluate(left, ctx, options)?;
            let right = evaluate(right, ctx, options)?;
            if left.schema != right.schema {
                return Err(EvalError::mismatch(&left.schema, &right.schema));
            }
            let ord = left.value.compare(&right.value)?;
            Ok(bool_result(ord != Ordering::Greater))
        }

        /* ----- Control ----- */
        E::Branch {
            condition,
            if_true,
            if_false,
        } => {
            let true_schema = if_true.schema();
            let false_schema = if_false.schema();
            if true_schema != false_schema {
                return Err(EvalError::mismatch(&true_schema, &false_schema));
            }
            if expect_bool(evaluate(condition, ctx, options)?)? {
                evaluate(if_true, ctx, options)
            } else {
                evaluate(if_false, ctx, options)
            }
        }
        E::Iterate {
            initial,
            step,
            predicate,
        } => {
            let mut current = evaluate(initial, ctx, options)?;
            let mut iterations: u64 = 0;
            loop {
                if let Some(limit) = options.iteration_limit {
                    if iterations >= limit {
                        return Err(EvalError::IterationDiverged { limit });
                    }
                }
                let keep_going =
                    expect_bool(apply_function(predicate, current.clone(), ctx, options)?)?;
                if !keep_going {
                    trace!(iterations, "iteration complete");
                    return Ok(current);
                }
                current = apply_function(step, current, ctx, options)?;
                iterations += 1;
            }
        }

        /* ----- Either ----- */
        E::EitherLeft {
            value,
            right_schema,
        } => {
            let value = evaluate(value, ctx, options)?;
            Ok(SchemaAndValue::new(
                Schema::either(value.schema, right_schema.clone()),
                DynamicValue::left(value.value),
            ))
        }
        E::EitherRight { left_schema, value } => {
            let value = evaluate(value, ctx, options)?;
            Ok(SchemaAndValue::new(
                Schema::either(left_schema.clone(), value.schema),
                DynamicValue::right(value.value),
            ))
        }
        E::FlatMapEither {
            either,
            on_right,
            left_schema,
            right_schema,
        } => {
            let either = evaluate(either, ctx, options)?;
            let (_, rs, payload) = expect_either(either)?;
            match payload {
                Side::Left(a) => Ok(SchemaAndValue::new(
                    Schema::either(left_schema.clone(), right_schema.clone()),
                    DynamicValue::left(a),
                )),
                Side::Right(b) => {
                    apply_function(on_right, SchemaAndValue::new(rs, b), ctx, options)
                }
            }
        }
        E::FoldEither {
            either,
            on_left,
            on_right,
        } => {
            // Re-checked here in case the tree bypassed the builders
            let left_schema = on_left.schema();
            let right_schema = on_right.schema();
            if left_schema != right_schema {
                return Err(EvalError::mismatch(&left_schema, &right_schema));
            }
            let either = evaluate(either, ctx, options)?;
            let (ls, rs, payload) = expect_either(either)?;
            match payload {
                Side::Left(a) => {
                    apply_function(on_left, SchemaAndValue::new(ls, a), ctx, options)
                }
                Side::Right(b) => {
                    apply_function(on_right, SchemaAndValue::new(rs, b), ctx, options)
                }
            }
        }
        E::SwapEither { either } => {
            let either = evaluate(either, ctx, options)?;
            let (ls, rs, payload) = expect_either(either)?;
            let value = match payload {
                Side::Left(a) => DynamicValue::right(a),
                Side::Right(b) => DynamicValue::left(b),
            };
            Ok(SchemaAndValue::new(Schema::either(rs, ls), value))
        }

        /* ----- Option ----- */
        E::SomeValue { value } => {
            let value = evaluate(value, ctx, options)?;
            Ok(SchemaAndValue::new(
                Schema::option(value.schema),
                DynamicValue::some(value.value),
            ))
        }
        E::FoldOption {
            option,
            if_none,
            if_some,
        } => {
            let none_schema = if_none.schema();
            let some_schema = if_some.schema();
            if none_schema != some_schema {
                return Err(EvalError::mismatch(&none_schema, &some_schema));
            }
            let option = evaluate(option, ctx, options)?;
            let (inner, payload) = expect_option(option)?;
            match payload {
                None => evaluate(if_none, ctx, options),
                Some(v) => apply_function(if_some, SchemaAndValue::new(inner, v), ctx, options),
            }
        }
        E::ZipOption { left, right } => {
            let left = evaluate(left, ctx, options)?;
            let right = evaluate(right, ctx, options)?;
            let (ls, lv) = expect_option(left)?;
            let (rs, rv) = expect_option(right)?;
            let value = match (lv, rv) {
                (Some(a), Some(b)) => DynamicValue::some(DynamicValue::pair(a, b)),
                _ => DynamicValue::None,
            };
            Ok(SchemaAndValue::new(
                Schema::option(Schema::pair(ls, rs)),
                value,
            ))
        }
        E::OptionContains { option, value } => {
            let option = evaluate(option, ctx, options)?;
            let (inner, payload) = expect_option(option)?;
            match payload {
                None => Ok(bool_result(false)),
                Some(x) => {
                    let value = evaluate(value, ctx, options)?;
                    Ok(bool_result(inner == value.schema && x == value.value))
                }
            }
        }

        /* ----- Try ----- */
        E::TryFailure {
            error,
            value_schema,
        } => {
            let error = evaluate(error, ctx, options)?;
            let throwable = expect_throwable(error)?;
            Ok(SchemaAndValue::new(
                try_schema(value_schema.clone()),
                DynamicValue::enum_case("Failure", DynamicValue::Primitive(throwable)),
            ))
        }
        E::TrySuccess { value } => {
            let value = evaluate(value, ctx, options)?;
            Ok(SchemaAndValue::new(
                try_schema(value.schema),
                DynamicValue::enum_case("Success", value.value),
            ))
        }

        /* ----- Tuples ----- */
        E::Tuple2(items) => eval_tuple(items, 2, ctx, options),
        E::Tuple3(items) => eval_tuple(items, 3, ctx, options),
        E::Tuple4(items) => eval_tuple(items, 4, ctx, options),
        E::Tuple5(items) => eval_tuple(items, 5, ctx, options),
        E::Tuple6(items) => eval_tuple(items, 6, ctx, options),
        E::Tuple7(items) => eval_tuple(items, 7, ctx, options),
        E::Tuple8(items) => eval_tuple(items, 8, ctx, options),
        E::Tuple9(items) => eval_tuple(items, 9, ctx, options),
        E::Tuple10(items) => eval_tuple(items, 10, ctx, options),
        E::Tuple11(items) => eval_tuple(items, 11, ctx, options),
        E::Tuple12(items) => eval_tuple(items, 12, ctx, options),
        E::Tuple13(items) => eval_tuple(items, 13, ctx, options),
        E::Tuple14(items) => eval_tuple(items, 14, ctx, options),
        E::Tuple15(items) => eval_tuple(items, 15, ctx, options),
        E::Tuple16(items) => eval_tuple(items, 16, ctx, options),
        E::Tuple17(items) => eval_tuple(items, 17, ctx, options),
        E::Tuple18(items) => eval_tuple(items, 18, ctx, options),
        E::Tuple19(items) => eval_tuple(items, 19, ctx, options),
        E::Tuple20(items) => eval_tuple(items, 20, ctx, options),
        E::Tuple21(items) => eval_tuple(items, 21, ctx, options),
        E::Tuple22(items) => eval_tuple(items, 22, ctx, options),
        E::TupleAccess { tuple, index } => {
            let tuple = evaluate(tuple, ctx, options)?;
            let arity = tuple.value.tuple_arity();
            let value = tuple
                .value
                .tuple_component(*index)
                .cloned()
                .ok_or(EvalError::IndexOutOfRange {
                    index: *index,
                    arity,
                })?;
            let schema = tuple
                .schema
                .tuple_component(*index)
                .cloned()
                .ok_or(EvalError::IndexOutOfRange {
                    index: *index,
                    arity,
                })?;
            Ok(SchemaAndValue::new(schema, value))
        }

        /* ----- Lists ----- */
        E::Cons { list, head } => {
            let list = evaluate(list, ctx, options)?;
            let head = evaluate(head, ctx, options)?;
            let (elem, mut items) = expect_sequence(list)?;
            if elem.erased() != head.schema.erased() {
                return Err(EvalError::mismatch(&elem, &head.schema));
            }
            items.insert(0, head.value);
            Ok(SchemaAndValue::new(
                Schema::sequence(elem),
                DynamicValue::Sequence(items),
            ))
        }
        E::UnCons { list } => {
            let list = evaluate(list, ctx, options)?;
            let (elem, items) = expect_sequence(list)?;
            let result_schema = Schema::option(Schema::pair(
                elem.clone(),
                Schema::sequence(elem),
            ));
            let value = match items.split_first() {
                None => DynamicValue::None,
                Some((head, tail)) => DynamicValue::some(DynamicValue::pair(
                    head.clone(),
                    DynamicValue::Sequence(tail.to_vec()),
                )),
            };
            Ok(SchemaAndValue::new(result_schema, value))
        }
        E::Fold {
            list,
            initial,
            body,
        } => {
            let list = evaluate(list, ctx, options)?;
            let (elem, items) = expect_sequence(list)?;
            let mut acc = evaluate(initial, ctx, options)?;
            for item in items {
                let argument = SchemaAndValue::new(
                    Schema::pair(acc.schema, elem.clone()),
                    DynamicValue::pair(acc.value, item),
                );
                acc = apply_function(body, argument, ctx, options)?;
            }
            Ok(acc)
        }

        /* ----- Time ----- */
        E::InstantFromLong { seconds } => {
            let seconds = expect_long(evaluate(seconds, ctx, options)?)?;
            instant_result(time::instant_from_seconds(seconds)?)
        }
        E::InstantFromLongs { seconds, nanos } => {
            let seconds = expect_long(evaluate(seconds, ctx, options)?)?;
            let nanos = expect_long(evaluate(nanos, ctx, options)?)?;
            instant_result(time::instant_from_longs(seconds, nanos)?)
        }
        E::InstantFromMilli { millis } => {
            let millis = expect_long(evaluate(millis, ctx, options)?)?;
            instant_result(time::instant_from_millis(millis)?)
        }
        E::InstantFromString { string } => {
            let string = expect_string(evaluate(string, ctx, options)?)?;
            instant_result(time::parse_instant(&string)?)
        }
        E::InstantToTuple { instant } => {
            let instant = expect_instant(evaluate(instant, ctx, options)?)?;
            let (seconds, nanos) = time::instant_to_longs(&instant);
            Ok(long_pair_result(seconds, nanos))
        }
        E::InstantPlusDuration { instant, duration } => {
            let instant = expect_instant(evaluate(instant, ctx, options)?)?;
            let duration = expect_duration(evaluate(duration, ctx, options)?)?;
            instant_result(time::instant_plus(&instant, &duration)?)
        }
        E::InstantMinusDuration { instant, duration } => {
            let instant = expect_instant(evaluate(instant, ctx, options)?)?;
            let duration = expect_duration(evaluate(duration, ctx, options)?)?;
            instant_result(time::instant_minus(&instant, &duration)?)
        }
        E::InstantTruncate { instant, unit } => {
            let instant = expect_instant(evaluate(instant, ctx, options)?)?;
            let unit = expect_time_unit(evaluate(unit, ctx, options)?)?;
            instant_result(time::truncate_instant(&instant, unit)?)
        }
        E::DurationFromString { string } => {
            let string = expect_string(evaluate(string, ctx, options)?)?;
            duration_result(time::parse_duration(&string)?)
        }
        E::DurationBetweenInstants { start, end } => {
            let start = expect_instant(evaluate(start, ctx, options)?)?;
            let end = expect_instant(evaluate(end, ctx, options)?)?;
            duration_result(end.signed_duration_since(start))
        }
        E::DurationFromBigDecimal { seconds } => {
            let seconds = expect_bigdecimal(evaluate(seconds, ctx, options)?)?;
            duration_result(time::duration_from_decimal_seconds(&seconds)?)
        }
        E::DurationFromLong { seconds } => {
            let seconds = expect_long(evaluate(seconds, ctx, options)?)?;
            duration_result(time::duration_from_seconds(seconds)?)
        }
        E::DurationFromLongs {
            seconds,
            nano_adjustment,
        } => {
            let seconds = expect_long(evaluate(seconds, ctx, options)?)?;
            let nano_adjustment = expect_long(evaluate(nano_adjustment, ctx, options)?)?;
            duration_result(time::duration_from_longs(seconds, nano_adjustment)?)
        }
        E::DurationFromAmount { amount, unit } => {
            let amount = expect_long(evaluate(amount, ctx, options)?)?;
            let unit = expect_time_unit(evaluate(unit, ctx, options)?)?;
            duration_result(time::duration_from_amount(amount, unit)?)
        }
        E::DurationToLongs { duration } => {
            let duration = expect_duration(evaluate(duration, ctx, options)?)?;
            let (seconds, nanos) = time::duration_to_longs(&duration);
            Ok(long_pair_result(seconds, nanos))
        }
        E::DurationToLong { duration } => {
            let duration = expect_duration(evaluate(duration, ctx, options)?)?;
            let (seconds, _) = time::duration_to_longs(&duration);
            Ok(SchemaAndValue::new(Schema::LONG, DynamicValue::long(seconds)))
        }
        E::DurationPlus { left, right } => {
            let left = expect_duration(evaluate(left, ctx, options)?)?;
            let right = expect_duration(evaluate(right, ctx, options)?)?;
            duration_result(time::duration_plus(&left, &right)?)
        }
        E::DurationMinus { left, right } => {
            let left = expect_duration(evaluate(left, ctx, options)?)?;
            let right = expect_duration(evaluate(right, ctx, options)?)?;
            duration_result(time::duration_minus(&left, &right)?)
        }

        /* ----- Strings ----- */
        E::Length { string } => {
            let string = expect_string(evaluate(string, ctx, options)?)?;
            Ok(SchemaAndValue::new(
                Schema::INT,
                DynamicValue::int(string.chars().count() as i32),
            ))
        }
    }
}

/* ===================== Operator helpers ===================== */

/// Bind `argument` to the function's input variable and evaluate its
/// body. `Lazy` wrappers around the function position are forced.
fn apply_function(
    function: &Expression,
    argument: SchemaAndValue,
    ctx: &mut dyn RemoteContext,
    options: &EvalOptions,
) -> Result<SchemaAndValue> {
    let (input_name, input_schema, body) = resolve_function(function)?;
    if input_schema.erased() != argument.schema.erased() {
        return Err(EvalError::mismatch(input_schema, &argument.schema));
    }
    ctx.set_variable(input_name, argument.value);
    evaluate(body, ctx, options)
}

fn resolve_function(function: &Expression) -> Result<(&str, &Schema, &Expression)> {
    match function {
        Expression::EvaluatedFunction {
            input_name,
            input_schema,
            body,
        } => Ok((input_name, input_schema, body)),
        Expression::Lazy { expr } => resolve_function(expr.force()),
        other => Err(EvalError::BadShape(format!(
            "expected a function, got schema {}",
            other.schema()
        ))),
    }
}

fn numeric_binary(
    left: &Expression,
    right: &Expression,
    numeric: NumericType,
    op: NumericBinaryOp,
    ctx: &mut dyn RemoteContext,
    options: &EvalOptions,
) -> Result<SchemaAndValue> {
    let left = expect_primitive(evaluate(left, ctx, options)?)?;
    let right = expect_primitive(evaluate(right, ctx, options)?)?;
    let result = numeric.apply_binary(op, &left, &right)?;
    Ok(SchemaAndValue::new(
        numeric.schema(),
        DynamicValue::Primitive(result),
    ))
}

fn numeric_unary(
    value: &Expression,
    numeric: NumericType,
    op: NumericUnaryOp,
    ctx: &mut dyn RemoteContext,
    options: &EvalOptions,
) -> Result<SchemaAndValue> {
    let value = expect_primitive(evaluate(value, ctx, options)?)?;
    let result = numeric.apply_unary(op, &value)?;
    Ok(SchemaAndValue::new(
        numeric.schema(),
        DynamicValue::Primitive(result),
    ))
}

fn fractional_unary(
    value: &Expression,
    fractional: FractionalType,
    op: FractionalOp,
    ctx: &mut dyn RemoteContext,
    options: &EvalOptions,
) -> Result<SchemaAndValue> {
    let value = expect_primitive(evaluate(value, ctx, options)?)?;
    let result = fractional.apply(op, &value)?;
    Ok(SchemaAndValue::new(
        fractional.schema(),
        DynamicValue::Primitive(result),
    ))
}

fn eval_tuple(
    items: &[Expression],
    arity: usize,
    ctx: &mut dyn RemoteContext,
    options: &EvalOptions,
) -> Result<SchemaAndValue> {
    if items.len() != arity {
        return Err(EvalError::BadShape(format!(
            "tuple of arity {arity} carries {} items",
            items.len()
        )));
    }
    let mut schemas = Vec::with_capacity(arity);
    let mut values = Vec::with_capacity(arity);
    for item in items {
        let result = evaluate(item, ctx, options)?;
        schemas.push(result.schema);
        values.push(result.value);
    }
    Ok(SchemaAndValue::new(
        Schema::tuple_of(schemas),
        DynamicValue::tuple_of(values),
    ))
}

/* ===================== Result builders ===================== */

fn bool_result(b: bool) -> SchemaAndValue {
    SchemaAndValue::new(Schema::BOOL, DynamicValue::bool(b))
}

fn instant_result(instant: chrono::DateTime<chrono::Utc>) -> Result<SchemaAndValue> {
    Ok(SchemaAndValue::new(
        Schema::INSTANT,
        DynamicValue::Primitive(PrimitiveValue::Instant(instant)),
    ))
}

fn duration_result(delta: chrono::TimeDelta) -> Result<SchemaAndValue> {
    Ok(SchemaAndValue::new(
        Schema::DURATION,
        DynamicValue::Primitive(PrimitiveValue::Duration(delta)),
    ))
}

fn long_pair_result(first: i64, second: i64) -> SchemaAndValue {
    SchemaAndValue::new(
        Schema::pair(Schema::LONG, Schema::LONG),
        DynamicValue::pair(DynamicValue::long(first), DynamicValue::long(second)),
    )
}

/* ===================== Operand extractors ===================== */

enum Side {
    Left(DynamicValue),
    Right(DynamicValue),
}

fn expect_primitive(result: SchemaAndValue) -> Result<PrimitiveValue> {
    match result.value {
        DynamicValue::Primitive(p) => Ok(p),
        _ => Err(EvalError::BadShape(format!(
            "expected a primitive value of schema {}",
            result.schema
        ))),
    }
}

fn expect_bool(result: SchemaAndValue) -> Result<bool> {
    match result.value {
        DynamicValue::Primitive(PrimitiveValue::Bool(b)) => Ok(b),
        _ => Err(EvalError::mismatch(&Schema::BOOL, &result.schema)),
    }
}

fn expect_long(result: SchemaAndValue) -> Result<i64> {
    match result.value {
        DynamicValue::Primitive(PrimitiveValue::Long(n)) => Ok(n),
        _ => Err(EvalError::mismatch(&Schema::LONG, &result.schema)),
    }
}

fn expect_string(result: SchemaAndValue) -> Result<String> {
    match result.value {
        DynamicValue::Primitive(PrimitiveValue::String(s)) => Ok(s),
        _ => Err(EvalError::mismatch(&Schema::STRING, &result.schema)),
    }
}

fn expect_instant(result: SchemaAndValue) -> Result<chrono::DateTime<chrono::Utc>> {
    match result.value {
        DynamicValue::Primitive(PrimitiveValue::Instant(i)) => Ok(i),
        _ => Err(EvalError::mismatch(&Schema::INSTANT, &result.schema)),
    }
}

fn expect_duration(result: SchemaAndValue) -> Result<chrono::TimeDelta> {
    match result.value {
        DynamicValue::Primitive(PrimitiveValue::Duration(d)) => Ok(d),
        _ => Err(EvalError::mismatch(&Schema::DURATION, &result.schema)),
    }
}

fn expect_time_unit(result: SchemaAndValue) -> Result<TimeUnit> {
    match result.value {
        DynamicValue::Primitive(PrimitiveValue::TimeUnit(u)) => Ok(u),
        _ => Err(EvalError::mismatch(
            &Schema::Primitive(crate::schema::StandardType::TimeUnit),
            &result.schema,
        )),
    }
}

fn expect_bigdecimal(result: SchemaAndValue) -> Result<bigdecimal::BigDecimal> {
    match result.value {
        DynamicValue::Primitive(PrimitiveValue::BigDecimal(d)) => Ok(d),
        _ => Err(EvalError::mismatch(
            &Schema::Primitive(crate::schema::StandardType::BigDecimal),
            &result.schema,
        )),
    }
}

fn expect_throwable(result: SchemaAndValue) -> Result<PrimitiveValue> {
    match result.value {
        DynamicValue::Primitive(p @ PrimitiveValue::Throwable { .. }) => Ok(p),
        _ => Err(EvalError::mismatch(
            &Schema::Primitive(crate::schema::StandardType::Throwable),
            &result.schema,
        )),
    }
}

fn expect_option(result: SchemaAndValue) -> Result<(Schema, Option<DynamicValue>)> {
    let inner = match strip_transforms(&result.schema) {
        Schema::Option(inner) => (**inner).clone(),
        other => {
            return Err(EvalError::BadShape(format!(
                "expected an option schema, got {other}"
            )))
        }
    };
    match result.value {
        DynamicValue::None => Ok((inner, None)),
        DynamicValue::Some(v) => Ok((inner, Some(*v))),
        other => Err(EvalError::BadShape(format!(
            "expected an option value, got {other:?}"
        ))),
    }
}

fn expect_either(result: SchemaAndValue) -> Result<(Schema, Schema, Side)> {
    let (left_schema, right_schema) = match strip_transforms(&result.schema) {
        Schema::Either { left, right } => ((**left).clone(), (**right).clone()),
        other => {
            return Err(EvalError::BadShape(format!(
                "expected an either schema, got {other}"
            )))
        }
    };
    match result.value {
        DynamicValue::Left(v) => Ok((left_schema, right_schema, Side::Left(*v))),
        DynamicValue::Right(v) => Ok((left_schema, right_schema, Side::Right(*v))),
        other => Err(EvalError::BadShape(format!(
            "expected an either value, got {other:?}"
        ))),
    }
}

fn expect_sequence(result: SchemaAndValue) -> Result<(Schema, Vec<DynamicValue>)> {
    let elem = match strip_transforms(&result.schema) {
        Schema::Sequence(elem) => (**elem).clone(),
        other => {
            return Err(EvalError::BadShape(format!(
                "expected a sequence schema, got {other}"
            )))
        }
    };
    match result.value {
        DynamicValue::Sequence(items) => Ok((elem, items)),
        other => Err(EvalError::BadShape(format!(
            "expected a sequence value, got {other:?}"
        ))),
    }
}

fn strip_transforms(schema: &Schema) -> &Schema {
    let mut current = schema;
    while let Schema::Transform { inner, .. } = current {
        current = inner;
    }
    current
}
