//! Public constructors
//!
//! The orchestrator consumes the core through these builders: value
//! lifting (`remote`), function compilation (`fn1`), and one builder
//! per operator. Builders that can detect a schema mismatch at
//! construction return `Result` and fail early; the evaluator would
//! classify the same mismatch identically if construction checking
//! were bypassed (e.g. by decoding a hostile tree).

use crate::error::{EvalError, Result};
use crate::remote::context::fresh_name;
use crate::remote::types::expr::Expression;
use crate::remote::types::lazy::LazyExpr;
use crate::remote::types::numeric::{FractionalType, NumericType};
use crate::schema::{DynamicValue, Schema, SchemaValue};

/* ===================== Lifting and leaves ===================== */

/// Lift a host value into a literal expression
pub fn remote<A: SchemaValue>(value: &A) -> Expression {
    Expression::Literal {
        value: value.to_dynamic(),
        schema: A::schema(),
    }
}

pub fn literal(value: DynamicValue, schema: Schema) -> Expression {
    Expression::Literal { value, schema }
}

pub fn ignore() -> Expression {
    Expression::Ignore
}

pub fn variable(name: impl Into<String>, schema: Schema) -> Expression {
    Expression::Variable {
        name: name.into(),
        schema,
    }
}

/// Lift a blueprint to a value
pub fn nested(expr: Expression) -> Expression {
    Expression::Nested {
        expr: Box::new(expr),
    }
}

/// Defer construction of a subexpression until evaluation
pub fn lazy(thunk: impl Fn() -> Expression + Send + Sync + 'static) -> Expression {
    Expression::Lazy {
        expr: LazyExpr::new(thunk),
    }
}

/* ===================== Functions ===================== */

/// Compile a host closure into a serializable function
///
/// A fresh variable of the input schema is minted and passed to `f`;
/// the expression `f` returns becomes the function body. No host code
/// is captured.
pub fn fn1(
    input_schema: Schema,
    f: impl FnOnce(Expression) -> Expression,
) -> Expression {
    let input_name = fresh_name();
    let input = variable(input_name.clone(), input_schema.clone());
    Expression::EvaluatedFunction {
        input_name,
        input_schema,
        body: Box::new(f(input)),
    }
}

/// Apply a function to an argument
///
/// Fails early when the argument's schema is incompatible with the
/// function's input schema.
pub fn apply(function: Expression, argument: Expression) -> Result<Expression> {
    if let Expression::EvaluatedFunction { input_schema, .. } = &function {
        let argument_schema = argument.schema();
        if input_schema.erased() != argument_schema.erased() {
            return Err(EvalError::mismatch(input_schema, &argument_schema));
        }
    }
    Ok(Expression::Apply {
        function: Box::new(function),
        argument: Box::new(argument),
    })
}

/* ===================== Numeric ===================== */

macro_rules! numeric_binary_builder {
    ($( $name:ident => $variant:ident );+ $(;)?) => {
        $(
            pub fn $name(left: Expression, right: Expression, numeric: NumericType) -> Expression {
                Expression::$variant {
                    left: Box::new(left),
                    right: Box::new(right),
                    numeric,
                }
            }
        )+
    };
}

numeric_binary_builder! {
    add => AddNumeric;
    sub => SubNumeric;
    mul => MulNumeric;
    div => DivNumeric;
    modulo => ModNumeric;
    pow => PowNumeric;
    root => RootNumeric;
    log => LogNumeric;
    min => MinNumeric;
    max => MaxNumeric;
}

macro_rules! numeric_unary_builder {
    ($( $name:ident => $variant:ident );+ $(;)?) => {
        $(
            pub fn $name(value: Expression, numeric: NumericType) -> Expression {
                Expression::$variant {
                    value: Box::new(value),
                    numeric,
                }
            }
        )+
    };
}

numeric_unary_builder! {
    neg => NegNumeric;
    abs => AbsNumeric;
    floor => FloorNumeric;
    ceil => CeilNumeric;
    round => RoundNumeric;
}

macro_rules! fractional_builder {
    ($( $name:ident => $variant:ident );+ $(;)?) => {
        $(
            pub fn $name(value: Expression, fractional: FractionalType) -> Expression {
                Expression::$variant {
                    value: Box::new(value),
                    fractional,
                }
            }
        )+
    };
}

fractional_builder! {
    sin => SinFractional;
    asin => AsinFractional;
    atan => AtanFractional;
}

/* ===================== Boolean and comparison ===================== */

pub fn and(left: Expression, right: Expression) -> Expression {
    Expression::And {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn or(left: Expression, right: Expression) -> Expression {
    Expression::Or {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn not(value: Expression) -> Expression {
    Expression::Not {
        value: Box::new(value),
    }
}

pub fn equal(left: Expression, right: Expression) -> Expression {
    Expression::Equal {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn less_than_equal(left: Expression, right: Expression) -> Expression {
    Expression::LessThanEqual {
        left: Box::new(left),
        right: Box::new(right),
    }
}

/* ===================== Control ===================== */

/// Conditional; the arm schemas must agree structurally
pub fn branch(
    condition: Expression,
    if_true: Expression,
    if_false: Expression,
) -> Result<Expression> {
    let true_schema = if_true.schema();
    let false_schema = if_false.schema();
    if true_schema != false_schema {
        return Err(EvalError::mismatch(&true_schema, &false_schema));
    }
    Ok(Expression::Branch {
        condition: Box::new(condition),
        if_true: Box::new(if_true),
        if_false: Box::new(if_false),
    })
}

/// `x <- initial; while predicate(x) { x <- step(x) }; x`
pub fn iterate(initial: Expression, step: Expression, predicate: Expression) -> Expression {
    Expression::Iterate {
        initial: Box::new(initial),
        step: Box::new(step),
        predicate: Box::new(predicate),
    }
}

/* ===================== Either ===================== */

pub fn either_left(value: Expression, right_schema: Schema) -> Expression {
    Expression::EitherLeft {
        value: Box::new(value),
        right_schema,
    }
}

pub fn either_right(left_schema: Schema, value: Expression) -> Expression {
    Expression::EitherRight {
        left_schema,
        value: Box::new(value),
    }
}

pub fn flat_map_either(
    either: Expression,
    on_right: Expression,
    left_schema: Schema,
    right_schema: Schema,
) -> Expression {
    Expression::FlatMapEither {
        either: Box::new(either),
        on_right: Box::new(on_right),
        left_schema,
        right_schema,
    }
}

/// Fold both sides into one result; the arm schemas must agree
pub fn fold_either(
    either: Expression,
    on_left: Expression,
    on_right: Expression,
) -> Result<Expression> {
    let left_schema = on_left.schema();
    let right_schema = on_right.schema();
    if left_schema != right_schema {
        return Err(EvalError::mismatch(&left_schema, &right_schema));
    }
    Ok(Expression::FoldEither {
        either: Box::new(either),
        on_left: Box::new(on_left),
        on_right: Box::new(on_right),
    })
}

pub fn swap_either(either: Expression) -> Expression {
    Expression::SwapEither {
        either: Box::new(either),
    }
}

/* ===================== Option ===================== */

pub fn some_value(value: Expression) -> Expression {
    Expression::SomeValue {
        value: Box::new(value),
    }
}

/// Fold an option; the empty arm and the function body must agree
pub fn fold_option(
    option: Expression,
    if_none: Expression,
    if_some: Expression,
) -> Result<Expression> {
    let none_schema = if_none.schema();
    let some_schema = if_some.schema();
    if none_schema != some_schema {
        return Err(EvalError::mismatch(&none_schema, &some_schema));
    }
    Ok(Expression::FoldOption {
        option: Box::new(option),
        if_none: Box::new(if_none),
        if_some: Box::new(if_some),
    })
}

pub fn zip_option(left: Expression, right: Expression) -> Expression {
    Expression::ZipOption {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn option_contains(option: Expression, value: Expression) -> Expression {
    Expression::OptionContains {
        option: Box::new(option),
        value: Box::new(value),
    }
}

/* ===================== Try ===================== */

pub fn try_failure(error: Expression, value_schema: Schema) -> Expression {
    Expression::TryFailure {
        error: Box::new(error),
        value_schema,
    }
}

pub fn try_success(value: Expression) -> Expression {
    Expression::TrySuccess {
        value: Box::new(value),
    }
}

/* ===================== Tuples ===================== */

macro_rules! tuple_builder {
    ($( $name:ident => $variant:ident ( $($arg:ident),+ ) );+ $(;)?) => {
        $(
            pub fn $name( $($arg: Expression),+ ) -> Expression {
                Expression::$variant(vec![ $($arg),+ ])
            }
        )+
    };
}

tuple_builder! {
    tuple2 => Tuple2(a, b);
    tuple3 => Tuple3(a, b, c);
    tuple4 => Tuple4(a, b, c, d);
    tuple5 => Tuple5(a, b, c, d, e);
    tuple6 => Tuple6(a, b, c, d, e, f);
    tuple7 => Tuple7(a, b, c, d, e, f, g);
    tuple8 => Tuple8(a, b, c, d, e, f, g, h);
    tuple9 => Tuple9(a, b, c, d, e, f, g, h, i);
    tuple10 => Tuple10(a, b, c, d, e, f, g, h, i, j);
    tuple11 => Tuple11(a, b, c, d, e, f, g, h, i, j, k);
    tuple12 => Tuple12(a, b, c, d, e, f, g, h, i, j, k, l);
    tuple13 => Tuple13(a, b, c, d, e, f, g, h, i, j, k, l, m);
    tuple14 => Tuple14(a, b, c, d, e, f, g, h, i, j, k, l, m, n);
    tuple15 => Tuple15(a, b, c, d, e, f, g, h, i, j, k, l, m, n, o);
    tuple16 => Tuple16(a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p);
    tuple17 => Tuple17(a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p, q);
    tuple18 => Tuple18(a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p, q, r);
    tuple19 => Tuple19(a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p, q, r, s);
    tuple20 => Tuple20(a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p, q, r, s, t);
    tuple21 => Tuple21(a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p, q, r, s, t, u);
    tuple22 => Tuple22(a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p, q, r, s, t, u, v);
}

/// 0-based tuple component access
pub fn tuple_access(tuple: Expression, index: u32) -> Expression {
    Expression::TupleAccess {
        tuple: Box::new(tuple),
        index,
    }
}

/* ===================== Lists ===================== */

/// Prepend `head` to `list`
pub fn cons(list: Expression, head: Expression) -> Expression {
    Expression::Cons {
        list: Box::new(list),
        head: Box::new(head),
    }
}

/// `Some((head, tail))` of a non-empty list, `None` otherwise
pub fn uncons(list: Expression) -> Expression {
    Expression::UnCons {
        list: Box::new(list),
    }
}

/// Left fold; `body` receives the `(accumulator, element)` pair
pub fn fold(list: Expression, initial: Expression, body: Expression) -> Expression {
    Expression::Fold {
        list: Box::new(list),
        initial: Box::new(initial),
        body: Box::new(body),
    }
}

/* ===================== Time ===================== */

pub fn instant_from_long(seconds: Expression) -> Expression {
    Expression::InstantFromLong {
        seconds: Box::new(seconds),
    }
}

pub fn instant_from_longs(seconds: Expression, nanos: Expression) -> Expression {
    Expression::InstantFromLongs {
        seconds: Box::new(seconds),
        nanos: Box::new(nanos),
    }
}

pub fn instant_from_milli(millis: Expression) -> Expression {
    Expression::InstantFromMilli {
        millis: Box::new(millis),
    }
}

pub fn instant_from_string(string: Expression) -> Expression {
    Expression::InstantFromString {
        string: Box::new(string),
    }
}

pub fn instant_to_tuple(instant: Expression) -> Expression {
    Expression::InstantToTuple {
        instant: Box::new(instant),
    }
}

pub fn instant_plus_duration(instant: Expression, duration: Expression) -> Expression {
    Expression::InstantPlusDuration {
        instant: Box::new(instant),
        duration: Box::new(duration),
    }
}

pub fn instant_minus_duration(instant: Expression, duration: Expression) -> Expression {
    Expression::InstantMinusDuration {
        instant: Box::new(instant),
        duration: Box::new(duration),
    }
}

pub fn instant_truncate(instant: Expression, unit: Expression) -> Expression {
    Expression::InstantTruncate {
        instant: Box::new(instant),
        unit: Box::new(unit),
    }
}

pub fn duration_from_string(string: Expression) -> Expression {
    Expression::DurationFromString {
        string: Box::new(string),
    }
}

pub fn duration_between_instants(start: Expression, end: Expression) -> Expression {
    Expression::DurationBetweenInstants {
        start: Box::new(start),
        end: Box::new(end),
    }
}

pub fn duration_from_big_decimal(seconds: Expression) -> Expression {
    Expression::DurationFromBigDecimal {
        seconds: Box::new(seconds),
    }
}

pub fn duration_from_long(seconds: Expression) -> Expression {
    Expression::DurationFromLong {
        seconds: Box::new(seconds),
    }
}

pub fn duration_from_longs(seconds: Expression, nano_adjustment: Expression) -> Expression {
    Expression::DurationFromLongs {
        seconds: Box::new(seconds),
        nano_adjustment: Box::new(nano_adjustment),
    }
}

pub fn duration_from_amount(amount: Expression, unit: Expression) -> Expression {
    Expression::DurationFromAmount {
        amount: Box::new(amount),
        unit: Box::new(unit),
    }
}

pub fn duration_to_longs(duration: Expression) -> Expression {
    Expression::DurationToLongs {
        duration: Box::new(duration),
    }
}

pub fn duration_to_long(duration: Expression) -> Expression {
    Expression::DurationToLong {
        duration: Box::new(duration),
    }
}

pub fn duration_plus(left: Expression, right: Expression) -> Expression {
    Expression::DurationPlus {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn duration_minus(left: Expression, right: Expression) -> Expression {
    Expression::DurationMinus {
        left: Box::new(left),
        right: Box::new(right),
    }
}

/* ===================== Strings ===================== */

/// Number of characters in a string, as an `Int`
pub fn length(string: Expression) -> Expression {
    Expression::Length {
        string: Box::new(string),
    }
}
