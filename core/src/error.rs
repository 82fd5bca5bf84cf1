//! Evaluation errors
//!
//! Every failure the evaluator can produce maps into one of these
//! variants. The set is closed and machine-readable: callers dispatch
//! on the variant, not on message text.

use std::fmt;

use thiserror::Error;

use crate::schema::Schema;

/// Evaluation result type
pub type Result<T> = std::result::Result<T, EvalError>;

/// Evaluation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unbound variable: {0}")]
    Unbound(String),

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: Box<Schema>,
        actual: Box<Schema>,
    },

    #[error("tuple index {index} out of range for arity {arity}")]
    IndexOutOfRange { index: u32, arity: u32 },

    #[error("malformed dynamic value: {0}")]
    BadShape(String),

    #[error("arithmetic error: {0}")]
    Arithmetic(ArithmeticCause),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("iteration exceeded configured bound of {limit}")]
    IterationDiverged { limit: u64 },

    #[error("evaluation failed: {0}")]
    Failed(String),
}

impl EvalError {
    /// Build a `TypeMismatch` from two schemas.
    pub fn mismatch(expected: &Schema, actual: &Schema) -> Self {
        EvalError::TypeMismatch {
            expected: Box::new(expected.clone()),
            actual: Box::new(actual.clone()),
        }
    }
}

/// Cause of an `EvalError::Arithmetic`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticCause {
    DivideByZero,
    Overflow,
    Domain,
}

impl fmt::Display for ArithmeticCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticCause::DivideByZero => write!(f, "division by zero"),
            ArithmeticCause::Overflow => write!(f, "overflow"),
            ArithmeticCause::Domain => write!(f, "domain error"),
        }
    }
}
