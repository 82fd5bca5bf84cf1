//! Remote expressions
//!
//! This module provides the serializable expression algebra and its
//! evaluator.
//!
//! ## Architecture
//!
//! - **Types** (`types/`): the `Expression` variant set, numeric and
//!   fractional instance selectors, deferred subexpressions and
//!   temporal helpers
//! - **Builders** (`builders.rs`): the public constructors the
//!   orchestrator uses to assemble blueprints
//! - **Evaluator** (`eval.rs`): reduces an expression to a dynamic
//!   value paired with its schema
//! - **Contexts** (`context.rs`): the variable-binding service an
//!   evaluation runs against
//!
//! Blueprints are immutable: operators share subexpressions, nothing
//! is mutated in place, and a tree survives any number of evaluations.

pub mod builders;
pub mod context;
pub mod eval;
pub mod types;

#[cfg(test)]
mod tests;

pub use context::{fresh_name, InMemoryRemoteContext, RemoteContext};
pub use eval::{eval, eval_dynamic, eval_dynamic_with, EvalOptions};
pub use types::{Expression, FractionalType, LazyExpr, NumericType};
