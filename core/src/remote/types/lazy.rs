//! Deferred subexpressions
//!
//! `LazyExpr` defers construction of a subexpression until evaluation
//! so that self-referential blueprints have a finite representation.
//! The thunk runs at most once; the forced expression is cached and
//! shared by clones. Serialization forces the thunk and encodes the
//! materialized expression, so the deferred form never crosses the
//! wire.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::remote::types::expr::Expression;

#[derive(Clone)]
pub struct LazyExpr {
    cell: Arc<OnceLock<Expression>>,
    thunk: Option<Arc<dyn Fn() -> Expression + Send + Sync>>,
}

impl LazyExpr {
    /// Defer construction until the first `force`
    pub fn new(thunk: impl Fn() -> Expression + Send + Sync + 'static) -> Self {
        LazyExpr {
            cell: Arc::new(OnceLock::new()),
            thunk: Some(Arc::new(thunk)),
        }
    }

    /// An already-materialized deferral (what deserialization produces)
    pub fn forced(expr: Expression) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(expr);
        LazyExpr {
            cell: Arc::new(cell),
            thunk: None,
        }
    }

    /// Materialize the expression, running the thunk at most once
    pub fn force(&self) -> &Expression {
        self.cell.get_or_init(|| {
            let thunk = self
                .thunk
                .as_ref()
                .expect("LazyExpr invariant: empty cell implies a thunk");
            thunk()
        })
    }
}

impl PartialEq for LazyExpr {
    fn eq(&self, other: &Self) -> bool {
        self.force() == other.force()
    }
}

impl fmt::Debug for LazyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(expr) => f.debug_tuple("LazyExpr").field(expr).finish(),
            None => f.write_str("LazyExpr(<deferred>)"),
        }
    }
}

impl Serialize for LazyExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.force().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LazyExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Expression::deserialize(deserializer).map(LazyExpr::forced)
    }
}
