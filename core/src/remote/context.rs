//! Variable-binding contexts
//!
//! A `RemoteContext` is the per-evaluation binding service: a mapping
//! from variable name to dynamic value. Binding reads and writes are
//! the evaluator's only suspension points, so an externalized context
//! (one backed by a key-value store) is what lets the orchestrator
//! persist evaluations across restarts. The in-memory implementation
//! is all the core needs.
//!
//! Fresh names come from a process-wide atomic counter: the name
//! supply is the one piece of shared state in the core, and a name is
//! never reused within a process lifetime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::schema::DynamicValue;

/// Per-evaluation variable bindings
///
/// A context is owned by one evaluation at a time; sibling evaluations
/// use independent contexts. Each `set_variable` stores one complete
/// binding; ordering across bindings is the caller's concern.
pub trait RemoteContext {
    fn get_variable(&self, name: &str) -> Option<DynamicValue>;
    fn set_variable(&mut self, name: &str, value: DynamicValue);

    /// Mint a variable name that is unique within the process
    ///
    /// All contexts share one name supply: names minted through
    /// different contexts must still never collide.
    fn fresh_name(&mut self) -> String {
        fresh_name()
    }
}

/* ===================== Fresh names ===================== */

static FRESH_NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Mint a process-unique variable name
pub fn fresh_name() -> String {
    let n = FRESH_NAME_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("$v_{n}")
}

/* ===================== In-memory context ===================== */

/// Plain mapping-backed context
#[derive(Debug, Default, Clone)]
pub struct InMemoryRemoteContext {
    bindings: HashMap<String, DynamicValue>,
}

impl InMemoryRemoteContext {
    pub fn new() -> Self {
        InMemoryRemoteContext {
            bindings: HashMap::new(),
        }
    }
}

impl RemoteContext for InMemoryRemoteContext {
    fn get_variable(&self, name: &str) -> Option<DynamicValue> {
        let value = self.bindings.get(name).cloned();
        trace!(name, found = value.is_some(), "variable read");
        value
    }

    fn set_variable(&mut self, name: &str, value: DynamicValue) {
        trace!(name, "variable write");
        self.bindings.insert(name.to_string(), value);
    }
}
