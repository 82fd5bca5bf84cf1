//! Transform codec registry
//!
//! `Schema::Transform` layers a named bijection onto an inner schema.
//! The functions are never serialized: a receiver that decodes a
//! transform schema reattaches them by looking the transform name up
//! in a registry it owns.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::schema::DynamicValue;

/// One direction of a transform bijection
pub type TransformFn = Arc<dyn Fn(&DynamicValue) -> Result<DynamicValue> + Send + Sync>;

/// An encode/decode pair for one named transform
///
/// `encode` maps the semantic value to its inner representation;
/// `decode` maps back.
#[derive(Clone)]
pub struct TransformCodec {
    pub encode: TransformFn,
    pub decode: TransformFn,
}

impl fmt::Debug for TransformCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransformCodec")
    }
}

/// Name-keyed store of transform codecs
#[derive(Debug, Default, Clone)]
pub struct TransformRegistry {
    codecs: HashMap<String, TransformCodec>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        TransformRegistry {
            codecs: HashMap::new(),
        }
    }

    /// Register a codec under `name`, replacing any previous entry
    pub fn register(
        &mut self,
        name: impl Into<String>,
        encode: TransformFn,
        decode: TransformFn,
    ) {
        self.codecs
            .insert(name.into(), TransformCodec { encode, decode });
    }

    pub fn get(&self, name: &str) -> Option<&TransformCodec> {
        self.codecs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }
}
