pub mod error;
pub mod remote;
pub mod schema;

// Re-export main types
pub use error::{ArithmeticCause, EvalError, Result};
pub use remote::{
    eval, eval_dynamic, eval_dynamic_with, EvalOptions, Expression, FractionalType,
    InMemoryRemoteContext, NumericType, RemoteContext,
};
pub use schema::{
    DynamicValue, PrimitiveValue, Schema, SchemaAndValue, SchemaValue, StandardType, TimeUnit,
    TransformRegistry,
};
