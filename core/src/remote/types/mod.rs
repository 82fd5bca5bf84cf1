//! Expression tree types

pub mod expr;
pub mod lazy;
pub mod numeric;
pub mod time;

pub use expr::{expression_schema, register_expression_transform, try_schema, Expression};
pub use lazy::LazyExpr;
pub use numeric::{FractionalType, NumericType};
