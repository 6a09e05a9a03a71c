//! Deferred expressions over named data dimensions.
//!
//! This module provides:
//! - Expression construction and composition through operators and methods
//! - Function tags with display names and evaluation rules
//! - A runtime registry of custom transforms
//! - Readable rendering of expressions
//! - Evaluation against any [`DataSource`](crate::source::DataSource)

pub mod arg;
mod display;
pub mod error;
pub mod eval;
pub mod expr;
pub mod function;
pub mod operator;
pub mod registry;
pub mod transform;

pub use arg::{Arg, CallArgs, Kwargs, Operand};
pub use error::{ExpressionError, ExpressionResult};
pub use eval::{ApplyOptions, DimensionRange, ExpressionEvaluator};
pub use expr::{dim, Expression, Operation};
pub use function::{Builtin, CustomFunction, Function, Reduction, Transform, Ufunc};
pub use operator::{BinaryOperator, UnaryOperator};
pub use registry::register;
