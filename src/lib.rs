pub mod access;
pub mod expression;
pub mod source;

pub use access::{Data, DataType, Series, Value};
pub use expression::{dim, ApplyOptions, Expression, ExpressionError, ExpressionResult};
pub use source::DataSource;
