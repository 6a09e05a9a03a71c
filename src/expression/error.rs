//! Error types for expression construction and evaluation.

use thiserror::Error;

use crate::access::DataType;

/// Errors that can occur while building or applying an expression
#[derive(Error, Debug)]
pub enum ExpressionError {
    /// Rejected at construction time
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A dimension or selection could not be resolved on the data source
    #[error("Unsupported datatype: {0}")]
    UnsupportedDatatype(String),

    /// Invalid operand types for operator
    #[error("Invalid operand types for operator {operator}: left={left:?}, right={right:?}")]
    InvalidOperandTypes {
        operator: String,
        left: Option<DataType>,
        right: Option<DataType>,
    },

    /// Operands cannot be broadcast together
    #[error("Shape mismatch: operands of length {left} and {right} cannot be broadcast together")]
    ShapeMismatch { left: usize, right: usize },

    #[error("Division by zero")]
    DivisionByZero,

    /// A function received an argument it cannot use
    #[error("Invalid argument to {function}: {reason}")]
    InvalidArgument { function: String, reason: String },

    #[error("Cannot cast {value} to {target:?}")]
    InvalidCast { value: String, target: DataType },

    /// Raised by a data source or an external function
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

impl ExpressionError {
    pub(crate) fn invalid_argument(function: &str, reason: impl Into<String>) -> Self {
        ExpressionError::InvalidArgument {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
