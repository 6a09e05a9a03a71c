//! Arguments captured by an operation, and their evaluated form.

use std::collections::BTreeMap;

use crate::access::{Data, DataType, Value};
use crate::expression::{display, Expression, ExpressionError, ExpressionResult};

/// Keyword arguments, kept sorted by name
pub type Kwargs = BTreeMap<String, Arg>;

/// An argument captured when an operation is appended
#[derive(Debug, Clone)]
pub enum Arg {
    Value(Value),
    List(Vec<Value>),
    /// Ordered key/value pairs, e.g. a category mapping
    Mapping(Vec<(Value, Value)>),
    DType(DataType),
    /// Evaluated against the same data source before the function runs
    Expr(Expression),
}

impl Arg {
    pub fn mapping<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Arg::Mapping(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Arg::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Arg::Value(Value::Null))
    }

    /// Render the argument as it appears inside an expression
    pub fn repr(&self) -> String {
        match self {
            Arg::Value(value) => value.repr(),
            Arg::List(values) => format!("[{}]", join_reprs(values)),
            Arg::Mapping(pairs) => format!(
                "{{{}}}",
                pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Arg::DType(dtype) => dtype.as_str().to_string(),
            Arg::Expr(expr) => display::embedded(expr),
        }
    }
}

fn join_reprs(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::repr)
        .collect::<Vec<_>>()
        .join(", ")
}

macro_rules! arg_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Value(value.into())
                }
            }
        )*
    };
}

arg_from_value!(Value, bool, i32, i64, f64, &str, String);

impl<T: Into<Value>> From<Vec<T>> for Arg {
    fn from(values: Vec<T>) -> Self {
        Arg::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<DataType> for Arg {
    fn from(dtype: DataType) -> Self {
        Arg::DType(dtype)
    }
}

impl From<Expression> for Arg {
    fn from(expr: Expression) -> Self {
        Arg::Expr(expr)
    }
}

impl From<&Expression> for Arg {
    fn from(expr: &Expression) -> Self {
        Arg::Expr(expr.clone())
    }
}

/// An argument after any nested expression has been evaluated
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Data(Data),
    List(Vec<Value>),
    Mapping(Vec<(Value, Value)>),
    DType(DataType),
}

impl Operand {
    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Operand::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        self.as_data().and_then(Data::as_scalar)
    }

    /// Scalar argument, treating null as absent
    pub fn as_present_scalar(&self) -> Option<&Value> {
        self.as_scalar().filter(|value| !value.is_null())
    }

    /// Sequence view of a list or an evaluated array
    pub fn to_list(&self) -> Option<Vec<Value>> {
        match self {
            Operand::List(values) => Some(values.clone()),
            Operand::Data(Data::Scalar(_)) => None,
            Operand::Data(data) => Some(data.to_values()),
            _ => None,
        }
    }

    pub fn as_dtype(&self) -> Option<DataType> {
        match self {
            Operand::DType(dtype) => Some(*dtype),
            Operand::Data(Data::Scalar(Value::String(name))) => DataType::from_name(name),
            _ => None,
        }
    }
}

/// Positional and keyword operands handed to a function.
///
/// The first positional operand is the value the operation is applied to,
/// unless the operation was appended in reversed position.
#[derive(Debug, Clone, Copy)]
pub struct CallArgs<'a> {
    pub function: &'a str,
    pub args: &'a [Operand],
    pub kwargs: &'a BTreeMap<String, Operand>,
}

impl<'a> CallArgs<'a> {
    pub fn new(
        function: &'a str,
        args: &'a [Operand],
        kwargs: &'a BTreeMap<String, Operand>,
    ) -> Self {
        Self {
            function,
            args,
            kwargs,
        }
    }

    /// Data operand at a position
    pub fn data(&self, position: usize) -> ExpressionResult<&'a Data> {
        self.args
            .get(position)
            .and_then(Operand::as_data)
            .ok_or_else(|| {
                ExpressionError::invalid_argument(
                    self.function,
                    format!("expected array-like argument at position {}", position),
                )
            })
    }

    /// Parameter passed by keyword or, failing that, by position
    pub fn param(&self, position: usize, name: &str) -> Option<&'a Operand> {
        self.kwargs.get(name).or_else(|| self.args.get(position))
    }

    /// Optional numeric parameter; null counts as not given
    pub fn number(&self, position: usize, name: &str) -> ExpressionResult<Option<f64>> {
        match self.param(position, name).and_then(Operand::as_present_scalar) {
            None => Ok(None),
            Some(value) => value.to_f64().map(Some).ok_or_else(|| {
                ExpressionError::invalid_argument(
                    self.function,
                    format!("{} must be numeric, got {}", name, value.repr()),
                )
            }),
        }
    }

    /// Boolean flag, `default` when not given
    pub fn flag(&self, position: usize, name: &str, default: bool) -> bool {
        self.param(position, name)
            .and_then(Operand::as_present_scalar)
            .map_or(default, Value::is_truthy)
    }

    /// Sequence parameter that must be present
    pub fn list(&self, position: usize, name: &str) -> ExpressionResult<Vec<Value>> {
        self.param(position, name)
            .and_then(Operand::to_list)
            .ok_or_else(|| {
                ExpressionError::invalid_argument(self.function, format!("{} must be a sequence", name))
            })
    }
}
