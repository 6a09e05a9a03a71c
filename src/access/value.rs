use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::expression::{ExpressionError, ExpressionResult};

/// Data types values can be cast to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int,
    Float,
    String,
}

impl DataType {
    /// Resolve a dtype name such as `"float64"` or `"str"`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" | "boolean" => Some(DataType::Boolean),
            "int" | "int32" | "int64" => Some(DataType::Int),
            "float" | "float32" | "float64" => Some(DataType::Float),
            "str" | "string" | "object" => Some(DataType::String),
            _ => None,
        }
    }

    /// Name used when rendering the dtype inside an expression
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Boolean => "bool",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::String => "str",
        }
    }
}

/// A single element of an evaluated column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Get the data type of this value
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int(_) => Some(DataType::Int),
            Value::Float(_) => Some(DataType::Float),
            Value::String(_) => Some(DataType::String),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Booleans, integers and floats take part in arithmetic
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Boolean(_) | Value::Int(_) | Value::Float(_))
    }

    /// Numeric view of the value; booleans count as 0/1
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Null | Value::String(_) => None,
        }
    }

    /// Integer view of the value, only for booleans and integers
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Boolean(b) => Some(i64::from(*b)),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Python-style truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
        }
    }

    /// Equality that treats `1` and `1.0` as the same element
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (a, b) if a.is_numeric() && b.is_numeric() => match (a.to_i64(), b.to_i64()) {
                (Some(x), Some(y)) => x == y,
                _ => a.to_f64() == b.to_f64(),
            },
            _ => false,
        }
    }

    /// Ordering between two values.
    ///
    /// Returns `Ok(None)` when either side is null or NaN, and an error when
    /// the two types cannot be ordered at all.
    pub fn ordering(&self, other: &Value, operator: &str) -> ExpressionResult<Option<Ordering>> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => Ok(None),
            (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
            (a, b) if a.is_numeric() && b.is_numeric() => match (a.to_i64(), b.to_i64()) {
                (Some(x), Some(y)) => Ok(Some(x.cmp(&y))),
                _ => Ok(a.to_f64().partial_cmp(&b.to_f64())),
            },
            _ => Err(ExpressionError::InvalidOperandTypes {
                operator: operator.to_string(),
                left: self.data_type(),
                right: other.data_type(),
            }),
        }
    }

    /// Render the value the way a Python `repr` would
    pub fn repr(&self) -> String {
        match self {
            Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            other => other.to_display_string(),
        }
    }

    /// Render the value the way a Python `str` would
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "None".to_string(),
            Value::Boolean(true) => "True".to_string(),
            Value::Boolean(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::String(s) => s.clone(),
        }
    }

    /// Cast the value to the given data type
    pub fn cast(&self, target: DataType) -> ExpressionResult<Value> {
        let invalid = || ExpressionError::InvalidCast {
            value: self.repr(),
            target,
        };
        match target {
            DataType::Boolean => Ok(Value::Boolean(self.is_truthy())),
            DataType::Int => match self {
                Value::Boolean(_) | Value::Int(_) => Ok(Value::Int(self.to_i64().ok_or_else(invalid)?)),
                Value::Float(f) if f.is_finite() => Ok(Value::Int(f.trunc() as i64)),
                Value::String(s) => s.trim().parse().map(Value::Int).map_err(|_| invalid()),
                _ => Err(invalid()),
            },
            DataType::Float => match self {
                Value::Null => Ok(Value::Float(f64::NAN)),
                Value::String(s) => s.trim().parse().map(Value::Float).map_err(|_| invalid()),
                other => other.to_f64().map(Value::Float).ok_or_else(invalid),
            },
            DataType::String => Ok(Value::String(self.to_display_string())),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        let rendered = if f > 0.0 { "inf" } else { "-inf" };
        rendered.to_string()
    } else {
        format!("{:?}", f)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
