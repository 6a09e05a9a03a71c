//! Array-like containers produced by data sources and expression evaluation.

use serde::{Deserialize, Serialize};
use std::slice;

use crate::access::Value;
use crate::expression::{ExpressionError, ExpressionResult};

/// Values carrying an index, aligned position by position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub index: Vec<Value>,
    pub values: Vec<Value>,
}

impl Series {
    pub fn new(index: Vec<Value>, values: Vec<Value>) -> ExpressionResult<Self> {
        if index.len() != values.len() {
            return Err(ExpressionError::ShapeMismatch {
                left: index.len(),
                right: values.len(),
            });
        }
        Ok(Self { index, values })
    }
}

/// Result of extracting or evaluating a dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Data {
    /// A single aggregate value
    Scalar(Value),
    /// A plain one-dimensional array
    Array(Vec<Value>),
    /// An index-carrying array
    Series(Series),
    /// A partitioned container whose partitions are processed independently
    Chunked(Vec<Data>),
}

impl Data {
    /// Number of elements, counting a scalar as one
    pub fn len(&self) -> usize {
        match self {
            Data::Scalar(_) => 1,
            Data::Array(values) => values.len(),
            Data::Series(series) => series.values.len(),
            Data::Chunked(parts) => parts.iter().map(Data::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Data::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Index of an index-carrying container
    pub fn index(&self) -> Option<&[Value]> {
        match self {
            Data::Series(series) => Some(&series.index),
            _ => None,
        }
    }

    /// All elements in order, flattening partitions
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            Data::Scalar(value) => vec![value.clone()],
            Data::Array(values) => values.clone(),
            Data::Series(series) => series.values.clone(),
            Data::Chunked(parts) => parts.iter().flat_map(Data::to_values).collect(),
        }
    }

    /// Collapse partitions into a single container.
    ///
    /// Partitions that all carry an index are joined into one series.
    pub fn materialize(&self) -> Data {
        match self {
            Data::Chunked(parts) => {
                let parts: Vec<Data> = parts.iter().map(Data::materialize).collect();
                if !parts.is_empty() && parts.iter().all(|p| matches!(p, Data::Series(_))) {
                    let mut index = Vec::new();
                    let mut values = Vec::new();
                    for part in parts {
                        if let Data::Series(series) = part {
                            index.extend(series.index);
                            values.extend(series.values);
                        }
                    }
                    Data::Series(Series { index, values })
                } else {
                    Data::Array(parts.iter().flat_map(Data::to_values).collect())
                }
            }
            other => other.clone(),
        }
    }

    /// Rebuild a container of the same shape as `self` around new values
    pub(crate) fn with_values(&self, values: Vec<Value>) -> ExpressionResult<Data> {
        match self.materialize() {
            Data::Series(series) => Ok(Data::Series(Series::new(series.index, values)?)),
            _ => Ok(Data::Array(values)),
        }
    }

    /// Apply a function to the raw values of every partition.
    ///
    /// Index-carrying containers keep their index, partitioned containers keep
    /// their partition boundaries and are never materialized.
    pub fn map_partitions<F>(&self, f: F) -> ExpressionResult<Data>
    where
        F: Fn(&[Value]) -> ExpressionResult<Vec<Value>>,
    {
        self.map_with(&f)
    }

    fn map_with<F>(&self, f: &F) -> ExpressionResult<Data>
    where
        F: Fn(&[Value]) -> ExpressionResult<Vec<Value>>,
    {
        match self {
            Data::Scalar(value) => {
                let mut mapped = f(slice::from_ref(value))?;
                if mapped.len() != 1 {
                    return Err(ExpressionError::ShapeMismatch {
                        left: 1,
                        right: mapped.len(),
                    });
                }
                Ok(Data::Scalar(mapped.remove(0)))
            }
            Data::Array(values) => Ok(Data::Array(f(values)?)),
            Data::Series(series) => Ok(Data::Series(Series::new(
                series.index.clone(),
                f(&series.values)?,
            )?)),
            Data::Chunked(parts) => Ok(Data::Chunked(
                parts
                    .iter()
                    .map(|part| part.map_with(f))
                    .collect::<ExpressionResult<_>>()?,
            )),
        }
    }

    /// Apply a function to every element
    pub fn map_values<F>(&self, f: F) -> ExpressionResult<Data>
    where
        F: Fn(&Value) -> ExpressionResult<Value>,
    {
        self.map_with(&|values: &[Value]| -> ExpressionResult<Vec<Value>> {
            values.iter().map(&f).collect()
        })
    }

    /// Combine two containers element by element, broadcasting scalars
    pub fn zip_with<F>(&self, other: &Data, f: F) -> ExpressionResult<Data>
    where
        F: Fn(&Value, &Value) -> ExpressionResult<Value>,
    {
        self.zip_ref(other, &f)
    }

    fn zip_ref<F>(&self, other: &Data, f: &F) -> ExpressionResult<Data>
    where
        F: Fn(&Value, &Value) -> ExpressionResult<Value>,
    {
        match (self, other) {
            (Data::Scalar(a), Data::Scalar(b)) => Ok(Data::Scalar(f(a, b)?)),
            (Data::Scalar(a), rhs) => rhs.map_values(|b| f(a, b)),
            (lhs, Data::Scalar(b)) => lhs.map_values(|a| f(a, b)),
            (Data::Chunked(left), Data::Chunked(right))
                if left.len() == right.len()
                    && left.iter().zip(right).all(|(l, r)| l.len() == r.len()) =>
            {
                Ok(Data::Chunked(
                    left.iter()
                        .zip(right)
                        .map(|(l, r)| l.zip_ref(r, f))
                        .collect::<ExpressionResult<_>>()?,
                ))
            }
            (Data::Chunked(_), _) | (_, Data::Chunked(_)) => {
                self.materialize().zip_ref(&other.materialize(), f)
            }
            (lhs, rhs) => {
                let left = lhs.elements();
                let right = rhs.elements();
                if left.len() != right.len() {
                    return Err(ExpressionError::ShapeMismatch {
                        left: left.len(),
                        right: right.len(),
                    });
                }
                let values = left
                    .iter()
                    .zip(right)
                    .map(|(a, b)| f(a, b))
                    .collect::<ExpressionResult<Vec<_>>>()?;
                match lhs.index().or_else(|| rhs.index()) {
                    Some(index) => Ok(Data::Series(Series::new(index.to_vec(), values)?)),
                    None => Ok(Data::Array(values)),
                }
            }
        }
    }

    fn elements(&self) -> &[Value] {
        match self {
            Data::Scalar(value) => slice::from_ref(value),
            Data::Array(values) => values,
            Data::Series(series) => &series.values,
            Data::Chunked(_) => &[],
        }
    }
}

impl From<Vec<Value>> for Data {
    fn from(values: Vec<Value>) -> Self {
        Data::Array(values)
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Data::Scalar(value)
    }
}
