//! Evaluation rules for builtins, reductions, transforms and ufuncs.
//!
//! Element-wise functions go through [`Data::map_partitions`] so that
//! index-carrying containers keep their index and partitioned containers
//! are processed one partition at a time. Null elements are treated as
//! missing: element-wise functions pass them through and aggregations skip
//! them.

use std::cmp::Ordering;

use crate::access::{Data, DataType, Value};
use crate::expression::arg::{CallArgs, Operand};
use crate::expression::function::{Reduction, Transform, Ufunc};
use crate::expression::operator::BinaryOperator;
use crate::expression::{ExpressionError, ExpressionResult};

const EMPTY_REDUCTION: &str = "zero-size array to reduction operation which has no identity";

fn numeric(function: &str, value: &Value) -> ExpressionResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| ExpressionError::InvalidOperandTypes {
            operator: function.to_string(),
            left: value.data_type(),
            right: None,
        })
}

fn numeric_list(function: &str, values: &[Value]) -> ExpressionResult<Vec<f64>> {
    values
        .iter()
        .map(|value| {
            value.to_f64().ok_or_else(|| {
                ExpressionError::invalid_argument(
                    function,
                    format!("expected numeric bin edges, got {}", value.repr()),
                )
            })
        })
        .collect()
}

/// Apply a float function to a non-null element
fn scale(function: &str, value: &Value, f: impl Fn(f64) -> f64) -> ExpressionResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Float(f(numeric(function, value)?)))
}

/// Minimum and maximum of the non-null elements
fn extent(function: &str, data: &Data) -> ExpressionResult<Option<(f64, f64)>> {
    let mut bounds: Option<(f64, f64)> = None;
    for value in data.to_values().iter().filter(|v| !v.is_null()) {
        let x = numeric(function, value)?;
        bounds = Some(match bounds {
            None => (x, x),
            Some((lo, hi)) => (lo.min(x), hi.max(x)),
        });
    }
    Ok(bounds)
}

fn resolve_limits(
    function: &str,
    data: &Data,
    min: Option<f64>,
    max: Option<f64>,
) -> ExpressionResult<(f64, f64)> {
    if let (Some(lo), Some(hi)) = (min, max) {
        return Ok((lo, hi));
    }
    let (lo, hi) = extent(function, data)?.unwrap_or((f64::NAN, f64::NAN));
    Ok((min.unwrap_or(lo), max.unwrap_or(hi)))
}

/// Unity-based normalization, `(values - min) / (max - min)`.
///
/// Missing bounds default to the data's own minimum and maximum.
pub fn norm(values: &Data, min: Option<f64>, max: Option<f64>) -> ExpressionResult<Data> {
    let (min, max) = resolve_limits("norm", values, min, max)?;
    values.map_values(|v| scale("norm", v, |x| (x - min) / (max - min)))
}

/// Unity-based normalization in log space
pub fn lognorm(values: &Data, min: Option<f64>, max: Option<f64>) -> ExpressionResult<Data> {
    let (min, max) = resolve_limits("lognorm", values, min, max)?;
    let (lo, hi) = (min.ln(), max.ln());
    values.map_values(|v| scale("lognorm", v, |x| (x.ln() - lo) / (hi - lo)))
}

/// Assign each value the label of the `(lower, upper]` bin it falls in.
///
/// Labels default to the bin centers. Values outside every bin get NaN when
/// the labels are floating point and null otherwise.
pub fn bin(values: &Data, bins: &[Value], labels: Option<&[Value]>) -> ExpressionResult<Data> {
    let edges = numeric_list("bin", bins)?;
    let labels: Vec<Value> = match labels {
        Some(labels) => labels.to_vec(),
        None => edges
            .windows(2)
            .map(|w| Value::Float(w[0] + (w[1] - w[0]) / 2.0))
            .collect(),
    };
    let float_labels = labels
        .iter()
        .all(|l| matches!(l, Value::Boolean(_) | Value::Int(_) | Value::Float(_)))
        && (labels.is_empty() || labels.iter().any(|l| matches!(l, Value::Float(_))));
    let (labels, missing) = if float_labels {
        let labels = labels
            .iter()
            .map(|l| Value::Float(l.to_f64().unwrap_or(f64::NAN)))
            .collect();
        (labels, Value::Float(f64::NAN))
    } else {
        (labels, Value::Null)
    };

    values.map_partitions(|part| {
        part.iter()
            .map(|value| {
                if value.is_null() {
                    return Ok(missing.clone());
                }
                let x = numeric("bin", value)?;
                let mut binned = missing.clone();
                for ((lower, upper), label) in edges.iter().zip(edges.iter().skip(1)).zip(&labels) {
                    if x > *lower && x <= *upper {
                        binned = label.clone();
                    }
                }
                Ok(binned)
            })
            .collect()
    })
}

/// Categories a set of discrete values is mapped onto
#[derive(Debug, Clone, Copy)]
pub enum Categories<'a> {
    /// Matched by position among the distinct values, in first-seen order
    List(&'a [Value]),
    /// Matched by direct lookup
    Mapping(&'a [(Value, Value)]),
}

/// Replace discrete values with the supplied categories
pub fn categorize(
    values: &Data,
    categories: Categories<'_>,
    default: &Value,
) -> ExpressionResult<Data> {
    values.map_partitions(|part| {
        let mut distinct: Vec<&Value> = Vec::new();
        for value in part {
            if !distinct.iter().any(|seen| seen.loose_eq(value)) {
                distinct.push(value);
            }
        }
        Ok(part
            .iter()
            .map(|value| {
                let category = match categories {
                    Categories::List(list) => distinct
                        .iter()
                        .position(|seen| seen.loose_eq(value))
                        .and_then(|idx| list.get(idx)),
                    Categories::Mapping(pairs) => pairs
                        .iter()
                        .find(|(key, _)| key.loose_eq(value))
                        .map(|(_, category)| category),
                };
                category.cloned().unwrap_or_else(|| default.clone())
            })
            .collect())
    })
}

/// Indices of the bins each value belongs to
pub fn digitize(values: &Data, bins: &[Value], right: bool) -> ExpressionResult<Data> {
    let edges = numeric_list("digitize", bins)?;
    let increasing = edges.windows(2).all(|w| w[0] <= w[1]);
    let decreasing = edges.windows(2).all(|w| w[0] >= w[1]);
    if !increasing && !decreasing {
        return Err(ExpressionError::invalid_argument(
            "digitize",
            "bins must be monotonically increasing or decreasing",
        ));
    }
    values.map_values(|value| {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let x = numeric("digitize", value)?;
        let count = if x.is_nan() {
            if increasing {
                edges.len()
            } else {
                0
            }
        } else if increasing {
            edges.iter().filter(|b| if right { **b < x } else { **b <= x }).count()
        } else {
            edges.iter().filter(|b| if right { **b >= x } else { **b > x }).count()
        };
        Ok(Value::Int(count as i64))
    })
}

/// Whether each value is one of the test elements
pub fn isin(values: &Data, test_elements: &[Value], invert: bool) -> ExpressionResult<Data> {
    values.map_values(|value| {
        let found = test_elements.iter().any(|t| t.loose_eq(value));
        Ok(Value::Boolean(found != invert))
    })
}

pub fn astype(values: &Data, dtype: DataType) -> ExpressionResult<Data> {
    values.map_values(|value| value.cast(dtype))
}

/// Round half to even at the given number of decimals
pub fn round(values: &Data, decimals: i32) -> ExpressionResult<Data> {
    values.map_values(|value| match value {
        Value::Null => Ok(Value::Null),
        Value::Boolean(_) | Value::Int(_) if decimals >= 0 => {
            Ok(Value::Int(value.to_i64().unwrap_or_default()))
        }
        Value::Boolean(_) | Value::Int(_) => {
            let factor = 10f64.powi(-decimals);
            let x = value.to_f64().unwrap_or_default();
            Ok(Value::Int(((x / factor).round_ties_even() * factor) as i64))
        }
        Value::Float(f) if decimals > 15 || !f.is_finite() => Ok(Value::Float(*f)),
        Value::Float(f) => {
            let factor = 10f64.powi(decimals);
            Ok(Value::Float((f * factor).round_ties_even() / factor))
        }
        Value::String(_) => Err(ExpressionError::InvalidOperandTypes {
            operator: "round".to_string(),
            left: value.data_type(),
            right: None,
        }),
    })
}

pub fn abs(values: &Data) -> ExpressionResult<Data> {
    values.map_values(|value| match value {
        Value::Null => Ok(Value::Null),
        Value::Boolean(_) | Value::Int(_) => {
            Ok(Value::Int(value.to_i64().unwrap_or_default().wrapping_abs()))
        }
        Value::Float(f) => Ok(Value::Float(f.abs())),
        Value::String(_) => Err(ExpressionError::InvalidOperandTypes {
            operator: "abs".to_string(),
            left: value.data_type(),
            right: None,
        }),
    })
}

/// Limit values to `[min, max]`
pub fn clip(values: &Data, min: Option<&Value>, max: Option<&Value>) -> ExpressionResult<Data> {
    let float_bounds = [min, max]
        .iter()
        .flatten()
        .any(|bound| matches!(bound, Value::Float(_)));
    values.map_values(|value| {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let mut clipped = value;
        if let Some(lo) = min {
            if clipped.ordering(lo, "clip")? == Some(Ordering::Less) {
                clipped = lo;
            }
        }
        if let Some(hi) = max {
            if clipped.ordering(hi, "clip")? == Some(Ordering::Greater) {
                clipped = hi;
            }
        }
        if float_bounds || matches!(value, Value::Float(_)) {
            Ok(Value::Float(numeric("clip", clipped)?))
        } else {
            Ok(clipped.clone())
        }
    })
}

pub fn ufunc(ufunc: Ufunc, values: &Data) -> ExpressionResult<Data> {
    values.map_values(|value| match (ufunc, value) {
        (_, Value::Null) => Ok(Value::Null),
        (Ufunc::Absolute, Value::Int(i)) => Ok(Value::Int(i.wrapping_abs())),
        (Ufunc::Square, Value::Int(i)) => Ok(Value::Int(i.wrapping_mul(*i))),
        _ => scale(ufunc.name(), value, |x| ufunc.evaluate(x)),
    })
}

pub(crate) fn reduce(reduction: Reduction, call: &CallArgs<'_>) -> ExpressionResult<Data> {
    let data = call.data(0)?;
    match reduction {
        Reduction::Log => data.map_values(|v| scale("log", v, f64::ln)),
        Reduction::Log10 => data.map_values(|v| scale("log10", v, f64::log10)),
        Reduction::Clip => clip(
            data,
            call.param(1, "min").and_then(Operand::as_present_scalar),
            call.param(2, "max").and_then(Operand::as_present_scalar),
        ),
        Reduction::Cumsum => cumulative(BinaryOperator::Add, data),
        Reduction::Cumprod => cumulative(BinaryOperator::Mul, data),
        _ => {
            let ddof = call.number(1, "ddof")?.unwrap_or(0.0);
            aggregate(reduction, &data.to_values(), ddof).map(Data::Scalar)
        }
    }
}

fn aggregate(reduction: Reduction, values: &[Value], ddof: f64) -> ExpressionResult<Value> {
    let name = reduction.name();
    let present: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
    match reduction {
        Reduction::Any => Ok(Value::Boolean(present.iter().any(|v| v.is_truthy()))),
        Reduction::All => Ok(Value::Boolean(present.iter().all(|v| v.is_truthy()))),
        Reduction::Sum => {
            if present.iter().all(|v| v.to_i64().is_some()) {
                let total = present
                    .iter()
                    .filter_map(|v| v.to_i64())
                    .fold(0i64, i64::wrapping_add);
                Ok(Value::Int(total))
            } else {
                let numbers = present
                    .iter()
                    .map(|v| numeric(name, v))
                    .collect::<ExpressionResult<Vec<_>>>()?;
                Ok(Value::Float(numbers.iter().sum()))
            }
        }
        Reduction::Mean => {
            let numbers = present
                .iter()
                .map(|v| numeric(name, v))
                .collect::<ExpressionResult<Vec<_>>>()?;
            Ok(Value::Float(mean(&numbers)))
        }
        Reduction::Std | Reduction::Var => {
            let numbers = present
                .iter()
                .map(|v| numeric(name, v))
                .collect::<ExpressionResult<Vec<_>>>()?;
            let dof = numbers.len() as f64 - ddof;
            let variance = if dof <= 0.0 {
                f64::NAN
            } else {
                let center = mean(&numbers);
                numbers.iter().map(|x| (x - center).powi(2)).sum::<f64>() / dof
            };
            Ok(Value::Float(if reduction == Reduction::Std {
                variance.sqrt()
            } else {
                variance
            }))
        }
        Reduction::Min | Reduction::Max => extreme(reduction, &present),
        _ => Err(ExpressionError::invalid_argument(name, "not an aggregation")),
    }
}

fn mean(numbers: &[f64]) -> f64 {
    if numbers.is_empty() {
        f64::NAN
    } else {
        numbers.iter().sum::<f64>() / numbers.len() as f64
    }
}

fn extreme(reduction: Reduction, present: &[&Value]) -> ExpressionResult<Value> {
    let wanted = if reduction == Reduction::Min {
        Ordering::Less
    } else {
        Ordering::Greater
    };
    let mut best: Option<&Value> = None;
    for value in present.iter().copied() {
        if matches!(value, Value::Float(f) if f.is_nan()) {
            return Ok(Value::Float(f64::NAN));
        }
        best = match best {
            None => Some(value),
            Some(current) if value.ordering(current, reduction.name())? == Some(wanted) => {
                Some(value)
            }
            keep => keep,
        };
    }
    best.cloned()
        .ok_or_else(|| ExpressionError::invalid_argument(reduction.name(), EMPTY_REDUCTION))
}

/// Running sum or product; nulls keep their position and are skipped
fn cumulative(op: BinaryOperator, data: &Data) -> ExpressionResult<Data> {
    let mut running: Option<Value> = None;
    let mut out = Vec::with_capacity(data.len());
    for value in data.to_values() {
        if value.is_null() {
            out.push(Value::Null);
            continue;
        }
        let next = match &running {
            Some(acc) => op.evaluate(acc, &value)?,
            None if value.is_numeric() => match value {
                Value::Boolean(b) => Value::Int(i64::from(b)),
                other => other,
            },
            None => {
                return Err(ExpressionError::InvalidOperandTypes {
                    operator: op.as_str().to_string(),
                    left: value.data_type(),
                    right: None,
                })
            }
        };
        running = Some(next.clone());
        out.push(next);
    }
    data.with_values(out)
}

pub(crate) fn transform(transform: Transform, call: &CallArgs<'_>) -> ExpressionResult<Data> {
    let data = call.data(0)?;
    match transform {
        Transform::Norm => norm(data, call.number(1, "min")?, call.number(2, "max")?),
        Transform::LogNorm => lognorm(data, call.number(1, "min")?, call.number(2, "max")?),
        Transform::Bin => {
            let bins = call.list(1, "bins")?;
            let labels = call.param(2, "labels").and_then(Operand::to_list);
            bin(data, &bins, labels.as_deref())
        }
        Transform::Categorize => {
            let default = call
                .param(2, "default")
                .and_then(Operand::as_scalar)
                .cloned()
                .unwrap_or(Value::Null);
            match call.param(1, "categories") {
                Some(Operand::Mapping(pairs)) => {
                    categorize(data, Categories::Mapping(pairs), &default)
                }
                Some(operand) => match operand.to_list() {
                    Some(list) => categorize(data, Categories::List(&list), &default),
                    None => Err(ExpressionError::invalid_argument(
                        "categorize",
                        "categories must be a list or a mapping",
                    )),
                },
                None => Err(ExpressionError::invalid_argument(
                    "categorize",
                    "categories must be given",
                )),
            }
        }
        Transform::Digitize => digitize(data, &call.list(1, "bins")?, call.flag(2, "right", false)),
        Transform::IsIn => isin(
            data,
            &call.list(1, "test_elements")?,
            call.flag(2, "invert", false),
        ),
        Transform::AsType => {
            let dtype = call
                .param(1, "dtype")
                .and_then(Operand::as_dtype)
                .ok_or_else(|| ExpressionError::invalid_argument("astype", "unknown dtype"))?;
            astype(data, dtype)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Series;

    fn array<T: Into<Value>>(values: Vec<T>) -> Data {
        Data::Array(values.into_iter().map(Into::into).collect())
    }

    fn floats(data: &Data) -> Vec<f64> {
        data.to_values()
            .iter()
            .map(|v| v.to_f64().unwrap())
            .collect()
    }

    #[test]
    fn test_norm() {
        let data = array(vec![0, 5, 10]);
        assert_eq!(floats(&norm(&data, None, None).unwrap()), vec![0.0, 0.5, 1.0]);
        assert_eq!(
            floats(&norm(&data, Some(0.0), Some(20.0)).unwrap()),
            vec![0.0, 0.25, 0.5]
        );
        assert_eq!(
            floats(&norm(&data, None, Some(20.0)).unwrap()),
            vec![0.0, 0.25, 0.5]
        );
    }

    #[test]
    fn test_norm_passes_nulls_and_rejects_strings() {
        let data = Data::Array(vec![Value::Int(0), Value::Null, Value::Int(4)]);
        let result = norm(&data, None, None).unwrap();
        assert_eq!(
            result,
            Data::Array(vec![Value::Float(0.0), Value::Null, Value::Float(1.0)])
        );
        assert!(norm(&array(vec!["a"]), None, None).is_err());
    }

    #[test]
    fn test_lognorm() {
        let data = array(vec![1.0, 10.0, 100.0]);
        let result = floats(&lognorm(&data, None, None).unwrap());
        assert!((result[0] - 0.0).abs() < 1e-12);
        assert!((result[1] - 0.5).abs() < 1e-12);
        assert!((result[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bin_boundaries_and_labels() {
        let bins = vec![Value::Int(0), Value::Int(10), Value::Int(20)];
        let result = bin(&array(vec![5, 10, 11, 25]), &bins, None).unwrap();
        let values = result.to_values();
        assert_eq!(values[0], Value::Float(5.0));
        assert_eq!(values[1], Value::Float(5.0));
        assert_eq!(values[2], Value::Float(15.0));
        assert!(matches!(values[3], Value::Float(f) if f.is_nan()));

        let labels = vec![Value::from("low"), Value::from("high")];
        let result = bin(&array(vec![0, 10, 20]), &bins, Some(&labels)).unwrap();
        assert_eq!(
            result.to_values(),
            vec![Value::Null, Value::from("low"), Value::from("high")]
        );
    }

    #[test]
    fn test_bin_integer_labels_use_null_sentinel() {
        let bins = vec![Value::Int(0), Value::Int(1)];
        let labels = vec![Value::Int(7)];
        let result = bin(&array(vec![0.5, 3.0]), &bins, Some(&labels)).unwrap();
        assert_eq!(result.to_values(), vec![Value::Int(7), Value::Null]);
    }

    #[test]
    fn test_categorize_list_and_mapping() {
        let data = array(vec!["p", "q", "p", "r"]);
        let cats = vec![Value::from("a"), Value::from("b")];
        let result = categorize(&data, Categories::List(&cats), &Value::Null).unwrap();
        assert_eq!(
            result.to_values(),
            vec![Value::from("a"), Value::from("b"), Value::from("a"), Value::Null]
        );

        let pairs = vec![(Value::from("q"), Value::Int(1))];
        let result = categorize(&data, Categories::Mapping(&pairs), &Value::Int(0)).unwrap();
        assert_eq!(
            result.to_values(),
            vec![Value::Int(0), Value::Int(1), Value::Int(0), Value::Int(0)]
        );
    }

    #[test]
    fn test_categorize_keeps_series_index() {
        let data = Data::Series(
            Series::new(
                vec![Value::Int(7), Value::Int(8)],
                vec![Value::from("x"), Value::from("y")],
            )
            .unwrap(),
        );
        let cats = vec![Value::Int(1), Value::Int(2)];
        let result = categorize(&data, Categories::List(&cats), &Value::Null).unwrap();
        assert_eq!(result.index(), Some(&[Value::Int(7), Value::Int(8)][..]));
    }

    #[test]
    fn test_digitize() {
        let bins = vec![Value::Int(0), Value::Int(10), Value::Int(20)];
        let data = array(vec![-1, 0, 10, 15, 25]);
        assert_eq!(
            digitize(&data, &bins, false).unwrap().to_values(),
            vec![Value::Int(0), Value::Int(1), Value::Int(2), Value::Int(2), Value::Int(3)]
        );
        assert_eq!(
            digitize(&data, &bins, true).unwrap().to_values(),
            vec![Value::Int(0), Value::Int(0), Value::Int(1), Value::Int(2), Value::Int(3)]
        );

        let decreasing = vec![Value::Int(20), Value::Int(10), Value::Int(0)];
        assert_eq!(
            digitize(&array(vec![10]), &decreasing, false).unwrap().to_values(),
            vec![Value::Int(1)]
        );

        let nan = array(vec![f64::NAN]);
        assert_eq!(
            digitize(&nan, &bins, false).unwrap().to_values(),
            vec![Value::Int(3)]
        );
        let descending = vec![Value::Int(3), Value::Int(2), Value::Int(1)];
        assert_eq!(
            digitize(&nan, &descending, false).unwrap().to_values(),
            vec![Value::Int(0)]
        );

        let unordered = vec![Value::Int(0), Value::Int(10), Value::Int(5)];
        assert!(digitize(&data, &unordered, false).is_err());
    }

    #[test]
    fn test_isin_and_astype() {
        let data = array(vec![1, 2, 3]);
        let test = vec![Value::Float(2.0), Value::Int(3)];
        assert_eq!(
            isin(&data, &test, false).unwrap().to_values(),
            vec![Value::Boolean(false), Value::Boolean(true), Value::Boolean(true)]
        );
        assert_eq!(
            isin(&data, &test, true).unwrap().to_values(),
            vec![Value::Boolean(true), Value::Boolean(false), Value::Boolean(false)]
        );
        assert_eq!(
            astype(&data, DataType::String).unwrap().to_values(),
            vec![Value::from("1"), Value::from("2"), Value::from("3")]
        );
    }

    #[test]
    fn test_round_half_to_even() {
        let data = array(vec![0.5, 1.5, 2.5, 1.25]);
        assert_eq!(floats(&round(&data, 0).unwrap()), vec![0.0, 2.0, 2.0, 1.0]);
        assert_eq!(floats(&round(&array(vec![1.25]), 1).unwrap()), vec![1.2]);
        assert_eq!(
            round(&array(vec![15, 25]), -1).unwrap().to_values(),
            vec![Value::Int(20), Value::Int(20)]
        );
        assert_eq!(round(&array(vec![7]), 2).unwrap().to_values(), vec![Value::Int(7)]);
    }

    #[test]
    fn test_clip_and_abs() {
        let data = array(vec![-5, 0, 5]);
        assert_eq!(
            clip(&data, Some(&Value::Int(-1)), Some(&Value::Int(1)))
                .unwrap()
                .to_values(),
            vec![Value::Int(-1), Value::Int(0), Value::Int(1)]
        );
        assert_eq!(
            clip(&data, None, Some(&Value::Float(2.5))).unwrap().to_values(),
            vec![Value::Float(-5.0), Value::Float(0.0), Value::Float(2.5)]
        );
        assert_eq!(
            abs(&data).unwrap().to_values(),
            vec![Value::Int(5), Value::Int(0), Value::Int(5)]
        );
    }

    #[test]
    fn test_aggregations() {
        let values = vec![Value::Int(1), Value::Null, Value::Int(2), Value::Int(3)];
        assert_eq!(aggregate(Reduction::Sum, &values, 0.0).unwrap(), Value::Int(6));
        assert_eq!(aggregate(Reduction::Mean, &values, 0.0).unwrap(), Value::Float(2.0));
        assert_eq!(aggregate(Reduction::Min, &values, 0.0).unwrap(), Value::Int(1));
        assert_eq!(aggregate(Reduction::Max, &values, 0.0).unwrap(), Value::Int(3));
        assert_eq!(
            aggregate(Reduction::Var, &values, 0.0).unwrap(),
            Value::Float(2.0 / 3.0)
        );
        assert_eq!(aggregate(Reduction::Var, &values, 1.0).unwrap(), Value::Float(1.0));
        assert_eq!(aggregate(Reduction::Std, &values, 1.0).unwrap(), Value::Float(1.0));
        assert_eq!(aggregate(Reduction::Any, &values, 0.0).unwrap(), Value::Boolean(true));
        assert_eq!(aggregate(Reduction::All, &values, 0.0).unwrap(), Value::Boolean(true));
        assert!(aggregate(Reduction::Max, &[], 0.0).is_err());
        assert_eq!(aggregate(Reduction::Sum, &[], 0.0).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_cumulative() {
        let data = Data::Array(vec![Value::Int(1), Value::Null, Value::Int(2), Value::Float(0.5)]);
        assert_eq!(
            cumulative(BinaryOperator::Add, &data).unwrap(),
            Data::Array(vec![Value::Int(1), Value::Null, Value::Int(3), Value::Float(3.5)])
        );
        assert_eq!(
            cumulative(BinaryOperator::Mul, &array(vec![1, 2, 3])).unwrap(),
            array(vec![1, 2, 6])
        );
    }

    #[test]
    fn test_ufunc() {
        let data = array(vec![-4, 9]);
        assert_eq!(
            ufunc(Ufunc::Absolute, &data).unwrap().to_values(),
            vec![Value::Int(4), Value::Int(9)]
        );
        let roots = ufunc(Ufunc::Sqrt, &data).unwrap().to_values();
        assert!(matches!(roots[0], Value::Float(f) if f.is_nan()));
        assert_eq!(roots[1], Value::Float(3.0));
    }
}
