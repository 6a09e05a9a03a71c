//! In-memory columnar data source.

use anyhow::{anyhow, bail, Result};
use std::collections::{HashMap, HashSet};

use crate::access::{Data, Series, Value};
use crate::source::{DataSource, Dimension, DimensionKind, ValueOptions};

/// Columns of equal length keyed by dimension name.
///
/// Built with the `with_*` methods:
///
/// ```
/// use dimexpr::source::Table;
///
/// let table = Table::new()
///     .with_key("x", vec![1, 2, 3])
///     .with_value("y", vec![0.5, 1.5, 2.5]);
/// assert_eq!(table.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    key_dimensions: Vec<Dimension>,
    value_dimensions: Vec<Dimension>,
    columns: HashMap<String, Vec<Value>>,
    index: Option<Vec<Value>>,
    partitions: usize,
    gridded: bool,
    multi: bool,
    unique: HashSet<String>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self {
            key_dimensions: Vec::new(),
            value_dimensions: Vec::new(),
            columns: HashMap::new(),
            index: None,
            partitions: 1,
            gridded: false,
            multi: false,
            unique: HashSet::new(),
        }
    }

    /// Add a key dimension column
    pub fn with_key<T: Into<Value>>(mut self, name: &str, values: Vec<T>) -> Self {
        self.key_dimensions.push(Dimension::new(name));
        self.columns
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Add a value dimension column
    pub fn with_value<T: Into<Value>>(mut self, name: &str, values: Vec<T>) -> Self {
        self.value_dimensions.push(Dimension::new(name));
        self.columns
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Row labels returned when values are extracted with `keep_index`
    pub fn with_index<T: Into<Value>>(mut self, index: Vec<T>) -> Self {
        self.index = Some(index.into_iter().map(Into::into).collect());
        self
    }

    /// Split rows into partitions, handed out unmaterialized when values are
    /// extracted with `compute` unset
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions.max(1);
        self
    }

    /// Treat key dimensions as grid axes
    pub fn as_gridded(mut self) -> Self {
        self.gridded = true;
        self
    }

    /// Treat consecutive runs of rows as sub-geometries; the listed
    /// dimensions hold one value per sub-geometry
    pub fn as_multi(mut self, unique: &[&str]) -> Self {
        self.multi = true;
        self.unique = unique.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn row_index(&self, len: usize) -> Result<Vec<Value>> {
        match &self.index {
            Some(index) if index.len() != len => bail!(
                "index of length {} does not match column of length {}",
                index.len(),
                len
            ),
            Some(index) => Ok(index.clone()),
            None => Ok((0..len as i64).map(Value::Int).collect()),
        }
    }

    fn package(&self, index: Option<Vec<Value>>, values: Vec<Value>) -> Result<Data> {
        match index {
            Some(index) => Ok(Data::Series(Series::new(index, values)?)),
            None => Ok(Data::Array(values)),
        }
    }
}

/// Distinct values in first-seen order
fn distinct(values: &[Value]) -> Vec<Value> {
    let mut seen: Vec<Value> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| s.loose_eq(value)) {
            seen.push(value.clone());
        }
    }
    seen
}

impl DataSource for Table {
    fn get_dimension(&self, name: &str) -> Option<&Dimension> {
        self.key_dimensions
            .iter()
            .chain(&self.value_dimensions)
            .find(|dim| dim.name == name)
    }

    fn dimensions(&self, kind: DimensionKind) -> Vec<&Dimension> {
        match kind {
            DimensionKind::Key => self.key_dimensions.iter().collect(),
            DimensionKind::Value => self.value_dimensions.iter().collect(),
            DimensionKind::All => self
                .key_dimensions
                .iter()
                .chain(&self.value_dimensions)
                .collect(),
        }
    }

    fn values(&self, dimension: &str, options: &ValueOptions) -> Result<Data> {
        let column = self
            .columns
            .get(dimension)
            .ok_or_else(|| anyhow!("dimension '{}' not found", dimension))?;

        if !options.expanded {
            if self.gridded && self.is_key_dimension(dimension) {
                return Ok(Data::Array(distinct(column)));
            }
            if self.multi && self.is_unique(dimension, true) {
                let mut collapsed = column.clone();
                collapsed.dedup_by(|a, b| a.loose_eq(b));
                return Ok(Data::Array(collapsed));
            }
        }

        let index = if options.keep_index {
            Some(self.row_index(column.len())?)
        } else {
            None
        };

        if options.compute || self.partitions <= 1 || column.is_empty() {
            return self.package(index, column.clone());
        }

        let chunk = column.len().div_ceil(self.partitions);
        let parts = column
            .chunks(chunk)
            .enumerate()
            .map(|(i, values)| {
                let labels = index
                    .as_ref()
                    .map(|index| index[i * chunk..i * chunk + values.len()].to_vec());
                self.package(labels, values.to_vec())
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Data::Chunked(parts))
    }

    fn gridded(&self) -> bool {
        self.gridded
    }

    fn multi(&self) -> bool {
        self.multi
    }

    fn is_unique(&self, dimension: &str, _per_geometry: bool) -> bool {
        self.unique.contains(dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new()
            .with_key("x", vec![1, 1, 2, 2])
            .with_value("y", vec![10.0, 20.0, 30.0, 40.0])
    }

    #[test]
    fn test_dimension_lookup() {
        let table = sample();
        assert!(table.get_dimension("x").is_some());
        assert!(table.get_dimension("z").is_none());
        assert!(table.is_key_dimension("x"));
        assert!(!table.is_key_dimension("y"));
        assert_eq!(table.dimensions(DimensionKind::All).len(), 2);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_values() {
        let table = sample();
        let data = table.values("y", &ValueOptions::default()).unwrap();
        assert_eq!(
            data,
            Data::Array(vec![
                Value::Float(10.0),
                Value::Float(20.0),
                Value::Float(30.0),
                Value::Float(40.0)
            ])
        );
        assert!(table.values("z", &ValueOptions::default()).is_err());
    }

    #[test]
    fn test_gridded_key_values_are_unique_when_not_expanded() {
        let table = sample().as_gridded();
        let options = ValueOptions {
            expanded: false,
            ..ValueOptions::default()
        };
        assert_eq!(
            table.values("x", &options).unwrap(),
            Data::Array(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(table.values("y", &options).unwrap().len(), 4);
    }

    #[test]
    fn test_multi_unique_values_collapse() {
        let table = sample().as_multi(&["x"]);
        assert!(table.is_unique("x", true));
        let options = ValueOptions {
            expanded: false,
            ..ValueOptions::default()
        };
        assert_eq!(table.values("x", &options).unwrap().len(), 2);
    }

    #[test]
    fn test_keep_index() {
        let table = sample().with_index(vec!["a", "b", "c", "d"]);
        let options = ValueOptions {
            keep_index: true,
            ..ValueOptions::default()
        };
        let data = table.values("x", &options).unwrap();
        assert_eq!(data.index().map(<[Value]>::len), Some(4));
        assert_eq!(data.index().unwrap()[0], Value::from("a"));

        let data = sample().values("x", &options).unwrap();
        assert_eq!(data.index().unwrap()[3], Value::Int(3));
    }

    #[test]
    fn test_lazy_partitions() {
        let table = sample().with_partitions(3);
        let options = ValueOptions {
            compute: false,
            ..ValueOptions::default()
        };
        match table.values("y", &options).unwrap() {
            Data::Chunked(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[0].len(), 2);
            }
            other => panic!("expected partitions, got {:?}", other),
        }
        assert!(matches!(
            table.values("y", &ValueOptions::default()).unwrap(),
            Data::Array(_)
        ));
    }
}
