//! Data sources expressions are evaluated against.
//!
//! A source declares named dimensions, split into key and value
//! dimensions, and extracts the values of one dimension on request. The
//! evaluator only relies on the [`DataSource`] trait; [`Table`] and
//! [`Graph`] are in-memory implementations.

use crate::access::Data;
use anyhow::Result;

pub mod graph;
pub mod table;

pub use graph::Graph;
pub use table::Table;

/// A named dimension declared by a source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub name: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Which declared dimensions to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKind {
    Key,
    Value,
    All,
}

/// Flags controlling value extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueOptions {
    /// One value per row rather than one per group or grid axis
    pub expanded: bool,
    pub flat: bool,
    /// Materialize lazily partitioned data
    pub compute: bool,
    /// Return index-carrying data where the source has an index
    pub keep_index: bool,
}

impl Default for ValueOptions {
    fn default() -> Self {
        Self {
            expanded: true,
            flat: false,
            compute: true,
            keep_index: false,
        }
    }
}

/// Capabilities a source must offer for expressions to be evaluated on it
pub trait DataSource {
    /// Look up a declared dimension by name
    fn get_dimension(&self, name: &str) -> Option<&Dimension>;

    fn dimensions(&self, kind: DimensionKind) -> Vec<&Dimension>;

    /// Extract the values of a dimension
    fn values(&self, dimension: &str, options: &ValueOptions) -> Result<Data>;

    /// Whether the source lays key dimensions out on a grid
    fn gridded(&self) -> bool {
        false
    }

    /// Whether the source holds multiple sub-geometries
    fn multi(&self) -> bool {
        false
    }

    /// Whether a dimension holds a single value per group (or per
    /// sub-geometry when `per_geometry` is set)
    fn is_unique(&self, _dimension: &str, _per_geometry: bool) -> bool {
        false
    }

    /// Node table of a graph-like source
    fn nodes(&self) -> Option<&dyn DataSource> {
        None
    }

    fn is_key_dimension(&self, name: &str) -> bool {
        self.dimensions(DimensionKind::Key)
            .iter()
            .any(|dim| dim.name == name)
    }
}
