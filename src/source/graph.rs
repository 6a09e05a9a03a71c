//! Graph data source: an edge table plus a node table.

use anyhow::Result;

use crate::access::Data;
use crate::source::{DataSource, Dimension, DimensionKind, Table, ValueOptions};

/// Edges with source/target key dimensions and a node table whose third
/// key dimension is the node index
#[derive(Debug, Clone)]
pub struct Graph {
    edges: Table,
    nodes: Table,
}

impl Graph {
    pub fn new(edges: Table, nodes: Table) -> Self {
        Self { edges, nodes }
    }

    pub fn edges(&self) -> &Table {
        &self.edges
    }
}

impl DataSource for Graph {
    fn get_dimension(&self, name: &str) -> Option<&Dimension> {
        self.edges.get_dimension(name)
    }

    fn dimensions(&self, kind: DimensionKind) -> Vec<&Dimension> {
        self.edges.dimensions(kind)
    }

    fn values(&self, dimension: &str, options: &ValueOptions) -> Result<Data> {
        self.edges.values(dimension, options)
    }

    fn gridded(&self) -> bool {
        self.edges.gridded()
    }

    fn multi(&self) -> bool {
        self.edges.multi()
    }

    fn is_unique(&self, dimension: &str, per_geometry: bool) -> bool {
        self.edges.is_unique(dimension, per_geometry)
    }

    fn nodes(&self) -> Option<&dyn DataSource> {
        Some(&self.nodes)
    }
}
