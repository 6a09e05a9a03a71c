//! Expression evaluation against a data source.

use std::collections::{BTreeMap, HashMap};

use crate::access::Data;
use crate::expression::arg::{Arg, Operand};
use crate::expression::expr::{Expression, Operation};
use crate::expression::function::{Function, Transform};
use crate::expression::{transform, ExpressionError, ExpressionResult};
use crate::source::{DataSource, DimensionKind, ValueOptions};

/// Precomputed bounds of a dimension
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DimensionRange {
    /// Bounds of the data being evaluated
    pub actual: Option<(f64, f64)>,
    /// Bounds across every dataset the result is compared against
    pub combined: Option<(f64, f64)>,
}

impl DimensionRange {
    pub fn combined(min: f64, max: f64) -> Self {
        Self {
            actual: None,
            combined: Some((min, max)),
        }
    }

    /// Combined bounds, falling back to the actual bounds
    pub fn effective(&self) -> Option<(f64, f64)> {
        self.combined.or(self.actual)
    }
}

/// Options for [`Expression::apply`]
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub flat: bool,
    /// Derived from the source when unset
    pub expanded: Option<bool>,
    /// Ranges consumed by `norm` and `lognorm`, keyed by dimension name
    pub ranges: HashMap<String, DimensionRange>,
    /// Widen graph key dimensions to every node
    pub all_values: bool,
    pub keep_index: bool,
    pub compute: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            flat: false,
            expanded: None,
            ranges: HashMap::new(),
            all_values: false,
            keep_index: false,
            compute: true,
        }
    }
}

impl ApplyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    pub fn range(mut self, dimension: impl Into<String>, range: DimensionRange) -> Self {
        self.ranges.insert(dimension.into(), range);
        self
    }

    pub fn all_values(mut self, all_values: bool) -> Self {
        self.all_values = all_values;
        self
    }

    pub fn keep_index(mut self, keep_index: bool) -> Self {
        self.keep_index = keep_index;
        self
    }

    pub fn compute(mut self, compute: bool) -> Self {
        self.compute = compute;
        self
    }
}

/// Evaluator folding an expression's operations over extracted values
pub struct ExpressionEvaluator<'a> {
    source: &'a dyn DataSource,
    options: &'a ApplyOptions,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(source: &'a dyn DataSource, options: &'a ApplyOptions) -> Self {
        Self { source, options }
    }

    /// Evaluate an expression and return the result
    pub fn evaluate(&self, expr: &Expression) -> ExpressionResult<Data> {
        let mut dimension = expr.dimension().to_string();
        let source = self.source;
        let expanded = self.options.expanded.unwrap_or_else(|| {
            !((source.gridded() && source.is_key_dimension(&dimension))
                || (source.multi() && source.is_unique(&dimension, true)))
        });

        let mut target = source;
        if let Some(nodes) = source.nodes() {
            if self.options.all_values && source.is_key_dimension(&dimension) {
                if let Some(node_index) = nodes.dimensions(DimensionKind::Key).get(2) {
                    dimension = node_index.name.clone();
                }
            }
            if source.get_dimension(&dimension).is_none() {
                log::debug!("dimension '{}' resolved on graph nodes", dimension);
                target = nodes;
            }
        }
        if target.get_dimension(&dimension).is_none() {
            return Err(ExpressionError::UnsupportedDatatype(format!(
                "dimension '{}' could not be resolved on the data source",
                dimension
            )));
        }

        log::debug!(
            "applying {} on dimension '{}' (expanded={})",
            expr,
            dimension,
            expanded
        );
        let value_options = ValueOptions {
            expanded,
            flat: self.options.flat,
            compute: self.options.compute,
            keep_index: self.options.keep_index,
        };
        let mut data = target.values(&dimension, &value_options)?;

        if expr.operations().is_empty() {
            return Ok(data);
        }
        let nested_options = ApplyOptions {
            expanded: Some(expanded),
            ..self.options.clone()
        };
        let nested = ExpressionEvaluator::new(target, &nested_options);
        let range = self
            .options
            .ranges
            .get(&dimension)
            .and_then(DimensionRange::effective);
        for op in expr.operations() {
            data = nested.apply_operation(op, data, range)?;
        }
        Ok(data)
    }

    fn apply_operation(
        &self,
        op: &Operation,
        current: Data,
        range: Option<(f64, f64)>,
    ) -> ExpressionResult<Data> {
        log::trace!("applying operation '{}'", op.function.name());

        let pinned = op.kwargs.contains_key("min") && op.kwargs.contains_key("max");
        if op.function.is_range_normalization() && !pinned {
            if let Some((min, max)) = range {
                log::debug!(
                    "{} uses precomputed range ({}, {})",
                    op.function.name(),
                    min,
                    max
                );
                return match op.function {
                    Function::Transform(Transform::LogNorm) => {
                        transform::lognorm(&current, Some(min), Some(max))
                    }
                    _ => transform::norm(&current, Some(min), Some(max)),
                };
            }
        }

        let mut args = Vec::with_capacity(op.args.len() + 1);
        args.push(Operand::Data(current));
        for arg in &op.args {
            args.push(self.resolve(arg)?);
        }
        if op.reverse {
            args.reverse();
        }
        let kwargs = op
            .kwargs
            .iter()
            .map(|(name, arg)| Ok((name.clone(), self.resolve(arg)?)))
            .collect::<ExpressionResult<BTreeMap<_, _>>>()?;
        op.function.call(&args, &kwargs)
    }

    /// Evaluate an argument, applying nested expressions to the same source
    fn resolve(&self, arg: &Arg) -> ExpressionResult<Operand> {
        Ok(match arg {
            Arg::Value(value) => Operand::Data(Data::Scalar(value.clone())),
            Arg::List(values) => Operand::List(values.clone()),
            Arg::Mapping(pairs) => Operand::Mapping(pairs.clone()),
            Arg::DType(dtype) => Operand::DType(*dtype),
            Arg::Expr(expr) => Operand::Data(self.evaluate(expr)?),
        })
    }
}

impl Expression {
    /// Evaluate the expression against a data source.
    ///
    /// Values of the anchor dimension are extracted first, then every
    /// operation is applied in order. Expression arguments are evaluated
    /// against the same source with the same options.
    pub fn apply(
        &self,
        source: &dyn DataSource,
        options: &ApplyOptions,
    ) -> ExpressionResult<Data> {
        ExpressionEvaluator::new(source, options).evaluate(self)
    }

    /// Whether every dimension the expression references resolves on the
    /// source, including dimensions of nested expressions
    pub fn applies(&self, source: &dyn DataSource) -> bool {
        let name = self.dimension();
        let resolved = source.get_dimension(name).is_some()
            || source
                .nodes()
                .is_some_and(|nodes| nodes.get_dimension(name).is_some());
        resolved
            && self.operations().iter().all(|op| {
                op.args
                    .iter()
                    .chain(op.kwargs.values())
                    .filter_map(Arg::as_expression)
                    .all(|expr| expr.applies(source))
            })
    }
}
