//! Deferred expression definitions.
//!
//! An [`Expression`] is rooted on a named dimension and carries an ordered
//! chain of [`Operation`]s. Every composition method returns a new
//! expression; the receiver is never modified, so expressions can be shared
//! and reused freely.

use std::ops;

use crate::access::{DataType, Value};
use crate::expression::arg::{Arg, Kwargs};
use crate::expression::function::{
    Builtin, CustomFunction, Function, Reduction, Transform, Ufunc,
};
use crate::expression::operator::{BinaryOperator, UnaryOperator};
use crate::expression::{ExpressionError, ExpressionResult};

/// One deferred function application
#[derive(Debug, Clone)]
pub struct Operation {
    pub function: Function,
    /// Arguments beyond the implicit current value
    pub args: Vec<Arg>,
    pub kwargs: Kwargs,
    /// Whether the current value is passed as the last rather than the
    /// first positional argument
    pub reverse: bool,
}

/// An immutable chain of operations over a named dimension
#[derive(Debug, Clone)]
pub struct Expression {
    dimension: String,
    operations: Vec<Operation>,
}

impl Expression {
    /// Create an expression denoting the raw values of a dimension
    pub fn new(dimension: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            operations: Vec::new(),
        }
    }

    /// Create an expression from another one, taking over its dimension
    /// and its operation chain
    pub fn from_expression(expr: &Expression) -> Self {
        Self {
            dimension: expr.dimension.clone(),
            operations: expr.operations.clone(),
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// Copy this expression and append one operation to the copy
    pub fn with_operation(
        &self,
        function: impl Into<Function>,
        args: Vec<Arg>,
        kwargs: Kwargs,
        reverse: bool,
    ) -> Expression {
        let mut operations = self.operations.clone();
        operations.push(Operation {
            function: function.into(),
            args,
            kwargs,
            reverse,
        });
        Expression {
            dimension: self.dimension.clone(),
            operations,
        }
    }

    /// Append an operation referring to its function by name.
    ///
    /// The name is resolved across the operator tables, the builtin,
    /// reduction and transform tables, the runtime registry and the ufuncs.
    pub fn with_named(
        &self,
        name: &str,
        args: Vec<Arg>,
        kwargs: Kwargs,
        reverse: bool,
    ) -> ExpressionResult<Expression> {
        let function = Function::lookup(name).ok_or_else(|| {
            ExpressionError::InvalidOperation(format!(
                "second argument must be a function, found '{}'",
                name
            ))
        })?;
        Ok(self.with_operation(function, args, kwargs, reverse))
    }

    /// Wrap an external function.
    ///
    /// String arguments are promoted to dimension expressions; the first
    /// argument then becomes the expression the function is applied to.
    pub fn pipe(
        function: CustomFunction,
        args: Vec<Arg>,
        kwargs: Kwargs,
    ) -> ExpressionResult<Expression> {
        let mut args = args.into_iter().map(|arg| match arg {
            Arg::Value(Value::String(name)) => Arg::Expr(Expression::new(name)),
            other => other,
        });
        let receiver = match args.next() {
            Some(Arg::Expr(expr)) => expr,
            _ => {
                return Err(ExpressionError::InvalidOperation(format!(
                    "pipe to '{}' requires a dimension or expression as first argument",
                    function.name()
                )))
            }
        };
        Ok(receiver.with_operation(Function::Pipe(function), args.collect(), kwargs, false))
    }

    pub fn binary(&self, op: BinaryOperator, other: impl Into<Arg>) -> Expression {
        self.with_operation(op, vec![other.into()], Kwargs::new(), false)
    }

    /// Binary operation with this expression as the right-hand operand
    pub fn reflected(&self, op: BinaryOperator, other: impl Into<Arg>) -> Expression {
        self.with_operation(op, vec![other.into()], Kwargs::new(), true)
    }

    pub fn unary(&self, op: UnaryOperator) -> Expression {
        self.with_operation(op, Vec::new(), Kwargs::new(), false)
    }

    pub fn truediv(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::TrueDiv, other)
    }

    pub fn floordiv(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::FloorDiv, other)
    }

    pub fn pow(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::Pow, other)
    }

    pub fn lshift(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::LShift, other)
    }

    pub fn rshift(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::RShift, other)
    }

    pub fn equal(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::Eq, other)
    }

    pub fn not_equal(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::Ne, other)
    }

    pub fn lt(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::Lt, other)
    }

    pub fn le(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::Le, other)
    }

    pub fn gt(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::Gt, other)
    }

    pub fn ge(&self, other: impl Into<Arg>) -> Expression {
        self.binary(BinaryOperator::Ge, other)
    }

    pub fn radd(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::Add, other)
    }

    pub fn rsub(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::Sub, other)
    }

    pub fn rmul(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::Mul, other)
    }

    pub fn rtruediv(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::TrueDiv, other)
    }

    pub fn rfloordiv(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::FloorDiv, other)
    }

    pub fn rmod(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::Mod, other)
    }

    pub fn rpow(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::Pow, other)
    }

    pub fn rand(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::And, other)
    }

    pub fn ror(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::Or, other)
    }

    pub fn rlshift(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::LShift, other)
    }

    pub fn rrshift(&self, other: impl Into<Arg>) -> Expression {
        self.reflected(BinaryOperator::RShift, other)
    }

    pub fn abs(&self) -> Expression {
        self.with_operation(Builtin::Abs, Vec::new(), Kwargs::new(), false)
    }

    /// Round half to even at the given number of decimals
    pub fn round(&self, decimals: i32) -> Expression {
        let mut kwargs = Kwargs::new();
        kwargs.insert("decimals".to_string(), decimals.into());
        self.with_operation(Builtin::Round, Vec::new(), kwargs, false)
    }

    /// Append a reduction with explicit keyword arguments, e.g. `ddof`
    pub fn reduction(&self, reduction: Reduction, kwargs: Kwargs) -> Expression {
        self.with_operation(reduction, Vec::new(), kwargs, false)
    }

    pub fn any(&self) -> Expression {
        self.reduction(Reduction::Any, Kwargs::new())
    }

    pub fn all(&self) -> Expression {
        self.reduction(Reduction::All, Kwargs::new())
    }

    pub fn cumprod(&self) -> Expression {
        self.reduction(Reduction::Cumprod, Kwargs::new())
    }

    pub fn cumsum(&self) -> Expression {
        self.reduction(Reduction::Cumsum, Kwargs::new())
    }

    pub fn max(&self) -> Expression {
        self.reduction(Reduction::Max, Kwargs::new())
    }

    pub fn mean(&self) -> Expression {
        self.reduction(Reduction::Mean, Kwargs::new())
    }

    pub fn min(&self) -> Expression {
        self.reduction(Reduction::Min, Kwargs::new())
    }

    pub fn sum(&self) -> Expression {
        self.reduction(Reduction::Sum, Kwargs::new())
    }

    pub fn std(&self) -> Expression {
        self.reduction(Reduction::Std, Kwargs::new())
    }

    pub fn var(&self) -> Expression {
        self.reduction(Reduction::Var, Kwargs::new())
    }

    pub fn log(&self) -> Expression {
        self.reduction(Reduction::Log, Kwargs::new())
    }

    pub fn log10(&self) -> Expression {
        self.reduction(Reduction::Log10, Kwargs::new())
    }

    /// Limit values to the given bounds; at least one must be given
    pub fn clip(&self, min: Option<Value>, max: Option<Value>) -> ExpressionResult<Expression> {
        if min.is_none() && max.is_none() {
            return Err(ExpressionError::InvalidOperation(
                "one of max or min must be given".to_string(),
            ));
        }
        let mut kwargs = Kwargs::new();
        if let Some(min) = min {
            kwargs.insert("min".to_string(), min.into());
        }
        if let Some(max) = max {
            kwargs.insert("max".to_string(), max.into());
        }
        Ok(self.reduction(Reduction::Clip, kwargs))
    }

    fn transform(&self, transform: Transform, args: Vec<Arg>, kwargs: Kwargs) -> Expression {
        self.with_operation(transform, args, kwargs, false)
    }

    pub fn astype(&self, dtype: DataType) -> Expression {
        let mut kwargs = Kwargs::new();
        kwargs.insert("dtype".to_string(), dtype.into());
        self.transform(Transform::AsType, Vec::new(), kwargs)
    }

    /// Cast values to strings
    pub fn str(&self) -> Expression {
        self.astype(DataType::String)
    }

    pub fn digitize(&self, bins: impl Into<Arg>, right: bool) -> Expression {
        let mut kwargs = Kwargs::new();
        if right {
            kwargs.insert("right".to_string(), true.into());
        }
        self.transform(Transform::Digitize, vec![bins.into()], kwargs)
    }

    pub fn isin(&self, test_elements: impl Into<Arg>, invert: bool) -> Expression {
        let mut kwargs = Kwargs::new();
        if invert {
            kwargs.insert("invert".to_string(), true.into());
        }
        self.transform(Transform::IsIn, vec![test_elements.into()], kwargs)
    }

    /// Bin continuous values.
    ///
    /// Each value is assigned the label of the `(lower, upper]` bin it falls
    /// in. Without labels each bin is labelled by its center.
    pub fn bin(&self, bins: impl Into<Arg>, labels: Option<Vec<Value>>) -> Expression {
        let mut kwargs = Kwargs::new();
        let labels = match labels {
            Some(labels) => Arg::List(labels),
            None => Arg::Value(Value::Null),
        };
        kwargs.insert("labels".to_string(), labels);
        self.transform(Transform::Bin, vec![bins.into()], kwargs)
    }

    /// Replace discrete values with categories given as a list or mapping.
    ///
    /// Values without a category get `default`.
    pub fn categorize(&self, categories: impl Into<Arg>, default: Value) -> Expression {
        let mut kwargs = Kwargs::new();
        kwargs.insert("categories".to_string(), categories.into());
        kwargs.insert("default".to_string(), default.into());
        self.transform(Transform::Categorize, Vec::new(), kwargs)
    }

    /// Unity-based normalization, optionally over fixed `(min, max)` limits
    pub fn norm(&self, limits: Option<(f64, f64)>) -> Expression {
        self.transform(Transform::Norm, Vec::new(), limit_kwargs(limits))
    }

    /// Unity-based normalization in log space
    pub fn lognorm(&self, limits: Option<(f64, f64)>) -> Expression {
        self.transform(Transform::LogNorm, Vec::new(), limit_kwargs(limits))
    }

    /// Capture an element-wise universal function. Null keyword arguments
    /// are dropped.
    pub fn ufunc(&self, ufunc: Ufunc, kwargs: Kwargs) -> Expression {
        let kwargs = kwargs.into_iter().filter(|(_, v)| !v.is_null()).collect();
        self.with_operation(ufunc, Vec::new(), kwargs, false)
    }
}

fn limit_kwargs(limits: Option<(f64, f64)>) -> Kwargs {
    let mut kwargs = Kwargs::new();
    if let Some((min, max)) = limits {
        kwargs.insert("min".to_string(), min.into());
        kwargs.insert("max".to_string(), max.into());
    }
    kwargs
}

/// Shorthand for [`Expression::new`]
pub fn dim(dimension: impl Into<String>) -> Expression {
    Expression::new(dimension)
}

macro_rules! binary_operator_impl {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<Arg>> ops::$trait<T> for Expression {
            type Output = Expression;

            fn $method(self, other: T) -> Expression {
                self.binary($op, other)
            }
        }

        impl<T: Into<Arg>> ops::$trait<T> for &Expression {
            type Output = Expression;

            fn $method(self, other: T) -> Expression {
                self.binary($op, other)
            }
        }
    };
}

binary_operator_impl!(Add, add, BinaryOperator::Add);
binary_operator_impl!(Sub, sub, BinaryOperator::Sub);
binary_operator_impl!(Mul, mul, BinaryOperator::Mul);
binary_operator_impl!(Div, div, BinaryOperator::TrueDiv);
binary_operator_impl!(Rem, rem, BinaryOperator::Mod);
binary_operator_impl!(BitAnd, bitand, BinaryOperator::And);
binary_operator_impl!(BitOr, bitor, BinaryOperator::Or);
binary_operator_impl!(Shl, shl, BinaryOperator::LShift);
binary_operator_impl!(Shr, shr, BinaryOperator::RShift);

// `2 - dim("x")` and friends
macro_rules! reflected_operator_impl {
    ($trait:ident, $method:ident, $op:expr, $($ty:ty),+) => {
        $(
            impl ops::$trait<Expression> for $ty {
                type Output = Expression;

                fn $method(self, expr: Expression) -> Expression {
                    expr.reflected($op, self)
                }
            }

            impl ops::$trait<&Expression> for $ty {
                type Output = Expression;

                fn $method(self, expr: &Expression) -> Expression {
                    expr.reflected($op, self)
                }
            }
        )+
    };
}

reflected_operator_impl!(Add, add, BinaryOperator::Add, i32, i64, f64);
reflected_operator_impl!(Sub, sub, BinaryOperator::Sub, i32, i64, f64);
reflected_operator_impl!(Mul, mul, BinaryOperator::Mul, i32, i64, f64);
reflected_operator_impl!(Div, div, BinaryOperator::TrueDiv, i32, i64, f64);
reflected_operator_impl!(Rem, rem, BinaryOperator::Mod, i32, i64, f64);
reflected_operator_impl!(BitAnd, bitand, BinaryOperator::And, bool, i32, i64);
reflected_operator_impl!(BitOr, bitor, BinaryOperator::Or, bool, i32, i64);
reflected_operator_impl!(Shl, shl, BinaryOperator::LShift, i32, i64);
reflected_operator_impl!(Shr, shr, BinaryOperator::RShift, i32, i64);

impl ops::Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self.unary(UnaryOperator::Neg)
    }
}

impl ops::Neg for &Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self.unary(UnaryOperator::Neg)
    }
}

impl ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        self.unary(UnaryOperator::Invert)
    }
}

impl ops::Not for &Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        self.unary(UnaryOperator::Invert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Data;

    #[test]
    fn test_new_expression_has_no_operations() {
        let expr = dim("x");
        assert_eq!(expr.dimension(), "x");
        assert!(expr.operations().is_empty());
    }

    #[test]
    fn test_composition_does_not_mutate_receiver() {
        let base = dim("x") * 2;
        let plus = &base + 1;
        let minus = &base - 1;

        assert_eq!(base.operations().len(), 1);
        assert_eq!(plus.operations().len(), 2);
        assert_eq!(minus.operations().len(), 2);
        assert!(matches!(
            plus.operations()[1].function,
            Function::Binary(BinaryOperator::Add)
        ));
        assert!(matches!(
            minus.operations()[1].function,
            Function::Binary(BinaryOperator::Sub)
        ));
    }

    #[test]
    fn test_reflected_operators_set_reverse() {
        let expr = 1_i32 - dim("x");
        let op = &expr.operations()[0];
        assert!(op.reverse);
        assert!(matches!(op.function, Function::Binary(BinaryOperator::Sub)));

        for expr in [
            dim("x").rand(true),
            dim("x").ror(1),
            dim("x").rlshift(1),
            dim("x").rrshift(1),
            2_i32 << dim("x"),
            true | dim("x"),
        ] {
            assert!(expr.operations()[0].reverse);
        }
        assert!(!dim("x").lshift(1).operations()[0].reverse);
    }

    #[test]
    fn test_unary_operators() {
        let expr = -dim("x");
        assert!(matches!(
            expr.operations()[0].function,
            Function::Unary(UnaryOperator::Neg)
        ));
        let expr = !dim("x");
        assert!(matches!(
            expr.operations()[0].function,
            Function::Unary(UnaryOperator::Invert)
        ));
        assert!(expr.operations()[0].args.is_empty());
    }

    #[test]
    fn test_expression_arguments_are_captured() {
        let expr = dim("x") + dim("y");
        assert_eq!(
            expr.operations()[0].args[0]
                .as_expression()
                .map(Expression::dimension),
            Some("y")
        );
    }

    #[test]
    fn test_with_named() {
        let expr = dim("x")
            .with_named("norm", Vec::new(), Kwargs::new(), false)
            .unwrap();
        assert!(matches!(
            expr.operations()[0].function,
            Function::Transform(Transform::Norm)
        ));

        let err = dim("x")
            .with_named("frobnicate", Vec::new(), Kwargs::new(), false)
            .unwrap_err();
        assert!(matches!(err, ExpressionError::InvalidOperation(_)));
    }

    #[test]
    fn test_clip_requires_a_bound() {
        assert!(matches!(
            dim("x").clip(None, None),
            Err(ExpressionError::InvalidOperation(_))
        ));
        let expr = dim("x").clip(Some(Value::Int(0)), None).unwrap();
        assert!(expr.operations()[0].kwargs.contains_key("min"));
        assert!(!expr.operations()[0].kwargs.contains_key("max"));
    }

    #[test]
    fn test_method_kwargs() {
        let expr = dim("x").norm(Some((0.0, 20.0)));
        let kwargs = &expr.operations()[0].kwargs;
        assert_eq!(kwargs.keys().collect::<Vec<_>>(), vec!["max", "min"]);
        assert!(dim("x").norm(None).operations()[0].kwargs.is_empty());

        let expr = dim("x").bin(vec![0, 10], None);
        assert!(expr.operations()[0].kwargs["labels"].is_null());

        let expr = dim("x").str();
        assert!(matches!(
            expr.operations()[0].kwargs["dtype"],
            Arg::DType(DataType::String)
        ));
    }

    #[test]
    fn test_ufunc_drops_null_kwargs() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("out".to_string(), Arg::Value(Value::Null));
        kwargs.insert("where".to_string(), Arg::from(true));
        let expr = dim("x").ufunc(Ufunc::Sqrt, kwargs);
        let op = &expr.operations()[0];
        assert!(matches!(op.function, Function::Ufunc(Ufunc::Sqrt)));
        assert_eq!(op.kwargs.len(), 1);
        assert!(op.kwargs.contains_key("where"));
    }

    #[test]
    fn test_pipe_promotes_strings() {
        let func = CustomFunction::new("ratio", |_, _| Ok(Data::Array(vec![])));
        let expr = Expression::pipe(func.clone(), vec!["x".into(), "y".into()], Kwargs::new())
            .unwrap();
        assert_eq!(expr.dimension(), "x");
        let op = &expr.operations()[0];
        assert!(matches!(op.function, Function::Pipe(_)));
        assert_eq!(
            op.args[0].as_expression().map(Expression::dimension),
            Some("y")
        );

        assert!(Expression::pipe(func, vec![1.into()], Kwargs::new()).is_err());
    }

    #[test]
    fn test_from_expression_copies_operations() {
        let inner = dim("x") * 2;
        let expr = Expression::from_expression(&inner).norm(None);
        assert_eq!(expr.dimension(), "x");
        assert_eq!(expr.operations().len(), 2);
        assert!(matches!(
            expr.operations()[0].function,
            Function::Binary(BinaryOperator::Mul)
        ));
        assert_eq!(inner.operations().len(), 1);
    }
}
