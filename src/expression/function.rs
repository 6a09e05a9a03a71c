//! Function tags an operation can carry.
//!
//! Every function an expression can apply is one variant of [`Function`],
//! carrying its own display name and evaluation rule. External callables
//! enter through [`CustomFunction`], either registered by name or piped in
//! directly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::access::Data;
use crate::expression::arg::{CallArgs, Operand};
use crate::expression::operator::{BinaryOperator, UnaryOperator};
use crate::expression::{registry, transform, ExpressionError, ExpressionResult};

/// Signature shared by registered and piped functions.
///
/// The first positional operand is the current value of the expression.
pub type FunctionImpl =
    dyn Fn(&[Operand], &BTreeMap<String, Operand>) -> anyhow::Result<Data> + Send + Sync;

/// Python builtins that render in prefix-call form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    Round,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::Round => "round",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "abs" => Some(Builtin::Abs),
            "round" => Some(Builtin::Round),
            _ => None,
        }
    }
}

/// Aggregations and numeric-library methods rendered as `.name(...)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reduction {
    Any,
    All,
    Cumprod,
    Cumsum,
    Max,
    Mean,
    Min,
    Sum,
    Std,
    Var,
    Log,
    Log10,
    Clip,
}

impl Reduction {
    pub const ALL: [Reduction; 13] = [
        Reduction::Any,
        Reduction::All,
        Reduction::Cumprod,
        Reduction::Cumsum,
        Reduction::Max,
        Reduction::Mean,
        Reduction::Min,
        Reduction::Sum,
        Reduction::Std,
        Reduction::Var,
        Reduction::Log,
        Reduction::Log10,
        Reduction::Clip,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Reduction::Any => "any",
            Reduction::All => "all",
            Reduction::Cumprod => "cumprod",
            Reduction::Cumsum => "cumsum",
            Reduction::Max => "max",
            Reduction::Mean => "mean",
            Reduction::Min => "min",
            Reduction::Sum => "sum",
            Reduction::Std => "std",
            Reduction::Var => "var",
            Reduction::Log => "log",
            Reduction::Log10 => "log10",
            Reduction::Clip => "clip",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }
}

/// Data-reshaping transforms rendered as `.name(...)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Norm,
    LogNorm,
    Bin,
    Categorize,
    Digitize,
    IsIn,
    AsType,
}

impl Transform {
    pub const ALL: [Transform; 7] = [
        Transform::Norm,
        Transform::LogNorm,
        Transform::Bin,
        Transform::Categorize,
        Transform::Digitize,
        Transform::IsIn,
        Transform::AsType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Transform::Norm => "norm",
            Transform::LogNorm => "lognorm",
            Transform::Bin => "bin",
            Transform::Categorize => "categorize",
            Transform::Digitize => "digitize",
            Transform::IsIn => "isin",
            Transform::AsType => "astype",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// Element-wise universal functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ufunc {
    Sqrt,
    Exp,
    Log2,
    Log1p,
    Expm1,
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Floor,
    Ceil,
    Sign,
    Square,
    Absolute,
    Erf,
    Expit,
    Logit,
}

impl Ufunc {
    pub const ALL: [Ufunc; 19] = [
        Ufunc::Sqrt,
        Ufunc::Exp,
        Ufunc::Log2,
        Ufunc::Log1p,
        Ufunc::Expm1,
        Ufunc::Sin,
        Ufunc::Cos,
        Ufunc::Tan,
        Ufunc::Arcsin,
        Ufunc::Arccos,
        Ufunc::Arctan,
        Ufunc::Floor,
        Ufunc::Ceil,
        Ufunc::Sign,
        Ufunc::Square,
        Ufunc::Absolute,
        Ufunc::Erf,
        Ufunc::Expit,
        Ufunc::Logit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Ufunc::Sqrt => "sqrt",
            Ufunc::Exp => "exp",
            Ufunc::Log2 => "log2",
            Ufunc::Log1p => "log1p",
            Ufunc::Expm1 => "expm1",
            Ufunc::Sin => "sin",
            Ufunc::Cos => "cos",
            Ufunc::Tan => "tan",
            Ufunc::Arcsin => "arcsin",
            Ufunc::Arccos => "arccos",
            Ufunc::Arctan => "arctan",
            Ufunc::Floor => "floor",
            Ufunc::Ceil => "ceil",
            Ufunc::Sign => "sign",
            Ufunc::Square => "square",
            Ufunc::Absolute => "absolute",
            Ufunc::Erf => "erf",
            Ufunc::Expit => "expit",
            Ufunc::Logit => "logit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.name() == name)
    }

    /// Whether the function lives in the numeric library's top-level
    /// namespace, which decides between `np.name(...)` and `name(...)`
    pub fn in_numpy_namespace(&self) -> bool {
        !matches!(self, Ufunc::Erf | Ufunc::Expit | Ufunc::Logit)
    }

    /// Evaluate the function on one number
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            Ufunc::Sqrt => x.sqrt(),
            Ufunc::Exp => x.exp(),
            Ufunc::Log2 => x.log2(),
            Ufunc::Log1p => x.ln_1p(),
            Ufunc::Expm1 => x.exp_m1(),
            Ufunc::Sin => x.sin(),
            Ufunc::Cos => x.cos(),
            Ufunc::Tan => x.tan(),
            Ufunc::Arcsin => x.asin(),
            Ufunc::Arccos => x.acos(),
            Ufunc::Arctan => x.atan(),
            Ufunc::Floor => x.floor(),
            Ufunc::Ceil => x.ceil(),
            Ufunc::Sign => {
                if x.is_nan() || x == 0.0 {
                    x
                } else {
                    x.signum()
                }
            }
            Ufunc::Square => x * x,
            Ufunc::Absolute => x.abs(),
            Ufunc::Erf => libm::erf(x),
            Ufunc::Expit => 1.0 / (1.0 + (-x).exp()),
            Ufunc::Logit => (x / (1.0 - x)).ln(),
        }
    }
}

/// A named external function
#[derive(Clone)]
pub struct CustomFunction {
    name: String,
    func: Arc<FunctionImpl>,
}

impl CustomFunction {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Operand], &BTreeMap<String, Operand>) -> anyhow::Result<Data>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(
        &self,
        args: &[Operand],
        kwargs: &BTreeMap<String, Operand>,
    ) -> ExpressionResult<Data> {
        (self.func)(args, kwargs).map_err(ExpressionError::from)
    }
}

impl fmt::Debug for CustomFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The function applied by one operation
#[derive(Debug, Clone)]
pub enum Function {
    Binary(BinaryOperator),
    Unary(UnaryOperator),
    Builtin(Builtin),
    Reduction(Reduction),
    Transform(Transform),
    Ufunc(Ufunc),
    /// Registered at runtime, rendered as a method
    Custom(CustomFunction),
    /// Supplied through `Expression::pipe`
    Pipe(CustomFunction),
}

impl Function {
    /// Display symbol or name
    pub fn name(&self) -> &str {
        match self {
            Function::Binary(op) => op.as_str(),
            Function::Unary(op) => op.as_str(),
            Function::Builtin(builtin) => builtin.name(),
            Function::Reduction(reduction) => reduction.name(),
            Function::Transform(transform) => transform.name(),
            Function::Ufunc(ufunc) => ufunc.name(),
            Function::Custom(custom) | Function::Pipe(custom) => custom.name(),
        }
    }

    /// Resolve a function by name across every function table.
    ///
    /// Built-in tables take precedence over runtime registrations.
    pub fn lookup(name: &str) -> Option<Function> {
        BinaryOperator::from_name(name)
            .map(Function::Binary)
            .or_else(|| UnaryOperator::from_name(name).map(Function::Unary))
            .or_else(|| Builtin::from_name(name).map(Function::Builtin))
            .or_else(|| Reduction::from_name(name).map(Function::Reduction))
            .or_else(|| Transform::from_name(name).map(Function::Transform))
            .or_else(|| registry::lookup(name).map(Function::Custom))
            .or_else(|| Ufunc::from_name(name).map(Function::Ufunc))
    }

    /// Whether the function consumes precomputed dimension ranges
    pub fn is_range_normalization(&self) -> bool {
        matches!(
            self,
            Function::Transform(Transform::Norm | Transform::LogNorm)
        )
    }

    /// Apply the function to already evaluated operands
    pub fn call(
        &self,
        args: &[Operand],
        kwargs: &BTreeMap<String, Operand>,
    ) -> ExpressionResult<Data> {
        let call = CallArgs::new(self.name(), args, kwargs);
        match self {
            Function::Binary(op) => {
                let left = call.data(0)?;
                let right = call.data(1)?;
                left.zip_with(right, |a, b| op.evaluate(a, b))
            }
            Function::Unary(op) => call.data(0)?.map_values(|v| op.evaluate(v)),
            Function::Builtin(Builtin::Abs) => transform::abs(call.data(0)?),
            Function::Builtin(Builtin::Round) => {
                let decimals = call.number(1, "decimals")?.unwrap_or(0.0);
                transform::round(call.data(0)?, decimals as i32)
            }
            Function::Reduction(reduction) => transform::reduce(*reduction, &call),
            Function::Transform(transform) => transform::transform(*transform, &call),
            Function::Ufunc(ufunc) => transform::ufunc(*ufunc, call.data(0)?),
            Function::Custom(custom) | Function::Pipe(custom) => custom.call(args, kwargs),
        }
    }
}

impl From<BinaryOperator> for Function {
    fn from(op: BinaryOperator) -> Self {
        Function::Binary(op)
    }
}

impl From<UnaryOperator> for Function {
    fn from(op: UnaryOperator) -> Self {
        Function::Unary(op)
    }
}

impl From<Builtin> for Function {
    fn from(builtin: Builtin) -> Self {
        Function::Builtin(builtin)
    }
}

impl From<Reduction> for Function {
    fn from(reduction: Reduction) -> Self {
        Function::Reduction(reduction)
    }
}

impl From<Transform> for Function {
    fn from(transform: Transform) -> Self {
        Function::Transform(transform)
    }
}

impl From<Ufunc> for Function {
    fn from(ufunc: Ufunc) -> Self {
        Function::Ufunc(ufunc)
    }
}
