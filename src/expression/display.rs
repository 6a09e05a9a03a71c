//! Readable rendering of expressions.
//!
//! The text mirrors how the expression would be written by hand: the anchor
//! is wrapped in `dim(...)` once the first operation is applied, operators
//! render infix without spaces, builtins and ufuncs render as calls and the
//! remaining functions render as method suffixes. Keyword arguments are
//! sorted by name.

use std::fmt;

use crate::access::Value;
use crate::expression::arg::Arg;
use crate::expression::expr::{Expression, Operation};
use crate::expression::function::Function;

struct Rendered {
    text: String,
    /// Already wrapped in `dim(...)`
    wrapped: bool,
    /// Top level is an operator and needs parentheses before being extended
    compound: bool,
}

impl Rendered {
    fn receiver(&self) -> String {
        if !self.wrapped {
            format!("dim({})", self.text)
        } else if self.compound {
            format!("({})", self.text)
        } else {
            self.text.clone()
        }
    }

    /// Form used as the sole argument of a call, where no parentheses are
    /// needed around operators
    fn call_operand(&self) -> String {
        if self.wrapped {
            self.text.clone()
        } else {
            format!("dim({})", self.text)
        }
    }
}

fn render(expr: &Expression) -> Rendered {
    let mut rendered = Rendered {
        text: Value::from(expr.dimension()).repr(),
        wrapped: false,
        compound: false,
    };
    for op in expr.operations() {
        rendered = render_operation(rendered, op);
    }
    rendered
}

fn render_operation(current: Rendered, op: &Operation) -> Rendered {
    let params = parameters(op);
    let (text, compound) = match &op.function {
        Function::Binary(binary) => {
            let other = op.args.first().map(operand).unwrap_or_default();
            let text = if op.reverse {
                format!("{}{}{}", other, binary.as_str(), current.receiver())
            } else {
                format!("{}{}{}", current.receiver(), binary.as_str(), other)
            };
            (text, true)
        }
        Function::Unary(unary) => (format!("{}{}", unary.as_str(), current.receiver()), true),
        Function::Builtin(builtin) => (call(builtin.name(), &current, &params), false),
        Function::Ufunc(ufunc) => {
            let name = if ufunc.in_numpy_namespace() {
                format!("np.{}", ufunc.name())
            } else {
                ufunc.name().to_string()
            };
            (call(&name, &current, &params), false)
        }
        Function::Reduction(_) | Function::Transform(_) | Function::Custom(_) => (
            format!("{}.{}({})", current.receiver(), op.function.name(), params.join(", ")),
            false,
        ),
        Function::Pipe(func) => {
            let mut piped = vec![func.name().to_string()];
            piped.extend(params);
            (format!("{}.pipe({})", current.receiver(), piped.join(", ")), false)
        }
    };
    Rendered {
        text,
        wrapped: true,
        compound,
    }
}

fn call(name: &str, current: &Rendered, params: &[String]) -> String {
    let mut items = vec![current.call_operand()];
    items.extend(params.iter().cloned());
    format!("{}({})", name, items.join(", "))
}

/// Positional reprs followed by `key=value` pairs
fn parameters(op: &Operation) -> Vec<String> {
    op.args
        .iter()
        .map(Arg::repr)
        .chain(
            op.kwargs
                .iter()
                .map(|(key, value)| format!("{}={}", key, value.repr())),
        )
        .collect()
}

/// Form of a nested expression inside an argument list
pub(crate) fn embedded(expr: &Expression) -> String {
    render(expr).call_operand()
}

/// Right-hand operand of an infix operator
fn operand(arg: &Arg) -> String {
    match arg {
        Arg::Expr(expr) => {
            let rendered = render(expr);
            if rendered.compound {
                format!("({})", rendered.text)
            } else {
                rendered.call_operand()
            }
        }
        other => other.repr(),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self).text)
    }
}

#[cfg(test)]
mod tests {
    use crate::access::{Data, DataType, Value};
    use crate::expression::arg::{Arg, Kwargs};
    use crate::expression::function::{CustomFunction, Ufunc};
    use crate::expression::{dim, Expression};

    #[test]
    fn test_bare_dimension() {
        assert_eq!(dim("x").to_string(), "'x'");
    }

    #[test]
    fn test_infix_operators() {
        assert_eq!((dim("x") + 1).to_string(), "dim('x')+1");
        assert_eq!((dim("x") * 2 + 1).to_string(), "(dim('x')*2)+1");
        assert_eq!((1_i32 - dim("x")).to_string(), "1-dim('x')");
        assert_eq!(dim("x").pow(2.5).to_string(), "dim('x')**2.5");
        assert_eq!(dim("x").equal("a").to_string(), "dim('x')='a'");
        assert_eq!((dim("x") + dim("y")).to_string(), "dim('x')+dim('y')");
        assert_eq!(
            (dim("x") / (dim("y") + 1)).to_string(),
            "dim('x')/(dim('y')+1)"
        );
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!((-dim("x")).to_string(), "-dim('x')");
        assert_eq!((!(dim("x") * 2)).to_string(), "~(dim('x')*2)");
    }

    #[test]
    fn test_method_suffixes() {
        assert_eq!(dim("x").norm(None).to_string(), "dim('x').norm()");
        assert_eq!(
            dim("x").norm(Some((0.0, 20.0))).to_string(),
            "dim('x').norm(max=20.0, min=0.0)"
        );
        assert_eq!(
            (dim("x") * 2).sum().to_string(),
            "(dim('x')*2).sum()"
        );
        assert_eq!(
            dim("x").bin(vec![0, 10, 20], None).to_string(),
            "dim('x').bin([0, 10, 20], labels=None)"
        );
        assert_eq!(
            dim("x")
                .categorize(Arg::mapping([("p", 1)]), Value::Int(0))
                .to_string(),
            "dim('x').categorize(categories={'p': 1}, default=0)"
        );
        assert_eq!(
            dim("x").astype(DataType::Float).mean().to_string(),
            "dim('x').astype(dtype=float).mean()"
        );
        assert_eq!(
            dim("x").digitize(vec![1, 2], true).to_string(),
            "dim('x').digitize([1, 2], right=True)"
        );
    }

    #[test]
    fn test_call_forms() {
        assert_eq!(dim("x").abs().to_string(), "abs(dim('x'))");
        assert_eq!(
            (dim("x") * 2).round(1).to_string(),
            "round(dim('x')*2, decimals=1)"
        );
        assert_eq!(
            dim("x").ufunc(Ufunc::Sqrt, Kwargs::new()).to_string(),
            "np.sqrt(dim('x'))"
        );
        assert_eq!(
            dim("x").ufunc(Ufunc::Erf, Kwargs::new()).to_string(),
            "erf(dim('x'))"
        );
        assert_eq!(
            dim("x").norm(None).ufunc(Ufunc::Exp, Kwargs::new()).to_string(),
            "np.exp(dim('x').norm())"
        );
    }

    #[test]
    fn test_pipe_and_custom() {
        let func = CustomFunction::new("ratio", |_, _| Ok(Data::Array(vec![])));
        let expr = Expression::pipe(func, vec!["x".into(), "y".into()], Kwargs::new()).unwrap();
        assert_eq!(expr.to_string(), "dim('x').pipe(ratio, dim('y'))");
    }

    #[test]
    fn test_from_expression() {
        let expr = Expression::from_expression(&(dim("x") * 2)).norm(None);
        assert_eq!(expr.to_string(), "(dim('x')*2).norm()");
        assert_eq!(
            Expression::from_expression(&dim("x")).sum().to_string(),
            "dim('x').sum()"
        );
    }
}
