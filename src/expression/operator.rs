//! Operator definitions for expressions.

use std::cmp::Ordering;

use crate::access::Value;
use crate::expression::{ExpressionError, ExpressionResult};

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,

    // Bitwise
    And,
    Or,
    LShift,
    RShift,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 17] = [
        BinaryOperator::Add,
        BinaryOperator::Sub,
        BinaryOperator::Mul,
        BinaryOperator::TrueDiv,
        BinaryOperator::FloorDiv,
        BinaryOperator::Mod,
        BinaryOperator::Pow,
        BinaryOperator::And,
        BinaryOperator::Or,
        BinaryOperator::LShift,
        BinaryOperator::RShift,
        BinaryOperator::Eq,
        BinaryOperator::Ne,
        BinaryOperator::Lt,
        BinaryOperator::Le,
        BinaryOperator::Gt,
        BinaryOperator::Ge,
    ];

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::TrueDiv => "/",
            BinaryOperator::FloorDiv => "//",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::And => "&",
            BinaryOperator::Or => "|",
            BinaryOperator::LShift => "<<",
            BinaryOperator::RShift => ">>",
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
        }
    }

    /// Function name the operator is registered under
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "add",
            BinaryOperator::Sub => "sub",
            BinaryOperator::Mul => "mul",
            BinaryOperator::TrueDiv => "truediv",
            BinaryOperator::FloorDiv => "floordiv",
            BinaryOperator::Mod => "mod",
            BinaryOperator::Pow => "pow",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::LShift => "lshift",
            BinaryOperator::RShift => "rshift",
            BinaryOperator::Eq => "eq",
            BinaryOperator::Ne => "ne",
            BinaryOperator::Lt => "lt",
            BinaryOperator::Le => "le",
            BinaryOperator::Gt => "gt",
            BinaryOperator::Ge => "ge",
        }
    }

    /// Look an operator up by function name or display symbol
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name || op.as_str() == name)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Eq
                | BinaryOperator::Ne
                | BinaryOperator::Lt
                | BinaryOperator::Le
                | BinaryOperator::Gt
                | BinaryOperator::Ge
        )
    }

    /// Evaluate the operator on a single pair of elements.
    ///
    /// Nulls propagate through arithmetic and bitwise operators. Comparisons
    /// against null are false, except `!=` which is true.
    pub fn evaluate(&self, left: &Value, right: &Value) -> ExpressionResult<Value> {
        if self.is_comparison() {
            return self.compare(left, right);
        }
        if left.is_null() || right.is_null() {
            return Ok(Value::Null);
        }
        match self {
            BinaryOperator::And | BinaryOperator::Or => self.bitwise(left, right),
            BinaryOperator::LShift | BinaryOperator::RShift => self.shift(left, right),
            _ => self.arithmetic(left, right),
        }
    }

    fn invalid(&self, left: &Value, right: &Value) -> ExpressionError {
        ExpressionError::InvalidOperandTypes {
            operator: self.as_str().to_string(),
            left: left.data_type(),
            right: right.data_type(),
        }
    }

    fn arithmetic(&self, left: &Value, right: &Value) -> ExpressionResult<Value> {
        match (left, right) {
            (Value::String(a), Value::String(b)) if *self == BinaryOperator::Add => {
                Ok(Value::String(format!("{}{}", a, b)))
            }
            (Value::String(s), n) | (n, Value::String(s)) if *self == BinaryOperator::Mul => {
                let times = n.to_i64().ok_or_else(|| self.invalid(left, right))?;
                let times = usize::try_from(times.max(0)).unwrap_or(usize::MAX);
                s.len()
                    .checked_mul(times)
                    .filter(|len| *len <= isize::MAX as usize)
                    .ok_or_else(|| {
                        ExpressionError::invalid_argument(
                            self.as_str(),
                            format!("repeating a string {} times overflows", times),
                        )
                    })?;
                Ok(Value::String(s.repeat(times)))
            }
            _ => match (left.to_i64(), right.to_i64()) {
                (Some(a), Some(b)) => self.integer(a, b),
                _ => match (left.to_f64(), right.to_f64()) {
                    (Some(a), Some(b)) => Ok(Value::Float(self.float(a, b))),
                    _ => Err(self.invalid(left, right)),
                },
            },
        }
    }

    fn integer(&self, a: i64, b: i64) -> ExpressionResult<Value> {
        let value = match self {
            BinaryOperator::Add => a.wrapping_add(b),
            BinaryOperator::Sub => a.wrapping_sub(b),
            BinaryOperator::Mul => a.wrapping_mul(b),
            BinaryOperator::TrueDiv => return Ok(Value::Float(a as f64 / b as f64)),
            BinaryOperator::FloorDiv => {
                if b == 0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                let quotient = a.wrapping_div(b);
                if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
                    quotient - 1
                } else {
                    quotient
                }
            }
            BinaryOperator::Mod => {
                if b == 0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                let remainder = a.wrapping_rem(b);
                if remainder != 0 && ((remainder < 0) != (b < 0)) {
                    remainder + b
                } else {
                    remainder
                }
            }
            BinaryOperator::Pow => match u32::try_from(b) {
                Ok(exp) => a.wrapping_pow(exp),
                Err(_) => return Ok(Value::Float((a as f64).powf(b as f64))),
            },
            _ => unreachable!("arithmetic called with non-arithmetic operator"),
        };
        Ok(Value::Int(value))
    }

    fn float(&self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOperator::Add => a + b,
            BinaryOperator::Sub => a - b,
            BinaryOperator::Mul => a * b,
            BinaryOperator::TrueDiv => a / b,
            BinaryOperator::FloorDiv => (a / b).floor(),
            BinaryOperator::Mod => {
                let remainder = a % b;
                if remainder != 0.0 && ((remainder < 0.0) != (b < 0.0)) {
                    remainder + b
                } else {
                    remainder
                }
            }
            BinaryOperator::Pow => a.powf(b),
            _ => unreachable!("arithmetic called with non-arithmetic operator"),
        }
    }

    fn bitwise(&self, left: &Value, right: &Value) -> ExpressionResult<Value> {
        match (left, right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(match self {
                BinaryOperator::And => *a && *b,
                _ => *a || *b,
            })),
            _ => match (left.to_i64(), right.to_i64()) {
                (Some(a), Some(b)) => Ok(Value::Int(match self {
                    BinaryOperator::And => a & b,
                    _ => a | b,
                })),
                _ => Err(self.invalid(left, right)),
            },
        }
    }

    fn shift(&self, left: &Value, right: &Value) -> ExpressionResult<Value> {
        let (a, b) = match (left.to_i64(), right.to_i64()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(self.invalid(left, right)),
        };
        let amount = u32::try_from(b).map_err(|_| {
            ExpressionError::invalid_argument(self.name(), "negative shift count")
        })?;
        let shifted = match self {
            BinaryOperator::LShift => a.checked_shl(amount).unwrap_or(0),
            _ => a
                .checked_shr(amount)
                .unwrap_or(if a < 0 { -1 } else { 0 }),
        };
        Ok(Value::Int(shifted))
    }

    fn compare(&self, left: &Value, right: &Value) -> ExpressionResult<Value> {
        let result = match self {
            BinaryOperator::Eq => left.loose_eq(right) && !left.is_null(),
            BinaryOperator::Ne => !(left.loose_eq(right) && !left.is_null()),
            _ => match left.ordering(right, self.as_str())? {
                None => false,
                Some(ordering) => match self {
                    BinaryOperator::Lt => ordering == Ordering::Less,
                    BinaryOperator::Le => ordering != Ordering::Greater,
                    BinaryOperator::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
            },
        };
        Ok(Value::Boolean(result))
    }
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Pos,
    Neg,
    Invert,
}

impl UnaryOperator {
    pub const ALL: [UnaryOperator; 3] =
        [UnaryOperator::Pos, UnaryOperator::Neg, UnaryOperator::Invert];

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Pos => "+",
            UnaryOperator::Neg => "-",
            UnaryOperator::Invert => "~",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnaryOperator::Pos => "pos",
            UnaryOperator::Neg => "neg",
            UnaryOperator::Invert => "invert",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pos" => Some(UnaryOperator::Pos),
            "neg" => Some(UnaryOperator::Neg),
            "invert" | "not" | "~" => Some(UnaryOperator::Invert),
            _ => None,
        }
    }

    /// Evaluate the operator on a single element
    pub fn evaluate(&self, operand: &Value) -> ExpressionResult<Value> {
        let invalid = || ExpressionError::InvalidOperandTypes {
            operator: self.as_str().to_string(),
            left: operand.data_type(),
            right: None,
        };
        match (self, operand) {
            (_, Value::Null) => Ok(Value::Null),
            (UnaryOperator::Pos, Value::Int(_) | Value::Float(_)) => Ok(operand.clone()),
            (UnaryOperator::Neg, Value::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
            (UnaryOperator::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
            (UnaryOperator::Invert, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
            (UnaryOperator::Invert, Value::Int(i)) => Ok(Value::Int(!i)),
            _ => Err(invalid()),
        }
    }
}
