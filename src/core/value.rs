//! Literal values and the folding arithmetic over them.
//!
//! Host semantics are Rust's: integer division truncates toward zero and
//! the remainder takes the dividend's sign. Operations that cannot be
//! carried out safely (integer division or remainder by zero, integer
//! overflow, mismatched operand types) yield `None`, which the resolver
//! treats as "do not fold".

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully-resolved constant value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Name of the value's result type, as used by query filters.
    pub fn result_type(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Apply a binary arithmetic operator to two literal operands, in
/// argument order (`lhs op rhs`).
///
/// Returns `None` when the operation does not fold: unknown operator
/// symbol, operand types with no defined arithmetic, integer division
/// or remainder by zero, or integer overflow.
pub fn apply_binary(op: &str, lhs: &Value, rhs: &Value) -> Option<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => apply_int(op, *a, *b),
        (Value::Str(a), Value::Str(b)) if op == "+" => {
            let mut s = String::with_capacity(a.len() + b.len());
            s.push_str(a);
            s.push_str(b);
            Some(Value::Str(s))
        }
        _ => {
            let a = lhs.as_f64()?;
            let b = rhs.as_f64()?;
            apply_float(op, a, b)
        }
    }
}

fn apply_int(op: &str, a: i64, b: i64) -> Option<Value> {
    let n = match op {
        "+" => a.checked_add(b)?,
        "-" => a.checked_sub(b)?,
        "*" => a.checked_mul(b)?,
        "/" => a.checked_div(b)?,
        "%" => a.checked_rem(b)?,
        _ => return None,
    };
    Some(Value::Int(n))
}

fn apply_float(op: &str, a: f64, b: f64) -> Option<Value> {
    let x = match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => a / b,
        "%" => a % b,
        _ => return None,
    };
    Some(Value::Float(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_arithmetic_truncates_toward_zero() {
        assert_eq!(apply_binary("/", &Value::Int(7), &Value::Int(2)), Some(Value::Int(3)));
        assert_eq!(apply_binary("/", &Value::Int(-7), &Value::Int(2)), Some(Value::Int(-3)));
        assert_eq!(apply_binary("%", &Value::Int(-7), &Value::Int(2)), Some(Value::Int(-1)));
    }

    #[test]
    fn int_division_by_zero_does_not_fold() {
        assert_eq!(apply_binary("/", &Value::Int(1), &Value::Int(0)), None);
        assert_eq!(apply_binary("%", &Value::Int(1), &Value::Int(0)), None);
    }

    #[test]
    fn int_overflow_does_not_fold() {
        assert_eq!(apply_binary("+", &Value::Int(i64::MAX), &Value::Int(1)), None);
        assert_eq!(apply_binary("*", &Value::Int(i64::MAX), &Value::Int(2)), None);
    }

    #[test]
    fn mixed_operands_promote_to_float() {
        assert_eq!(
            apply_binary("+", &Value::Int(1), &Value::Float(0.5)),
            Some(Value::Float(1.5))
        );
        assert_eq!(
            apply_binary("/", &Value::Float(1.0), &Value::Int(4)),
            Some(Value::Float(0.25))
        );
    }

    #[test]
    fn string_concatenation_folds_plus_only() {
        assert_eq!(
            apply_binary("+", &Value::Str("ab".into()), &Value::Str("cd".into())),
            Some(Value::Str("abcd".into()))
        );
        assert_eq!(apply_binary("-", &Value::Str("ab".into()), &Value::Str("cd".into())), None);
    }

    #[test]
    fn unknown_operator_does_not_fold() {
        assert_eq!(apply_binary("<<", &Value::Int(1), &Value::Int(2)), None);
        assert_eq!(apply_binary("==", &Value::Int(1), &Value::Int(1)), None);
    }

    #[test]
    fn booleans_have_no_arithmetic() {
        assert_eq!(apply_binary("+", &Value::Bool(true), &Value::Bool(false)), None);
    }
}
