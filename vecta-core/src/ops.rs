// vecta-core - Operators over values
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Binary and unary operators.
//!
//! Operators are defined for a closed set of kind pairs; anything else is
//! [`Error::UnsupportedBinary`].

use vecta_parser::{BinaryOp, UnaryOp};

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::value::Value;

fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Apply `op` to two numbers.
pub fn apply_numbers(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Eq => truth(a == b),
        BinaryOp::NotEq => truth(a != b),
        BinaryOp::Lt => truth(a < b),
        BinaryOp::LtEq => truth(a <= b),
        BinaryOp::Gt => truth(a > b),
        BinaryOp::GtEq => truth(a >= b),
        BinaryOp::And => truth(a != 0.0 && b != 0.0),
        BinaryOp::Or => truth(a != 0.0 || b != 0.0),
    }
}

/// Evaluate `lhs op rhs`.
pub fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(apply_numbers(op, *a, *b))),

        (Value::Number(a), Value::Matrix(m)) => {
            let a = *a;
            Ok(Value::Matrix(m.map(|x| apply_numbers(op, a, x))))
        }
        (Value::Matrix(m), Value::Number(b)) => {
            let b = *b;
            Ok(Value::Matrix(m.map(|x| apply_numbers(op, x, b))))
        }

        (Value::Number(_), Value::List(items)) => items
            .iter()
            .map(|item| binary(op, lhs, item))
            .collect::<Result<_>>()
            .map(Value::List),
        (Value::List(items), Value::Number(_)) => items
            .iter()
            .map(|item| binary(op, item, rhs))
            .collect::<Result<_>>()
            .map(Value::List),

        (Value::Matrix(a), Value::Matrix(b)) => matrix_pair(op, a, b),

        _ => Err(Error::UnsupportedBinary {
            op: op.symbol(),
            lhs: lhs.kind(),
            rhs: rhs.kind(),
        }),
    }
}

fn matrix_pair(op: BinaryOp, a: &Matrix, b: &Matrix) -> Result<Value> {
    if op == BinaryOp::NotEq {
        let equal = matrix_pair(BinaryOp::Eq, a, b)?;
        return Ok(Value::bool(equal == Value::Number(0.0)));
    }
    let elementwise = a.zip_with(b, |x, y| apply_numbers(op, x, y))?;
    if op.is_comparison() {
        let all = elementwise.iter().all(|x| x != 0.0);
        Ok(Value::bool(all))
    } else {
        Ok(Value::Matrix(elementwise))
    }
}

/// Evaluate a prefix operator other than print, which the VM handles.
pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value> {
    match (op, operand) {
        (UnaryOp::Not, Value::Number(n)) => Ok(Value::bool(*n == 0.0)),
        (UnaryOp::Not, Value::Matrix(m)) => Ok(Value::Matrix(m.map(|x| truth(x == 0.0)))),
        (UnaryOp::Not, Value::List(items)) => items
            .iter()
            .map(|item| unary(op, item))
            .collect::<Result<_>>()
            .map(Value::List),
        (UnaryOp::Print, value) => Ok(value.clone()),
        _ => Err(Error::UnsupportedUnary {
            op: op.symbol(),
            operand: operand.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    fn vector(data: &[f64]) -> Value {
        Value::Matrix(Matrix::vector(data.to_vec()))
    }

    #[test]
    fn test_number_arithmetic() {
        let v = binary(BinaryOp::Sub, &Value::Number(5.0), &Value::Number(7.0)).unwrap();
        assert_eq!(v, Value::Number(-2.0));
        let v = binary(BinaryOp::Div, &Value::Number(1.0), &Value::Number(0.0)).unwrap();
        assert_eq!(v, Value::Number(f64::INFINITY));
    }

    #[test]
    fn test_logic_yields_truth_values() {
        let t = Value::Number(3.0);
        let f = Value::Number(0.0);
        assert_eq!(binary(BinaryOp::And, &t, &f).unwrap(), Value::Number(0.0));
        assert_eq!(binary(BinaryOp::Or, &t, &f).unwrap(), Value::Number(1.0));
        assert_eq!(binary(BinaryOp::LtEq, &f, &t).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_scalar_matrix_respects_order() {
        let m = vector(&[1.0, 2.0]);
        let left = binary(BinaryOp::Sub, &Value::Number(10.0), &m).unwrap();
        assert_eq!(left, vector(&[9.0, 8.0]));
        let right = binary(BinaryOp::Sub, &m, &Value::Number(10.0)).unwrap();
        assert_eq!(right, vector(&[-9.0, -8.0]));
        let cmp = binary(BinaryOp::Lt, &Value::Number(1.5), &m).unwrap();
        assert_eq!(cmp, vector(&[0.0, 1.0]));
    }

    #[test]
    fn test_matrix_comparison_reduces() {
        let a = vector(&[1.0, 2.0]);
        let b = vector(&[1.0, 3.0]);
        assert_eq!(binary(BinaryOp::Eq, &a, &a).unwrap(), Value::Number(1.0));
        assert_eq!(binary(BinaryOp::Eq, &a, &b).unwrap(), Value::Number(0.0));
        assert_eq!(binary(BinaryOp::NotEq, &a, &b).unwrap(), Value::Number(1.0));
        assert_eq!(binary(BinaryOp::NotEq, &a, &a).unwrap(), Value::Number(0.0));
    }

    #[test]
    fn test_matrix_shape_mismatch() {
        let a = vector(&[1.0, 2.0]);
        let b = vector(&[1.0]);
        assert!(matches!(
            binary(BinaryOp::Add, &a, &b),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_list_broadcast_short_circuits() {
        let items = Value::List(
            vec![Value::Number(1.0), Value::string("x"), Value::Number(2.0)]
                .into_iter()
                .collect(),
        );
        let err = binary(BinaryOp::Mul, &items, &Value::Number(2.0)).unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedBinary {
                op: "*",
                lhs: ValueKind::String,
                rhs: ValueKind::Number
            }
        );
    }

    #[test]
    fn test_unsupported_pair_message() {
        let err = binary(BinaryOp::Add, &Value::string("a"), &Value::string("b")).unwrap_err();
        assert_eq!(err.to_string(), "don't know how to compute String + String");
    }

    #[test]
    fn test_not() {
        assert_eq!(
            unary(UnaryOp::Not, &Value::Number(0.0)).unwrap(),
            Value::Number(1.0)
        );
        assert_eq!(
            unary(UnaryOp::Not, &vector(&[0.0, 4.0])).unwrap(),
            vector(&[1.0, 0.0])
        );
        assert!(unary(UnaryOp::Not, &Value::string("s")).is_err());
    }
}
