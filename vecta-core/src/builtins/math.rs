// vecta-core - Mathematical builtins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! sin, cos, tan, asin, acos, atan, atan2, sqrt, exp, log, abs, floor,
//! ceil, round, pow, min, max, random

use super::{BuiltinHost, NUMBER, NUMERIC, Param, Registry, arg, number_arg, opt, req};
use crate::error::{Error, Result};
use crate::value::Value;

pub(super) fn register(r: &mut Registry) {
    const X: &[Param] = &[req("x", NUMERIC)];
    const ATAN2: &[Param] = &[req("y", NUMBER), req("x", NUMBER)];
    const POW: &[Param] = &[req("base", NUMERIC), req("exponent", NUMBER)];
    const EXTREMUM: &[Param] = &[req("a", NUMERIC), opt("b", NUMBER)];

    r.add("sin", X, sin);
    r.add("cos", X, cos);
    r.add("tan", X, tan);
    r.add("asin", X, asin);
    r.add("acos", X, acos);
    r.add("atan", X, atan);
    r.add("sqrt", X, sqrt);
    r.add("exp", X, exp);
    r.add("log", X, log);
    r.add("abs", X, abs);
    r.add("floor", X, floor);
    r.add("ceil", X, ceil);
    r.add("round", X, round);
    r.add("atan2", ATAN2, atan2);
    r.add("pow", POW, pow);
    r.add("min", EXTREMUM, min);
    r.add("max", EXTREMUM, max);
    r.add("random", &[], random);
}

// ============================================================================
// Elementwise helpers
// ============================================================================

fn elementwise(function: &'static str, value: &Value, f: impl Fn(f64) -> f64) -> Result<Value> {
    match value {
        Value::Number(n) => Ok(Value::Number(f(*n))),
        Value::Matrix(m) => Ok(Value::Matrix(m.map(f))),
        other => Err(Error::builtin_arg(
            function,
            0,
            format!("expected Number or Matrix, got {}", other.kind()),
        )),
    }
}

macro_rules! unary_math {
    ($($name:ident => $f:expr),* $(,)?) => {
        $(
            fn $name(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
                elementwise(stringify!($name), arg(stringify!($name), args, 0)?, $f)
            }
        )*
    };
}

unary_math! {
    sin => f64::sin,
    cos => f64::cos,
    tan => f64::tan,
    asin => f64::asin,
    acos => f64::acos,
    atan => f64::atan,
    sqrt => f64::sqrt,
    exp => f64::exp,
    log => f64::ln,
    abs => f64::abs,
    floor => f64::floor,
    ceil => f64::ceil,
    round => f64::round,
}

// ============================================================================
// Two-argument functions
// ============================================================================

fn atan2(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let y = number_arg("atan2", args, 0)?;
    let x = number_arg("atan2", args, 1)?;
    Ok(Value::Number(y.atan2(x)))
}

fn pow(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let exponent = number_arg("pow", args, 1)?;
    elementwise("pow", arg("pow", args, 0)?, |b| b.powf(exponent))
}

/// `min(a)` reduces a matrix; `min(a, b)` compares (elementwise for a matrix).
fn extremum(
    function: &'static str,
    args: &[Value],
    pick: fn(f64, f64) -> f64,
) -> Result<Value> {
    let a = arg(function, args, 0)?;
    match (a, args.get(1)) {
        (_, Some(b)) => {
            let b = b
                .as_number()
                .ok_or_else(|| Error::builtin_arg(function, 1, "expected Number"))?;
            elementwise(function, a, |x| pick(x, b))
        }
        (Value::Number(n), None) => Ok(Value::Number(*n)),
        (Value::Matrix(m), None) => m
            .iter()
            .reduce(pick)
            .map(Value::Number)
            .ok_or_else(|| Error::builtin_arg(function, 0, "matrix is empty")),
        (other, None) => Err(Error::builtin_arg(
            function,
            0,
            format!("expected Number or Matrix, got {}", other.kind()),
        )),
    }
}

fn min(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    extremum("min", args, f64::min)
}

fn max(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    extremum("max", args, f64::max)
}

fn random(host: &mut dyn BuiltinHost, _args: &[Value]) -> Result<Value> {
    Ok(Value::Number(host.random()))
}

#[cfg(test)]
mod tests {
    use super::super::test_host::{TestHost, call};
    use crate::matrix::Matrix;
    use crate::value::Value;

    #[test]
    fn test_sin_of_number() {
        let mut host = TestHost::new();
        let v = call(&mut host, "sin", vec![Value::Number(0.0)]).unwrap();
        assert_eq!(v, Value::Number(0.0));
    }

    #[test]
    fn test_sqrt_elementwise() {
        let mut host = TestHost::new();
        let m = Value::Matrix(Matrix::vector(vec![4.0, 9.0]));
        let v = call(&mut host, "sqrt", vec![m]).unwrap();
        assert_eq!(v, Value::Matrix(Matrix::vector(vec![2.0, 3.0])));
    }

    #[test]
    fn test_min_reduces_matrix() {
        let mut host = TestHost::new();
        let m = Value::Matrix(Matrix::vector(vec![4.0, -1.0, 9.0]));
        assert_eq!(call(&mut host, "min", vec![m]).unwrap(), Value::Number(-1.0));
        let v = call(&mut host, "max", vec![Value::Number(2.0), Value::Number(5.0)]).unwrap();
        assert_eq!(v, Value::Number(5.0));
    }

    #[test]
    fn test_pow_matrix() {
        let mut host = TestHost::new();
        let m = Value::Matrix(Matrix::vector(vec![2.0, 3.0]));
        let v = call(&mut host, "pow", vec![m, Value::Number(2.0)]).unwrap();
        assert_eq!(v.to_string(), "#[4, 9]");
    }

    #[test]
    fn test_random_is_seeded() {
        let mut a = TestHost::new();
        let mut b = TestHost::new();
        let x = call(&mut a, "random", vec![]).unwrap();
        let y = call(&mut b, "random", vec![]).unwrap();
        assert_eq!(x, y);
    }
}
