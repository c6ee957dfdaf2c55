// vecta-core - Collection and matrix builtins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! len, sum, shape, zeros, ones, transpose, matmul, range, rrange,
//! interval, keys, str

use num_traits::ToPrimitive;

use super::{
    ANY, ARRAY, BuiltinHost, NUMBER, Param, Registry, arg, number_arg, optional_number, opt, req,
};
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::value::{Value, ValueKind};

pub(super) fn register(r: &mut Registry) {
    const SIZED: &[Param] = &[req(
        "value",
        &[
            ValueKind::String,
            ValueKind::List,
            ValueKind::Map,
            ValueKind::Matrix,
        ],
    )];
    const ONE_ARRAY: &[Param] = &[req("m", ARRAY)];
    const TWO_ARRAYS: &[Param] = &[req("a", ARRAY), req("b", ARRAY)];
    const DIMS: &[Param] = &[req("rows", NUMBER), opt("cols", NUMBER)];
    const RANGE: &[Param] = &[req("lo", NUMBER), req("hi", NUMBER), opt("step", NUMBER)];
    const INTERVAL: &[Param] = &[req("lo", NUMBER), req("hi", NUMBER)];
    const MAP: &[Param] = &[req("map", &[ValueKind::Map])];
    const VALUE: &[Param] = &[req("value", ANY)];

    r.add("len", SIZED, len);
    r.add("sum", ONE_ARRAY, sum);
    r.add("shape", ONE_ARRAY, shape);
    r.add("zeros", DIMS, zeros);
    r.add("ones", DIMS, ones);
    r.add("transpose", ONE_ARRAY, transpose);
    r.add("matmul", TWO_ARRAYS, matmul);
    r.add("range", RANGE, range);
    r.add("rrange", RANGE, rrange);
    r.add("interval", INTERVAL, interval);
    r.add("keys", MAP, keys);
    r.add("str", VALUE, str_of);
}

fn len(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let n = match arg("len", args, 0)? {
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(entries) => entries.len(),
        Value::Matrix(m) => m.len(),
        other => {
            return Err(Error::builtin_arg(
                "len",
                0,
                format!("{} has no length", other.kind()),
            ));
        }
    };
    Ok(Value::Number(n as f64))
}

fn sum(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let numbers = arg("sum", args, 0)?
        .to_numbers()
        .map_err(|e| Error::builtin_arg("sum", 0, e.to_string()))?;
    Ok(Value::Number(numbers.iter().sum()))
}

fn as_matrix(function: &'static str, args: &[Value], i: usize) -> Result<Matrix> {
    arg(function, args, i)?
        .to_matrix()
        .map_err(|e| Error::builtin_arg(function, i, e.to_string()))
}

fn shape(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let m = as_matrix("shape", args, 0)?;
    Ok(Value::List(
        m.shape().iter().map(|d| Value::Number(*d as f64)).collect(),
    ))
}

fn dimension(function: &'static str, args: &[Value], i: usize) -> Result<Option<usize>> {
    let Some(n) = optional_number(args, i) else {
        return Ok(None);
    };
    match n.to_usize() {
        Some(d) if n.fract() == 0.0 => Ok(Some(d)),
        _ => Err(Error::builtin_arg(
            function,
            i,
            format!("dimension must be a non-negative whole number, got {}", n),
        )),
    }
}

fn filled(
    function: &'static str,
    host: &mut dyn BuiltinHost,
    args: &[Value],
    value: f64,
) -> Result<Value> {
    let rows = dimension(function, args, 0)?.unwrap_or(0);
    let cols = dimension(function, args, 1)?;
    let count = rows.checked_mul(cols.unwrap_or(1)).unwrap_or(usize::MAX);
    let limit = host.config().max_range_elements;
    if count > limit {
        return Err(Error::RangeTooLarge {
            requested: count as f64,
            limit,
        });
    }
    let shape = match cols {
        Some(cols) => vec![rows, cols],
        None => vec![rows],
    };
    Ok(Value::Matrix(Matrix::filled(shape, value)?))
}

fn zeros(host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    filled("zeros", host, args, 0.0)
}

fn ones(host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    filled("ones", host, args, 1.0)
}

fn transpose(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let m = as_matrix("transpose", args, 0)?;
    Ok(Value::Matrix(m.transpose()?))
}

fn matmul(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let a = as_matrix("matmul", args, 0)?;
    let b = as_matrix("matmul", args, 1)?;
    Ok(Value::Matrix(a.matmul(&b)?))
}

// ============================================================================
// Ranges
// ============================================================================

/// Number of values `lo, lo + step, ...` strictly before `hi`, checked
/// against the configured limit before anything is allocated.
fn range_len(function: &'static str, lo: f64, hi: f64, step: f64, limit: usize) -> Result<usize> {
    if step == 0.0 || !step.is_finite() {
        return Err(Error::builtin_arg(function, 2, "step must be a non-zero number"));
    }
    let count = ((hi - lo) / step).ceil();
    if count.is_nan() {
        return Err(Error::builtin(function, "bounds must be numbers"));
    }
    let count = count.max(0.0);
    if count > limit as f64 {
        return Err(Error::RangeTooLarge {
            requested: count,
            limit,
        });
    }
    count
        .to_usize()
        .ok_or_else(|| Error::builtin(function, "bounds must be finite"))
}

fn make_range(
    function: &'static str,
    host: &mut dyn BuiltinHost,
    args: &[Value],
    default_step: f64,
) -> Result<Value> {
    let lo = number_arg(function, args, 0)?;
    let hi = number_arg(function, args, 1)?;
    let step = optional_number(args, 2).unwrap_or(default_step);
    let count = range_len(function, lo, hi, step, host.config().max_range_elements)?;
    let data = (0..count).map(|i| lo + step * i as f64).collect();
    Ok(Value::Matrix(Matrix::vector(data)))
}

fn range(host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    make_range("range", host, args, 1.0)
}

fn rrange(host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    make_range("rrange", host, args, -1.0)
}

fn interval(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    Ok(Value::Range {
        lo: number_arg("interval", args, 0)?,
        hi: number_arg("interval", args, 1)?,
    })
}

fn keys(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    match arg("keys", args, 0)? {
        Value::Map(entries) => Ok(Value::List(entries.keys().map(|k| k.to_value()).collect())),
        other => Err(Error::builtin_arg(
            "keys",
            0,
            format!("expected Map, got {}", other.kind()),
        )),
    }
}

fn str_of(_host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let value = arg("str", args, 0)?;
    Ok(Value::string(&value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::super::test_host::{TestHost, call};
    use crate::error::Error;
    use crate::value::Value;

    fn n(x: f64) -> Value {
        Value::Number(x)
    }

    #[test]
    fn test_range_default_step() {
        let mut host = TestHost::new();
        let v = call(&mut host, "range", vec![n(0.0), n(4.0)]).unwrap();
        assert_eq!(v.to_string(), "#[0, 1, 2, 3]");
    }

    #[test]
    fn test_rrange_counts_down() {
        let mut host = TestHost::new();
        let v = call(&mut host, "rrange", vec![n(3.0), n(0.0)]).unwrap();
        assert_eq!(v.to_string(), "#[3, 2, 1]");
        let v = call(&mut host, "rrange", vec![n(0.0), n(3.0)]).unwrap();
        assert_eq!(v.to_string(), "#[]");
    }

    #[test]
    fn test_range_with_step() {
        let mut host = TestHost::new();
        let v = call(&mut host, "range", vec![n(0.0), n(1.0), n(0.25)]).unwrap();
        assert_eq!(v.to_string(), "#[0, 0.25, 0.5, 0.75]");
    }

    #[test]
    fn test_range_cap() {
        let mut host = TestHost::new();
        let err = call(&mut host, "range", vec![n(0.0), n(10_000_000.0)]).unwrap_err();
        assert_eq!(
            err,
            Error::RangeTooLarge {
                requested: 10_000_000.0,
                limit: 1_000_000
            }
        );
    }

    #[test]
    fn test_range_zero_step() {
        let mut host = TestHost::new();
        let err = call(&mut host, "range", vec![n(0.0), n(1.0), n(0.0)]).unwrap_err();
        assert_eq!(err.argument_index(), Some(2));
    }

    #[test]
    fn test_range_nan_bound() {
        let mut host = TestHost::new();
        let err = call(&mut host, "range", vec![n(0.0), n(f64::NAN)]).unwrap_err();
        assert!(err.to_string().contains("bounds must be numbers"));
        let err = call(&mut host, "rrange", vec![n(f64::NAN), n(3.0)]).unwrap_err();
        assert!(err.to_string().contains("bounds must be numbers"));
    }

    #[test]
    fn test_shape_and_sum() {
        let mut host = TestHost::new();
        let m = call(&mut host, "ones", vec![n(2.0), n(3.0)]).unwrap();
        let s = call(&mut host, "shape", vec![m.clone()]).unwrap();
        assert_eq!(s.to_string(), "[2, 3]");
        assert_eq!(call(&mut host, "sum", vec![m]).unwrap(), n(6.0));
    }

    #[test]
    fn test_len_of_kinds() {
        let mut host = TestHost::new();
        assert_eq!(call(&mut host, "len", vec![Value::string("héllo")]).unwrap(), n(5.0));
        let err = call(&mut host, "len", vec![n(1.0)]).unwrap_err();
        assert!(err.to_string().contains("String or List or Map or Matrix"));
    }

    #[test]
    fn test_interval_and_str() {
        let mut host = TestHost::new();
        let r = call(&mut host, "interval", vec![n(0.0), n(2.0)]).unwrap();
        assert_eq!(r, Value::Range { lo: 0.0, hi: 2.0 });
        let s = call(&mut host, "str", vec![r]).unwrap();
        assert_eq!(s, Value::string("interval(0, 2)"));
    }
}
