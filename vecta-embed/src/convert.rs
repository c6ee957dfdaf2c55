// vecta-embed - Type conversion traits
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type conversion between Rust and Vecta values.
//!
//! | Rust Type | Vecta Type |
//! |-----------|------------|
//! | `f64`, `i64` | `Number` |
//! | `bool` | `Number` (1 or 0) |
//! | `String`, `&str` | `String` |
//! | `Vec<T>` | `List` (a `Matrix` converts row by row) |
//!
//! # Custom Conversions
//!
//! ```rust
//! use vecta_embed::{Error, FromValue, IntoValue, Result, Value};
//!
//! struct Point { x: f64, y: f64 }
//!
//! impl IntoValue for Point {
//!     fn into_value(self) -> Value {
//!         vec![self.x, self.y].into_value()
//!     }
//! }
//!
//! impl FromValue for Point {
//!     fn from_value(value: &Value) -> Result<Self> {
//!         match <Vec<f64>>::from_value(value)?.as_slice() {
//!             [x, y] => Ok(Point { x: *x, y: *y }),
//!             _ => Err(Error::conversion("a pair of Numbers", value.kind())),
//!         }
//!     }
//! }
//!
//! let p = Point::from_value(&Point { x: 1.0, y: 2.0 }.into_value()).unwrap();
//! assert_eq!(p.y, 2.0);
//! ```

use std::rc::Rc;

use im::Vector;
use vecta_core::{Matrix, Value};

use crate::error::{Error, Result};

/// Convert a Rust type into a `Value`.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Convert a `Value` into a Rust type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

/// Convert a Rust value into a `Value`.
pub fn to_value<T: IntoValue>(value: T) -> Value {
    value.into_value()
}

/// Convert a `Value` into a Rust value.
pub fn from_value<T: FromValue>(value: &Value) -> Result<T> {
    T::from_value(value)
}

// ============================================================================
// IntoValue implementations
// ============================================================================

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Number(self)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Number(self as f64)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::bool(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(Rc::from(self))
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::string(self)
    }
}

impl IntoValue for Matrix {
    fn into_value(self) -> Value {
        Value::Matrix(self)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

// ============================================================================
// FromValue implementations
// ============================================================================

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(*n),
            other => Err(Error::conversion("Number", other.kind())),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        let n = f64::from_value(value)?;
        if n.fract() != 0.0 || !(i64::MIN as f64..=i64::MAX as f64).contains(&n) {
            return Err(Error::NumberRange {
                expected: "a whole Number",
                value: n,
            });
        }
        Ok(n as i64)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(f64::from_value(value)? != 0.0)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            other => Err(Error::conversion("String", other.kind())),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            Value::Matrix(m) => matrix_items(m)?.iter().map(T::from_value).collect(),
            other => Err(Error::conversion("List or Matrix", other.kind())),
        }
    }
}

/// Elements along the first axis: Numbers for a vector, rows otherwise.
fn matrix_items(m: &Matrix) -> Result<Vector<Value>> {
    (0..m.len())
        .map(|i| {
            if m.ndim() == 1 {
                Ok(Value::Number(m.scalar(i)?))
            } else {
                Ok(Value::Matrix(m.row(i)?))
            }
        })
        .collect()
}
