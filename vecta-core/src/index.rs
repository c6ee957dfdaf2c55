// vecta-core - Indexing and indexed assignment
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Reading and writing through `container[index]`.

use num_traits::ToPrimitive;

use crate::error::{Error, Result};
use crate::matrix::{Matrix, RowValue};
use crate::value::{MapKey, Value, ValueKind, to_index};

/// Bounds of a range used as a slice. Both ends must be whole numbers with
/// `lo <= hi <= len`.
fn slice_bounds(lo: f64, hi: f64, len: usize) -> Result<(usize, usize)> {
    for end in [lo, hi] {
        if !end.is_finite() || end.fract() != 0.0 {
            return Err(Error::NonIntegralIndex(end));
        }
    }
    match (lo.to_usize(), hi.to_usize()) {
        (Some(lo), Some(hi)) if lo <= hi && hi <= len => Ok((lo, hi)),
        _ => Err(Error::InvalidValue(format!(
            "slice interval({}, {}) is out of range for length {}",
            lo, hi, len
        ))),
    }
}

/// Read `container[index]`.
pub fn index(container: &Value, index: &Value) -> Result<Value> {
    match (container, index) {
        (Value::List(items), Value::Number(n)) => {
            let i = to_index(*n, items.len(), ValueKind::List)?;
            Ok(items[i].clone())
        }
        (Value::List(items), Value::Range { lo, hi }) => {
            let (lo, hi) = slice_bounds(*lo, *hi, items.len())?;
            Ok(Value::List(items.clone().slice(lo..hi)))
        }
        (Value::Matrix(m), Value::Number(n)) => {
            let i = to_index(*n, m.len(), ValueKind::Matrix)?;
            if m.ndim() == 1 {
                Ok(Value::Number(m.scalar(i)?))
            } else {
                Ok(Value::Matrix(m.row(i)?))
            }
        }
        (Value::Matrix(m), Value::Range { lo, hi }) => {
            let (lo, hi) = slice_bounds(*lo, *hi, m.len())?;
            Ok(Value::Matrix(m.slice(lo, hi)?))
        }
        (Value::Map(entries), Value::Number(_) | Value::String(_)) => {
            let key = MapKey::from_value(index)?;
            entries
                .get(&key)
                .cloned()
                .ok_or_else(|| Error::MissingKey(key.to_string()))
        }
        (Value::String(s), Value::Number(n)) => {
            let count = s.chars().count();
            let i = to_index(*n, count, ValueKind::String)?;
            let ch: String = s.chars().skip(i).take(1).collect();
            Ok(Value::string(&ch))
        }
        _ => Err(Error::InvalidIndex {
            container: container.kind(),
            index: index.kind(),
        }),
    }
}

/// Return a copy of `container` with `container[path[0]][path[1]]... = value`.
///
/// Intermediate containers are rebuilt along the path; the original is left
/// untouched.
pub fn assign_path(container: &Value, path: &[Value], value: Value) -> Result<Value> {
    match path {
        [] => Ok(value),
        [last] => assign(container, last, value),
        [first, rest @ ..] => {
            let child = index(container, first)?;
            let updated = assign_path(&child, rest, value)?;
            assign(container, first, updated)
        }
    }
}

/// Return a copy of `container` with `container[index] = value`.
pub fn assign(container: &Value, index: &Value, value: Value) -> Result<Value> {
    match (container, index) {
        (Value::List(items), Value::Number(n)) => {
            let i = to_index(*n, items.len(), ValueKind::List)?;
            Ok(Value::List(items.update(i, value)))
        }
        (Value::Map(entries), Value::Number(_) | Value::String(_)) => {
            let key = MapKey::from_value(index)?;
            Ok(Value::Map(entries.update(key, value)))
        }
        (Value::Matrix(m), Value::Number(n)) => {
            let i = to_index(*n, m.len(), ValueKind::Matrix)?;
            let updated = match &value {
                Value::Number(x) => m.with_row(i, RowValue::Scalar(*x))?,
                Value::Matrix(row) => m.with_row(i, RowValue::Row(row))?,
                Value::List(_) => {
                    let row: Matrix = value.to_matrix()?;
                    m.with_row(i, RowValue::Row(&row))?
                }
                other => {
                    return Err(Error::InvalidValue(format!(
                        "cannot store a {} in a Matrix",
                        other.kind()
                    )));
                }
            };
            Ok(Value::Matrix(updated))
        }
        _ => Err(Error::InvalidIndex {
            container: container.kind(),
            index: index.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: Vec<Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    fn grid() -> Value {
        list(vec![
            list(vec![1.0.into(), 2.0.into()]),
            list(vec![3.0.into(), 4.0.into()]),
        ])
    }

    #[test]
    fn test_nested_assign() {
        let m = grid();
        let updated = assign_path(&m, &[0.0.into(), 1.0.into()], 9.0.into()).unwrap();
        assert_eq!(updated.to_string(), "[[1, 9], [3, 4]]");
        assert_eq!(m.to_string(), "[[1, 2], [3, 4]]");
    }

    #[test]
    fn test_matrix_row_and_scalar() {
        let m = Value::Matrix(Matrix::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap());
        let row = index(&m, &1.0.into()).unwrap();
        assert_eq!(row.to_string(), "#[3, 4]");
        assert_eq!(index(&row, &0.0.into()).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_vector_out_of_range() {
        let v = Value::Matrix(Matrix::vector(vec![1.0, 2.0]));
        assert_eq!(
            index(&v, &2.0.into()),
            Err(Error::IndexOutOfRange {
                index: 2.0,
                len: 2,
                kind: ValueKind::Matrix
            })
        );
    }

    #[test]
    fn test_matrix_assign_copies() {
        let original = Matrix::vector(vec![1.0, 2.0, 3.0]);
        let m = Value::Matrix(original.clone());
        let updated = assign(&m, &1.0.into(), 7.0.into()).unwrap();
        assert_eq!(updated.to_string(), "#[1, 7, 3]");
        assert_eq!(original.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_map_insert_and_missing_key() {
        let m = Value::Map(Default::default());
        let updated = assign(&m, &"k".into(), 1.0.into()).unwrap();
        assert_eq!(index(&updated, &"k".into()).unwrap(), Value::Number(1.0));
        assert_eq!(
            index(&updated, &"z".into()),
            Err(Error::MissingKey("\"z\"".into()))
        );
    }

    #[test]
    fn test_range_slice() {
        let l = list(vec![0.0.into(), 1.0.into(), 2.0.into(), 3.0.into()]);
        let s = index(&l, &Value::Range { lo: 1.0, hi: 3.0 }).unwrap();
        assert_eq!(s.to_string(), "[1, 2]");
        assert!(index(&l, &Value::Range { lo: 3.0, hi: 1.0 }).is_err());
    }

    #[test]
    fn test_invalid_index_kind() {
        let err = index(&Value::Number(1.0), &Value::Number(0.0)).unwrap_err();
        assert_eq!(err.to_string(), "cannot index Number with Number");
    }
}
