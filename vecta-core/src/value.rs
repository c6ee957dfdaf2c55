// vecta-core - Runtime values
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Runtime value type.
//!
//! [`Value`] is a closed sum type. Lists and maps are persistent `im`
//! collections, so cloning a value onto the stack is cheap and later index
//! writes never alter a copy held elsewhere.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use im::{OrdMap, Vector};
use num_traits::ToPrimitive;
use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::matrix::Matrix;

// ============================================================================
// Kinds
// ============================================================================

/// Discriminant of a [`Value`], used for argument checking and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Number,
    String,
    List,
    Map,
    Matrix,
    Range,
    Function,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Number => "Number",
            ValueKind::String => "String",
            ValueKind::List => "List",
            ValueKind::Map => "Map",
            ValueKind::Matrix => "Matrix",
            ValueKind::Range => "Range",
            ValueKind::Function => "Function",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Function references
// ============================================================================

/// A callable value. Holds an index into the compiled program or the
/// builtin registry, never another value.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionRef {
    User {
        id: usize,
        name: Rc<str>,
        params: Rc<[String]>,
    },
    Builtin {
        id: usize,
        name: &'static str,
    },
}

impl FunctionRef {
    pub fn name(&self) -> &str {
        match self {
            FunctionRef::User { name, .. } => name,
            FunctionRef::Builtin { name, .. } => name,
        }
    }
}

// ============================================================================
// Map keys
// ============================================================================

/// Key of a map value. Numbers order by `total_cmp` and sort before strings.
#[derive(Debug, Clone)]
pub enum MapKey {
    Number(f64),
    String(Rc<str>),
}

impl MapKey {
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(MapKey::Number(*n)),
            Value::String(s) => Ok(MapKey::String(Rc::clone(s))),
            other => Err(Error::InvalidMapKey(other.kind())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Number(n) => Value::Number(*n),
            MapKey::String(s) => Value::String(Rc::clone(s)),
        }
    }
}

impl Ord for MapKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MapKey::Number(a), MapKey::Number(b)) => a.total_cmp(b),
            (MapKey::String(a), MapKey::String(b)) => a.cmp(b),
            (MapKey::Number(_), MapKey::String(_)) => Ordering::Less,
            (MapKey::String(_), MapKey::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for MapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MapKey {}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Number(n) => f.write_str(&format_number(*n)),
            MapKey::String(s) => write!(f, "{:?}", s),
        }
    }
}

// ============================================================================
// Value
// ============================================================================

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(Rc<str>),
    List(Vector<Value>),
    Map(OrdMap<MapKey, Value>),
    Matrix(Matrix),
    /// Half-open interval; `lo` may be greater than `hi`.
    Range { lo: f64, hi: f64 },
    Function(FunctionRef),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Matrix(_) => ValueKind::Matrix,
            Value::Range { .. } => ValueKind::Range,
            Value::Function(_) => ValueKind::Function,
        }
    }

    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    pub fn bool(b: bool) -> Self {
        Value::Number(if b { 1.0 } else { 0.0 })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content as a matrix: numbers become 1-element vectors and
    /// rectangular numeric lists gain one dimension per nesting level.
    pub fn to_matrix(&self) -> Result<Matrix> {
        match self {
            Value::Matrix(m) => Ok(m.clone()),
            Value::Number(n) => Ok(Matrix::vector(vec![*n])),
            Value::List(items) => matrix_from_items(items.iter().cloned().collect()),
            other => Err(Error::InvalidValue(format!(
                "cannot convert a {} to a Matrix",
                other.kind()
            ))),
        }
    }

    /// Flat numeric content of a Number, Matrix or numeric List.
    pub fn to_numbers(&self) -> Result<Vec<f64>> {
        Ok(self.to_matrix()?.to_vec())
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

/// Build a matrix from vector-literal elements: all numbers, all matrices
/// of one shape, or rectangular numeric lists.
pub fn matrix_from_items(items: Vec<Value>) -> Result<Matrix> {
    if items.iter().all(|v| matches!(v, Value::Number(_))) {
        return Ok(Matrix::vector(
            items.iter().filter_map(Value::as_number).collect(),
        ));
    }
    let rows = items
        .iter()
        .map(|item| match item {
            Value::Matrix(m) => Ok(m.clone()),
            Value::List(_) => item.to_matrix(),
            other => Err(Error::InvalidValue(format!(
                "vector elements must all be Numbers or all be Matrices, found a {}",
                other.kind()
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    Matrix::stack(&rows)
}

/// Validate a numeric index and convert it to a position.
pub fn to_index(index: f64, len: usize, kind: ValueKind) -> Result<usize> {
    if !index.is_finite() || index.fract() != 0.0 {
        return Err(Error::NonIntegralIndex(index));
    }
    match index.to_usize() {
        Some(i) if i < len => Ok(i),
        _ => Err(Error::IndexOutOfRange { index, len, kind }),
    }
}

/// Format a number the way the language prints it: integral values
/// without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("#{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    value.fmt_nested(f)?;
                }
                f.write_str("}")
            }
            Value::Matrix(m) => write!(f, "{}", m),
            Value::Range { lo, hi } => {
                write!(f, "interval({}, {})", format_number(*lo), format_number(*hi))
            }
            Value::Function(FunctionRef::User { name, params, .. }) => {
                write!(f, "<function {}({})>", name, params.join(", "))
            }
            Value::Function(FunctionRef::Builtin { name, .. }) => {
                write!(f, "<builtin {}>", name)
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::Matrix(m)
    }
}

// ============================================================================
// Serialization
// ============================================================================

struct MatrixData<'a>(&'a Matrix);

impl Serialize for MatrixData<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.element_count()))?;
        for n in self.0.iter() {
            seq.serialize_element(&n)?;
        }
        seq.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    match key {
                        MapKey::Number(n) => map.serialize_entry(&format_number(*n), value)?,
                        MapKey::String(s) => map.serialize_entry(&**s, value)?,
                    }
                }
                map.end()
            }
            Value::Matrix(m) => {
                let mut st = serializer.serialize_struct("Matrix", 2)?;
                st.serialize_field("shape", m.shape())?;
                st.serialize_field("data", &MatrixData(m))?;
                st.end()
            }
            Value::Range { lo, hi } => {
                let mut st = serializer.serialize_struct("Range", 2)?;
                st.serialize_field("lo", lo)?;
                st.serialize_field("hi", hi)?;
                st.end()
            }
            Value::Function(func) => {
                let mut st = serializer.serialize_struct("Function", 1)?;
                st.serialize_field("function", func.name())?;
                st.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: Vec<Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::Number(-2.5).to_string(), "-2.5");
        assert_eq!(Value::Number(0.1).to_string(), "0.1");
    }

    #[test]
    fn test_nested_display() {
        let v = list(vec![
            list(vec![1.0.into(), 9.0.into()]),
            list(vec![3.0.into(), "x".into()]),
        ]);
        assert_eq!(v.to_string(), "[[1, 9], [3, \"x\"]]");
        assert_eq!(Value::string("plain").to_string(), "plain");
    }

    #[test]
    fn test_map_keys_order() {
        let mut map = OrdMap::new();
        map.insert(MapKey::String("b".into()), Value::Number(1.0));
        map.insert(MapKey::Number(2.0), Value::Number(2.0));
        map.insert(MapKey::String("a".into()), Value::Number(3.0));
        assert_eq!(Value::Map(map).to_string(), "#{2: 2, \"a\": 3, \"b\": 1}");
    }

    #[test]
    fn test_invalid_map_key() {
        assert_eq!(
            MapKey::from_value(&list(vec![])),
            Err(Error::InvalidMapKey(ValueKind::List))
        );
    }

    #[test]
    fn test_to_index() {
        assert_eq!(to_index(1.0, 3, ValueKind::List), Ok(1));
        assert!(matches!(
            to_index(3.0, 3, ValueKind::List),
            Err(Error::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            to_index(-1.0, 3, ValueKind::List),
            Err(Error::IndexOutOfRange { .. })
        ));
        assert_eq!(
            to_index(0.5, 3, ValueKind::List),
            Err(Error::NonIntegralIndex(0.5))
        );
    }

    #[test]
    fn test_rectangular_list_to_matrix() {
        let v = list(vec![
            list(vec![1.0.into(), 2.0.into()]),
            list(vec![3.0.into(), 4.0.into()]),
        ]);
        let m = v.to_matrix().unwrap();
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_ragged_list_is_rejected() {
        let v = list(vec![list(vec![1.0.into()]), list(vec![1.0.into(), 2.0.into()])]);
        assert!(v.to_matrix().is_err());
    }

    #[test]
    fn test_serialize_matrix() {
        let m = Matrix::new(vec![2, 1], vec![1.0, 2.0]).unwrap();
        let json = serde_json::to_string(&Value::Matrix(m)).unwrap();
        assert_eq!(json, r#"{"shape":[2,1],"data":[1.0,2.0]}"#);
    }
}
