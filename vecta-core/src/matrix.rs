// vecta-core - Strided numeric arrays
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! N-dimensional numeric arrays.
//!
//! A [`Matrix`] is a shape plus a strided view over shared backing storage,
//! so taking a row or a slice along the first axis is O(1). Anything that
//! transforms values allocates fresh storage; writes copy first.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};

/// Strided view over an `Rc<[f64]>` buffer.
#[derive(Debug, Clone)]
pub struct Matrix {
    data: Rc<[f64]>,
    offset: usize,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

impl Matrix {
    /// Build a matrix from row-major data. The shape must be non-empty and
    /// its product must equal `data.len()`.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        if shape.is_empty() {
            return Err(Error::InvalidValue("a matrix needs at least one dimension".into()));
        }
        let count: usize = shape.iter().product();
        if count != data.len() {
            return Err(Error::InvalidValue(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                count,
                data.len()
            )));
        }
        let strides = row_major_strides(&shape);
        Ok(Matrix {
            data: data.into(),
            offset: 0,
            shape,
            strides,
        })
    }

    /// One-dimensional matrix.
    pub fn vector(data: Vec<f64>) -> Self {
        let shape = vec![data.len()];
        Matrix {
            data: data.into(),
            offset: 0,
            shape,
            strides: vec![1],
        }
    }

    /// Matrix of the given shape filled with `value`.
    pub fn filled(shape: Vec<usize>, value: f64) -> Result<Self> {
        let count = shape.iter().product();
        Matrix::new(shape, vec![value; count])
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Length of the first axis.
    pub fn len(&self) -> usize {
        self.shape[0]
    }

    pub fn is_empty(&self) -> bool {
        self.shape.iter().any(|d| *d == 0)
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Elements in row-major order.
    pub fn iter(&self) -> MatrixIter<'_> {
        MatrixIter {
            matrix: self,
            index: vec![0; self.shape.len()],
            remaining: self.element_count(),
        }
    }

    /// Copy the elements into a fresh row-major vector.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// Whether two matrices share backing storage.
    pub fn shares_storage(&self, other: &Matrix) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    fn check_axis_index(&self, index: usize) -> Result<()> {
        if index >= self.shape[0] {
            return Err(Error::IndexOutOfRange {
                index: index as f64,
                len: self.shape[0],
                kind: crate::ValueKind::Matrix,
            });
        }
        Ok(())
    }

    /// Scalar at `index` of a one-dimensional matrix.
    pub fn scalar(&self, index: usize) -> Result<f64> {
        self.check_axis_index(index)?;
        Ok(self.data[self.offset + index * self.strides[0]])
    }

    /// O(1) view of row `index` along the first axis. Only valid for
    /// matrices with two or more dimensions.
    pub fn row(&self, index: usize) -> Result<Matrix> {
        self.check_axis_index(index)?;
        if self.ndim() < 2 {
            return Err(Error::InvalidValue(
                "cannot take a row of a one-dimensional matrix".into(),
            ));
        }
        Ok(Matrix {
            data: Rc::clone(&self.data),
            offset: self.offset + index * self.strides[0],
            shape: self.shape[1..].to_vec(),
            strides: self.strides[1..].to_vec(),
        })
    }

    /// O(1) view of `lo..hi` along the first axis.
    pub fn slice(&self, lo: usize, hi: usize) -> Result<Matrix> {
        if lo > hi || hi > self.shape[0] {
            return Err(Error::InvalidValue(format!(
                "slice {}..{} is out of range for length {}",
                lo, hi, self.shape[0]
            )));
        }
        let mut shape = self.shape.clone();
        shape[0] = hi - lo;
        Ok(Matrix {
            data: Rc::clone(&self.data),
            offset: self.offset + lo * self.strides[0],
            shape,
            strides: self.strides.clone(),
        })
    }

    /// Apply `f` to every element, producing fresh storage.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        let data: Vec<f64> = self.iter().map(f).collect();
        Matrix {
            data: data.into(),
            offset: 0,
            shape: self.shape.clone(),
            strides: row_major_strides(&self.shape),
        }
    }

    /// Combine two equally shaped matrices elementwise.
    pub fn zip_with(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Result<Matrix> {
        if self.shape != other.shape {
            return Err(Error::ShapeMismatch {
                lhs: self.shape.clone(),
                rhs: other.shape.clone(),
            });
        }
        let data: Vec<f64> = self.iter().zip(other.iter()).map(|(a, b)| f(a, b)).collect();
        Matrix::new(self.shape.clone(), data)
    }

    /// Copy of this matrix with row (or element) `index` replaced.
    ///
    /// For a one-dimensional matrix `value` must be a scalar; otherwise it
    /// must be a matrix with the shape of one row.
    pub fn with_row(&self, index: usize, value: RowValue<'_>) -> Result<Matrix> {
        self.check_axis_index(index)?;
        let mut data = self.to_vec();
        let row_len: usize = self.shape[1..].iter().product();
        let start = index * row_len;
        match value {
            RowValue::Scalar(n) if self.ndim() == 1 => data[start] = n,
            RowValue::Row(row) if row.shape() == &self.shape[1..] => {
                for (slot, n) in data[start..start + row_len].iter_mut().zip(row.iter()) {
                    *slot = n;
                }
            }
            RowValue::Scalar(_) => {
                return Err(Error::InvalidValue(format!(
                    "cannot store a Number as a row of shape {:?}",
                    &self.shape[1..]
                )));
            }
            RowValue::Row(row) => {
                return Err(Error::ShapeMismatch {
                    lhs: self.shape[1..].to_vec(),
                    rhs: row.shape().to_vec(),
                });
            }
        }
        Matrix::new(self.shape.clone(), data)
    }

    /// Stack equally shaped matrices along a new first axis.
    pub fn stack(rows: &[Matrix]) -> Result<Matrix> {
        let Some(first) = rows.first() else {
            return Ok(Matrix::vector(Vec::new()));
        };
        let mut data = Vec::with_capacity(rows.len() * first.element_count());
        for row in rows {
            if row.shape != first.shape {
                return Err(Error::ShapeMismatch {
                    lhs: first.shape.clone(),
                    rhs: row.shape.clone(),
                });
            }
            data.extend(row.iter());
        }
        let mut shape = vec![rows.len()];
        shape.extend_from_slice(&first.shape);
        Matrix::new(shape, data)
    }

    pub fn transpose(&self) -> Result<Matrix> {
        match self.shape.as_slice() {
            [n] => Matrix::new(vec![*n, 1], self.to_vec()),
            [rows, cols] => {
                let (rows, cols) = (*rows, *cols);
                let mut data = Vec::with_capacity(rows * cols);
                for c in 0..cols {
                    for r in 0..rows {
                        data.push(self.data[self.offset + r * self.strides[0] + c * self.strides[1]]);
                    }
                }
                Matrix::new(vec![cols, rows], data)
            }
            shape => Err(Error::InvalidValue(format!(
                "cannot transpose a matrix of shape {:?}",
                shape
            ))),
        }
    }

    /// Matrix product of 2-D by 2-D, or 2-D by 1-D.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        let (rows, inner) = match self.shape.as_slice() {
            [r, c] => (*r, *c),
            _ => {
                return Err(Error::InvalidValue(
                    "matmul needs a two-dimensional left operand".into(),
                ));
            }
        };
        let (other_inner, cols, vector) = match other.shape.as_slice() {
            [n] => (*n, 1, true),
            [r, c] => (*r, *c, false),
            _ => {
                return Err(Error::InvalidValue(
                    "matmul needs a one- or two-dimensional right operand".into(),
                ));
            }
        };
        if inner != other_inner {
            return Err(Error::ShapeMismatch {
                lhs: self.shape.clone(),
                rhs: other.shape.clone(),
            });
        }

        let a = self.to_vec();
        let b = other.to_vec();
        let mut data = vec![0.0; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                data[r * cols + c] = (0..inner).map(|k| a[r * inner + k] * b[k * cols + c]).sum();
            }
        }
        if vector {
            Matrix::new(vec![rows], data)
        } else {
            Matrix::new(vec![rows, cols], data)
        }
    }
}

/// Replacement for one row of a matrix.
#[derive(Debug, Clone, Copy)]
pub enum RowValue<'a> {
    Scalar(f64),
    Row(&'a Matrix),
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.iter().eq(other.iter())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_axis(
            m: &Matrix,
            f: &mut fmt::Formatter<'_>,
            axis: usize,
            offset: usize,
        ) -> fmt::Result {
            f.write_str("[")?;
            for i in 0..m.shape[axis] {
                if i > 0 {
                    f.write_str(", ")?;
                }
                let at = offset + i * m.strides[axis];
                if axis + 1 == m.shape.len() {
                    write!(f, "{}", crate::value::format_number(m.data[at]))?;
                } else {
                    write_axis(m, f, axis + 1, at)?;
                }
            }
            f.write_str("]")
        }
        f.write_str("#")?;
        write_axis(self, f, 0, self.offset)
    }
}

/// Row-major element iterator over a strided view.
pub struct MatrixIter<'a> {
    matrix: &'a Matrix,
    index: Vec<usize>,
    remaining: usize,
}

impl Iterator for MatrixIter<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        let m = self.matrix;
        let at = m.offset
            + self
                .index
                .iter()
                .zip(&m.strides)
                .map(|(i, s)| i * s)
                .sum::<usize>();
        let value = m.data[at];

        self.remaining -= 1;
        for axis in (0..self.index.len()).rev() {
            self.index[axis] += 1;
            if self.index[axis] < m.shape[axis] {
                break;
            }
            self.index[axis] = 0;
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
