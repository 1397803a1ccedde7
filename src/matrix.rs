//! Matrices for similarity scores and associations
//!
//! [`LabeledMatrix`] is the owned, labeled matrix that every pipeline stage
//! reads and writes, e.g. the ncRNA similarity, the disease similarity
//! or the association adjacency matrix.
//!
//! [`Matrix`] is a lightweight row-major view used by the
//! [`SimilarityCombiner`](`crate::similarity::SimilarityCombiner`) trait
//! for quick row and column-based data access.
//!
//! | Index |   0 |   1 |   2 |   3 |
//! |:----- | ---:| ---:| ---:| ---:|
//! | **0** |  11 |  12 |  13 |  14 |
//! | **1** |  21 |  22 |  23 |  24 |
//! | **2** |  31 |  32 |  33 |  34 |
//!
//! ```
//! use ncda::matrix::Matrix;
//! let data = vec![11, 12, 13, 14, 21, 22, 23, 24, 31, 32, 33, 34];
//! let m = Matrix::new(3, 4, &data);
//!
//! let rows: Vec<i32> = m.rows().map(|row| row.iter().sum()).collect();
//! assert_eq!(rows, vec![50, 90, 130]);
//!
//! let cols: Vec<i32> = m.cols().map(|col| col.sum()).collect();
//! assert_eq!(cols, vec![63, 66, 69, 72]);
//! ```
use std::fmt::Debug;

mod labeled;
pub use labeled::LabeledMatrix;

/// A row-major matrix view for quick row and column-based data access
///
/// There are no logic checks to ensure that the rows and column
/// match the data length, so callers must ensure this
pub struct Matrix<'a, T> {
    rows: usize,
    cols: usize,
    data: &'a [T],
}

impl<'a, T> Matrix<'a, T> {
    /// Crates a new Matrix from `data` with `rows` number of rows, `cols` number of columns
    pub fn new(rows: usize, cols: usize, data: &'a [T]) -> Self {
        Self { rows, cols, data }
    }

    /// Returns the total length of the data
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the `Matrix` does not contain any data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a Tuple with number of rows and number of columns
    pub fn dim(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Iterates the rows of the matrix, each row as a slice
    pub fn rows(&self) -> RowIterator<'a, T> {
        RowIterator {
            data: self.data,
            cols: self.cols,
            idx: 0,
            rows: self.rows,
        }
    }

    /// Iterates the columns of the matrix
    pub fn cols(&self) -> ColumnIterator<'a, T> {
        ColumnIterator {
            data: self.data,
            cols: self.cols,
            idx: 0,
        }
    }
}

impl<T: std::fmt::Display> Debug for Matrix<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            let v: Vec<String> = row.iter().map(|v| format!("{v}")).collect();
            writeln!(f, "[{}]", v.join(", "))?;
        }
        Ok(())
    }
}

/// Iterates the rows of a `Matrix`
///
/// This struct is yielded by `Matrix::rows`
pub struct RowIterator<'a, T> {
    data: &'a [T],
    cols: usize,
    rows: usize,
    idx: usize,
}

impl<'a, T> Iterator for RowIterator<'a, T> {
    type Item = &'a [T];
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.rows || self.cols == 0 {
            return None;
        }
        let start = self.idx * self.cols;
        self.idx += 1;
        self.data.get(start..start + self.cols)
    }
}

/// An iterator of the values of a single column of a `Matrix`
///
/// This struct is yielded by `ColumnIterator`
pub struct Column<'a, T> {
    iter: std::iter::StepBy<std::iter::Skip<std::slice::Iter<'a, T>>>,
}

impl<'a, T> Iterator for Column<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// Iterates the columns of a `Matrix`
///
/// This struct is yielded by `Matrix::cols`
pub struct ColumnIterator<'a, T> {
    data: &'a [T],
    cols: usize,
    idx: usize,
}

impl<'a, T> Iterator for ColumnIterator<'a, T> {
    type Item = Column<'a, T>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.cols {
            return None;
        }
        let iter = self.data.iter().skip(self.idx).step_by(self.cols);
        self.idx += 1;
        Some(Column { iter })
    }
}
