use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use tracing::debug;

use crate::matrix::Matrix;
use crate::{NcdaError, NcdaResult};

/// A dense, row-major `f32` matrix with row and column labels
///
/// # CSV format
///
/// The first line holds an empty cell followed by the column labels,
/// every other line holds the row label followed by the values:
///
/// ```text
/// ,hsa-mir-21,hsa-mir-155
/// hsa-mir-21,1,0.25
/// hsa-mir-155,0.25,1
/// ```
///
/// # Examples
///
/// ```
/// use ncda::LabeledMatrix;
///
/// let labels = vec!["a".to_string(), "b".to_string()];
/// let mut m = LabeledMatrix::identity(labels);
/// m.set(0, 1, 0.5);
/// m.set(1, 0, 0.5);
///
/// assert_eq!(m.dim(), (2, 2));
/// assert_eq!(m.get(0, 1), Some(0.5));
/// assert_eq!(m.row_index("b"), Some(1));
/// assert!(m.is_symmetric(f32::EPSILON));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    data: Vec<f32>,
}

impl LabeledMatrix {
    /// Constructs a new matrix from row-major data
    ///
    /// # Errors
    ///
    /// [`NcdaError::DimensionMismatch`] if `data` does not hold exactly
    /// `rows * cols` values
    pub fn new(row_labels: Vec<String>, col_labels: Vec<String>, data: Vec<f32>) -> NcdaResult<Self> {
        let expected = row_labels.len() * col_labels.len();
        if data.len() != expected {
            return Err(NcdaError::DimensionMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            row_labels,
            col_labels,
            data,
        })
    }

    /// Constructs a matrix filled with `0.0`
    pub fn zeros(row_labels: Vec<String>, col_labels: Vec<String>) -> Self {
        let data = vec![0.0; row_labels.len() * col_labels.len()];
        Self {
            row_labels,
            col_labels,
            data,
        }
    }

    /// Constructs a square matrix with `1.0` on the diagonal and `0.0` elsewhere
    pub fn identity(labels: Vec<String>) -> Self {
        let mut m = Self::zeros(labels.clone(), labels);
        for i in 0..m.nrows() {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Returns the number of rows
    pub fn nrows(&self) -> usize {
        self.row_labels.len()
    }

    /// Returns the number of columns
    pub fn ncols(&self) -> usize {
        self.col_labels.len()
    }

    /// Returns a Tuple with number of rows and number of columns
    pub fn dim(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    /// Returns `true` if the matrix has no values
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the value at `row`, `col`
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.nrows() || col >= self.ncols() {
            return None;
        }
        self.data.get(row * self.ncols() + col).copied()
    }

    /// Sets the value at `row`, `col`
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        assert!(col < self.ncols(), "column index out of bounds");
        let idx = row * self.ncols() + col;
        self.data[idx] = value;
    }

    /// Returns all values of a single row
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        let start = row.checked_mul(self.ncols())?;
        if row >= self.nrows() {
            return None;
        }
        self.data.get(start..start + self.ncols())
    }

    /// Returns the row-major data
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the row labels
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Returns the column labels
    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Returns the index of the row with the given label
    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.row_labels.iter().position(|l| l == label)
    }

    /// Returns the index of the column with the given label
    pub fn col_index(&self, label: &str) -> Option<usize> {
        self.col_labels.iter().position(|l| l == label)
    }

    /// Returns a lookup table from row label to row index
    pub fn row_lookup(&self) -> HashMap<&str, usize> {
        self.row_labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.as_str(), idx))
            .collect()
    }

    /// Returns a lookup table from column label to column index
    pub fn col_lookup(&self) -> HashMap<&str, usize> {
        self.col_labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.as_str(), idx))
            .collect()
    }

    /// Returns a [`Matrix`] view of the data
    pub fn view(&self) -> Matrix<'_, f32> {
        Matrix::new(self.nrows(), self.ncols(), &self.data)
    }

    /// Returns the sum of all values
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Returns `true` if the matrix is square and `m[i][j]` and `m[j][i]`
    /// differ by at most `tolerance`
    pub fn is_symmetric(&self, tolerance: f32) -> bool {
        if self.nrows() != self.ncols() {
            return false;
        }
        let n = self.nrows();
        (0..n).all(|i| {
            (i + 1..n).all(|j| (self.data[i * n + j] - self.data[j * n + i]).abs() <= tolerance)
        })
    }

    /// Returns `true` if all values are within `[0, 1]`
    pub fn is_normalized(&self) -> bool {
        self.data.iter().all(|v| (0.0..=1.0).contains(v))
    }

    /// Reads a matrix from a CSV file
    ///
    /// # Errors
    ///
    /// - [`NcdaError::CannotOpenFile`] if the file can't be opened
    /// - [`NcdaError::InvalidInput`] if rows have different lengths
    /// - [`NcdaError::ParseFloatError`] if values are not numeric
    pub fn from_csv<P: AsRef<Path>>(path: P) -> NcdaResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|_| NcdaError::CannotOpenFile(path.display().to_string()))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(file);

        let col_labels: Vec<String> = reader
            .headers()?
            .iter()
            .skip(1)
            .map(str::to_string)
            .collect();

        let mut row_labels = Vec::new();
        let mut data = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut fields = record.iter();
            let Some(label) = fields.next() else {
                return Err(NcdaError::InvalidInput(format!(
                    "empty row in {}",
                    path.display()
                )));
            };
            row_labels.push(label.to_string());
            for value in fields {
                data.push(value.trim().parse::<f32>()?);
            }
        }
        debug!(
            "Read {}x{} matrix from {}",
            row_labels.len(),
            col_labels.len(),
            path.display()
        );
        Self::new(row_labels, col_labels, data)
    }

    /// Writes the matrix as CSV
    ///
    /// Values use the shortest representation that round-trips, so
    /// identical matrices always produce identical files.
    ///
    /// # Errors
    ///
    /// [`NcdaError::Csv`] or [`NcdaError::Io`] if the file can't be written
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> NcdaResult<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;

        let mut header = Vec::with_capacity(self.ncols() + 1);
        header.push(String::new());
        header.extend(self.col_labels.iter().cloned());
        writer.write_record(&header)?;

        for (label, row) in self.row_labels.iter().zip(self.view().rows()) {
            let mut record = Vec::with_capacity(self.ncols() + 1);
            record.push(label.clone());
            record.extend(row.iter().map(f32::to_string));
            writer.write_record(&record)?;
        }
        // a matrix without columns has no rows in the view
        if self.ncols() == 0 {
            for label in &self.row_labels {
                writer.write_record([label])?;
            }
        }
        writer.flush()?;
        debug!("Wrote {}x{} matrix to {}", self.nrows(), self.ncols(), path.as_ref().display());
        Ok(())
    }
}
