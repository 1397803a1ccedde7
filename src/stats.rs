//! Evaluation of the association predictions
//!
//! [`metrics`] scores the predictions of a single fold, the
//! [`CrossValidationReport`] summarizes all folds of a cross validation.
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::NcdaResult;

pub mod metrics;
pub use metrics::Metrics;

/// Default file name of the cross validation report
pub const REPORT_FILENAME: &str = "cv_report.json";

/// Mean and sample standard deviation of a series of values
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    mean: f64,
    std: f64,
}

impl Summary {
    /// Summarizes the values
    ///
    /// An empty series has mean and standard deviation `0`, a single
    /// value has a standard deviation of `0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ncda::stats::Summary;
    ///
    /// let summary = Summary::new(&[1.0, 2.0, 3.0]);
    /// assert!((summary.mean() - 2.0).abs() < 1e-12);
    /// assert!((summary.std() - 1.0).abs() < 1e-12);
    /// ```
    pub fn new(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mean = values.mean();
        let std = values.std_dev();
        Self {
            mean,
            std: if std.is_nan() { 0.0 } else { std },
        }
    }

    /// The arithmetic mean
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// The sample standard deviation
    pub fn std(&self) -> f64 {
        self.std
    }
}

/// Result of training and evaluating a single fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldReport {
    /// Position of the fold
    pub fold: usize,
    /// Number of training pairs, positives and negatives
    pub n_train: usize,
    /// Number of validation pairs, positives and negatives
    pub n_validation: usize,
    /// Mean training loss of the last epoch
    pub final_loss: f64,
    /// Validation metrics
    pub metrics: Metrics,
}

/// Metrics of all folds of a cross validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    folds: Vec<FoldReport>,
    mean: Metrics,
    std: Metrics,
}

impl CrossValidationReport {
    /// Builds the report and summarizes every metric over the folds
    pub fn new(folds: Vec<FoldReport>) -> Self {
        let summarize = |get: fn(&Metrics) -> f64| {
            let values: Vec<f64> = folds.iter().map(|f| get(&f.metrics)).collect();
            Summary::new(&values)
        };
        let auroc = summarize(|m| m.auroc);
        let auprc = summarize(|m| m.auprc);
        let accuracy = summarize(|m| m.accuracy);
        let precision = summarize(|m| m.precision);
        let recall = summarize(|m| m.recall);
        let f1 = summarize(|m| m.f1);

        let mean = Metrics {
            auroc: auroc.mean(),
            auprc: auprc.mean(),
            accuracy: accuracy.mean(),
            precision: precision.mean(),
            recall: recall.mean(),
            f1: f1.mean(),
        };
        let std = Metrics {
            auroc: auroc.std(),
            auprc: auprc.std(),
            accuracy: accuracy.std(),
            precision: precision.std(),
            recall: recall.std(),
            f1: f1.std(),
        };
        Self { folds, mean, std }
    }

    /// The reports of every fold
    pub fn folds(&self) -> &[FoldReport] {
        &self.folds
    }

    /// Mean of every metric over all folds
    pub fn mean(&self) -> &Metrics {
        &self.mean
    }

    /// Sample standard deviation of every metric over all folds
    pub fn std(&self) -> &Metrics {
        &self.std
    }

    /// Writes the report as JSON
    ///
    /// # Errors
    ///
    /// [`crate::NcdaError::Io`] or [`crate::NcdaError::Json`] if the file
    /// can't be written
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> NcdaResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
