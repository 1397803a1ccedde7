//! Classification metrics of predicted association scores
//!
//! All functions take the predicted scores (probabilities) and the true
//! labels of the same pairs, in the same order.
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{NcdaError, NcdaResult};

/// Evaluation metrics of one set of predictions
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Area under the ROC curve
    pub auroc: f64,
    /// Area under the precision-recall curve (average precision)
    pub auprc: f64,
    /// Share of correct predictions at the threshold
    pub accuracy: f64,
    /// Precision at the threshold
    pub precision: f64,
    /// Recall at the threshold
    pub recall: f64,
    /// F1 score at the threshold
    pub f1: f64,
}

impl Metrics {
    /// Calculates all metrics
    ///
    /// `threshold` is the minimum score of a positive prediction.
    ///
    /// # Errors
    ///
    /// [`NcdaError::DimensionMismatch`] if scores and labels differ in length
    ///
    /// # Examples
    ///
    /// ```
    /// use ncda::stats::metrics::Metrics;
    ///
    /// let scores = [0.9, 0.8, 0.3, 0.1];
    /// let labels = [true, false, true, false];
    /// let metrics = Metrics::evaluate(&scores, &labels, 0.5).unwrap();
    ///
    /// assert!((metrics.auroc - 0.75).abs() < 1e-9);
    /// assert!((metrics.accuracy - 0.5).abs() < 1e-9);
    /// ```
    pub fn evaluate(scores: &[f32], labels: &[bool], threshold: f32) -> NcdaResult<Self> {
        if scores.len() != labels.len() {
            return Err(NcdaError::DimensionMismatch {
                expected: labels.len(),
                found: scores.len(),
            });
        }
        let confusion = Confusion::new(scores, labels, threshold);
        Ok(Self {
            auroc: auroc(scores, labels),
            auprc: auprc(scores, labels),
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
        })
    }

    /// Returns the metrics as `(name, value)` pairs
    pub fn values(&self) -> [(&'static str, f64); 6] {
        [
            ("auroc", self.auroc),
            ("auprc", self.auprc),
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1", self.f1),
        ]
    }
}

/// Counts of true and false predictions at a threshold
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Confusion {
    /// true positives
    pub tp: usize,
    /// false positives
    pub fp: usize,
    /// true negatives
    pub tn: usize,
    /// false negatives
    pub fn_: usize,
}

impl Confusion {
    /// Counts the predictions with `score >= threshold` as positive
    pub fn new(scores: &[f32], labels: &[bool], threshold: f32) -> Self {
        let mut confusion = Self::default();
        for (score, label) in scores.iter().zip(labels) {
            match (*score >= threshold, *label) {
                (true, true) => confusion.tp += 1,
                (true, false) => confusion.fp += 1,
                (false, false) => confusion.tn += 1,
                (false, true) => confusion.fn_ += 1,
            }
        }
        confusion
    }

    /// Share of correct predictions, `0` without predictions
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.tp + self.tn + self.fp + self.fn_)
    }

    /// `tp / (tp + fp)`, `0` without positive predictions
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// `tp / (tp + fn)`, `0` without positive labels
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall
    pub fn f1(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(nom: usize, denom: usize) -> f64 {
    if denom == 0 {
        return 0.0;
    }
    nom as f64 / denom as f64
}

/// Indices of the scores, sorted ascending. NaN sorts first.
fn sorted_indices(scores: &[f32]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..scores.len()).collect();
    idx.sort_by(|a, b| {
        scores[*a]
            .partial_cmp(&scores[*b])
            .unwrap_or_else(|| scores[*a].is_nan().cmp(&scores[*b].is_nan()).reverse())
    });
    idx
}

/// Returns the groups of tied scores as ranges of the sorted indices
fn tie_groups(scores: &[f32], sorted: &[usize]) -> Vec<std::ops::Range<usize>> {
    let mut groups = Vec::new();
    let mut start = 0;
    for pos in 1..=sorted.len() {
        if pos == sorted.len()
            || scores[sorted[pos]].partial_cmp(&scores[sorted[start]]) != Some(Ordering::Equal)
        {
            groups.push(start..pos);
            start = pos;
        }
    }
    groups
}

/// Area under the ROC curve, based on ranks (Mann-Whitney U)
///
/// Tied scores get the average of their ranks. Without positive or
/// without negative labels the AUROC is undefined and `0.5` is returned.
#[allow(clippy::cast_precision_loss)]
pub fn auroc(scores: &[f32], labels: &[bool]) -> f64 {
    let n_pos = labels.iter().filter(|l| **l).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 || scores.len() != labels.len() {
        return 0.5;
    }

    let sorted = sorted_indices(scores);
    let mut rank_sum = 0.0;
    for group in tie_groups(scores, &sorted) {
        // ranks are 1-based
        let avg_rank = (group.start + group.end + 1) as f64 / 2.0;
        let positives = sorted[group].iter().filter(|idx| labels[**idx]).count();
        rank_sum += avg_rank * positives as f64;
    }
    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    (rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg)
}

/// Area under the precision-recall curve as average precision
///
/// `AP = sum over thresholds of (recall_k - recall_k-1) * precision_k`,
/// tied scores form one threshold. Without positive labels `0` is returned.
#[allow(clippy::cast_precision_loss)]
pub fn auprc(scores: &[f32], labels: &[bool]) -> f64 {
    let n_pos = labels.iter().filter(|l| **l).count();
    if n_pos == 0 || scores.len() != labels.len() {
        return 0.0;
    }
    let sorted = sorted_indices(scores);
    let mut groups = tie_groups(scores, &sorted);
    groups.reverse();

    let mut tp = 0usize;
    let mut predicted = 0usize;
    let mut ap = 0.0;
    for group in groups {
        let positives = sorted[group.clone()].iter().filter(|idx| labels[**idx]).count();
        tp += positives;
        predicted += group.len();
        ap += (positives as f64 / n_pos as f64) * (tp as f64 / predicted as f64);
    }
    ap
}
