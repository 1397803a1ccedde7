//! Pairwise sequence similarity of ncRNAs of the same type
//!
//! Sequences are aligned with [`bio`]'s pairwise aligner. The raw alignment
//! score is normalized by the self-alignment scores of both sequences:
//!
//! ```text
//! sim(a, b) = score(a, b) / sqrt(score(a, a) * score(b, b))
//! ```
//!
//! clamped to `[0, 1]`. Sequences with a self score of `0` (e.g. empty
//! sequences) have a similarity of `0` to every other sequence.
use bio::alignment::pairwise::{Aligner, MatchParams};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::utils::upper_triangle;
use crate::{LabeledMatrix, NcdaError, RnaRecord, SequenceSet};

/// Scores used for pairwise alignments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentScoring {
    /// Score of two identical nucleotides
    pub match_score: i32,
    /// Score of two different nucleotides
    pub mismatch_score: i32,
    /// Penalty to open a gap
    pub gap_open: i32,
    /// Penalty for each position of a gap
    pub gap_extend: i32,
}

impl Default for AlignmentScoring {
    fn default() -> Self {
        Self {
            match_score: 1,
            mismatch_score: -1,
            gap_open: -5,
            gap_extend: -1,
        }
    }
}

impl AlignmentScoring {
    fn aligner(&self) -> Aligner<MatchParams> {
        Aligner::new(
            self.gap_open,
            self.gap_extend,
            MatchParams::new(self.match_score, self.mismatch_score),
        )
    }
}

/// Trait for similarity calculation between two ncRNA sequences
pub trait SequenceSimilarity {
    /// Returns the raw alignment score of `a` and `b`
    fn score(&self, a: &[u8], b: &[u8]) -> i32;

    /// Returns the normalized similarity of two records, within `[0, 1]`
    fn calculate(&self, a: &RnaRecord, b: &RnaRecord) -> f32 {
        normalize(
            self.score(a.as_bytes(), b.as_bytes()),
            self.score(a.as_bytes(), a.as_bytes()),
            self.score(b.as_bytes(), b.as_bytes()),
        )
    }
}

/// Normalizes a raw alignment score by the self scores of both sequences
pub fn normalize(score: i32, self_a: i32, self_b: i32) -> f32 {
    if self_a <= 0 || self_b <= 0 {
        return 0.0;
    }
    let denominator = (f64::from(self_a) * f64::from(self_b)).sqrt();
    #[allow(clippy::cast_possible_truncation)]
    let sim = (f64::from(score) / denominator) as f32;
    sim.clamp(0.0, 1.0)
}

/// Needleman-Wunsch global alignment
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalAlignment {
    scoring: AlignmentScoring,
}

impl GlobalAlignment {
    /// Constructs a new global aligner with the given scores
    pub fn new(scoring: AlignmentScoring) -> Self {
        Self { scoring }
    }
}

impl SequenceSimilarity for GlobalAlignment {
    fn score(&self, a: &[u8], b: &[u8]) -> i32 {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => 0,
            (true, false) | (false, true) => {
                let gap = i32::try_from(a.len().max(b.len())).unwrap_or(i32::MAX);
                self.scoring
                    .gap_open
                    .saturating_add(self.scoring.gap_extend.saturating_mul(gap))
            }
            (false, false) => self.scoring.aligner().global(a, b).score,
        }
    }
}

/// Smith-Waterman local alignment
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalAlignment {
    scoring: AlignmentScoring,
}

impl LocalAlignment {
    /// Constructs a new local aligner with the given scores
    pub fn new(scoring: AlignmentScoring) -> Self {
        Self { scoring }
    }
}

impl SequenceSimilarity for LocalAlignment {
    fn score(&self, a: &[u8], b: &[u8]) -> i32 {
        if a.is_empty() || b.is_empty() {
            return 0;
        }
        self.scoring.aligner().local(a, b).score
    }
}

/// The built-in alignment methods
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMethod {
    /// [`GlobalAlignment`]
    #[default]
    Global,
    /// [`LocalAlignment`]
    Local,
}

impl TryFrom<&str> for AlignmentMethod {
    type Error = NcdaError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "global" | "nw" => Ok(AlignmentMethod::Global),
            "local" | "sw" => Ok(AlignmentMethod::Local),
            _ => Err(NcdaError::InvalidInput(format!(
                "unknown alignment method: {value}"
            ))),
        }
    }
}

impl AlignmentMethod {
    /// Returns the [`SequenceSimilarity`] implementation with the given scores
    pub fn with_scoring(self, scoring: AlignmentScoring) -> Box<dyn SequenceSimilarity + Sync> {
        match self {
            AlignmentMethod::Global => Box::new(GlobalAlignment::new(scoring)),
            AlignmentMethod::Local => Box::new(LocalAlignment::new(scoring)),
        }
    }
}

impl<T: SequenceSimilarity + ?Sized> SequenceSimilarity for Box<T> {
    fn score(&self, a: &[u8], b: &[u8]) -> i32 {
        (**self).score(a, b)
    }
}

/// Calculates the pairwise similarity of all sequences of the set
///
/// The result is a square, symmetric matrix in the order of the set with
/// `1.0` on the diagonal. Pairs are aligned in parallel, the output does
/// not depend on the number of threads.
///
/// # Examples
///
/// ```
/// use ncda::alignment::{similarity_matrix, GlobalAlignment};
/// use ncda::{RnaKind, RnaRecord, SequenceSet};
///
/// let mut set = SequenceSet::new(RnaKind::Mirna);
/// set.push(RnaRecord::new("a", "ACGUACGU")).unwrap();
/// set.push(RnaRecord::new("b", "ACGUACGA")).unwrap();
///
/// let m = similarity_matrix(&set, &GlobalAlignment::default());
/// assert_eq!(m.dim(), (2, 2));
/// assert!((m.get(0, 1).unwrap() - 0.75).abs() < 1e-6);
/// ```
pub fn similarity_matrix<S: SequenceSimilarity + Sync + ?Sized>(
    set: &SequenceSet,
    method: &S,
) -> LabeledMatrix {
    let records = set.records();
    info!(
        "Aligning {} {} sequences pairwise",
        records.len(),
        set.kind()
    );

    let self_scores: Vec<i32> = records
        .par_iter()
        .map(|r| method.score(r.as_bytes(), r.as_bytes()))
        .collect();

    let pairs = upper_triangle(records.len());
    let scores: Vec<f32> = pairs
        .par_iter()
        .map(|(i, j)| {
            let raw = method.score(records[*i].as_bytes(), records[*j].as_bytes());
            normalize(raw, self_scores[*i], self_scores[*j])
        })
        .collect();
    debug!("Aligned {} pairs", scores.len());

    let mut matrix = LabeledMatrix::identity(set.ids());
    for ((i, j), score) in pairs.into_iter().zip(scores) {
        matrix.set(i, j, score);
        matrix.set(j, i, score);
    }
    matrix
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::RnaKind;

    fn set() -> SequenceSet {
        let mut set = SequenceSet::new(RnaKind::Mirna);
        for (id, seq) in [
            ("hsa-mir-21", "UAGCUUAUCAGACUGAUGUUGA"),
            ("hsa-mir-155", "UUAAUGCUAAUCGUGAUAGGGGU"),
            ("hsa-mir-21-3p", "CAACACCAGUCGAUGGGCUGU"),
            ("empty", ""),
        ] {
            set.push(RnaRecord::new(id, seq)).unwrap();
        }
        set
    }

    #[test]
    fn normalization() {
        assert!((normalize(4, 4, 4) - 1.0).abs() < f32::EPSILON);
        assert!((normalize(2, 4, 1) - 1.0).abs() < f32::EPSILON);
        assert!(normalize(-3, 4, 4).abs() < f32::EPSILON);
        assert!(normalize(3, 0, 4).abs() < f32::EPSILON);
    }

    #[test]
    fn identical_sequences() {
        let a = RnaRecord::new("a", "ACGUACGU");
        let b = RnaRecord::new("b", "acguacgu");
        assert!((GlobalAlignment::default().calculate(&a, &b) - 1.0).abs() < f32::EPSILON);
        assert!((LocalAlignment::default().calculate(&a, &b) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn local_finds_substring() {
        let a = RnaRecord::new("a", "ACGUACGU");
        let b = RnaRecord::new("b", "GGGGGGGGACGUACGUGGGGGGGG");
        let local = LocalAlignment::default().calculate(&a, &b);
        let global = GlobalAlignment::default().calculate(&a, &b);
        // 8 / sqrt(8 * 24)
        assert!((local - 8.0 / 192f32.sqrt()).abs() < 1e-6);
        assert!(global < local);
    }

    #[test]
    fn matrix_properties() {
        for method in [AlignmentMethod::Global, AlignmentMethod::Local] {
            let m = similarity_matrix(&set(), &method.with_scoring(AlignmentScoring::default()));
            assert_eq!(m.dim(), (4, 4));
            assert!(m.is_symmetric(0.0));
            assert!(m.is_normalized());
            for i in 0..4 {
                assert_eq!(m.get(i, i), Some(1.0));
            }
            assert_eq!(m.row(3).unwrap()[..3], [0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn deterministic() {
        let a = similarity_matrix(&set(), &GlobalAlignment::default());
        let b = similarity_matrix(&set(), &GlobalAlignment::default());
        assert_eq!(a, b);
    }

    #[test]
    fn method_from_str() {
        assert_eq!(AlignmentMethod::try_from("Local").unwrap(), AlignmentMethod::Local);
        assert!(AlignmentMethod::try_from("semiglobal").is_err());
    }
}
