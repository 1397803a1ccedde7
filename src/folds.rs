//! K-fold cross validation splits with sampled negative pairs
//!
//! Known associations are shuffled and dealt into `k` validation folds.
//! Every fold is complemented by negative ncRNA - disease pairs, sampled
//! among the pairs without a known association.
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{AdjacencyMatrix, NcdaError, NcdaResult};

/// Default file name of the folds
pub const FOLDS_FILENAME: &str = "folds.json";

/// Settings of the k-fold split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KFold {
    /// Number of folds
    pub k: usize,
    /// Random seed of shuffling and negative sampling
    pub seed: u64,
    /// Number of negative pairs per positive pair
    pub negative_ratio: usize,
}

impl Default for KFold {
    fn default() -> Self {
        Self {
            k: 5,
            seed: 42,
            negative_ratio: 1,
        }
    }
}

/// A single cross validation fold
///
/// Positive records are indices into the
/// [`AssociationSet`](crate::AssociationSet), negatives are
/// `(row, col)` positions of the [`AdjacencyMatrix`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    /// Position of the fold, starting at 0
    pub index: usize,
    /// Records used for training
    pub train: Vec<usize>,
    /// Records used for validation
    pub validation: Vec<usize>,
    /// Negative pairs used for training
    pub train_negatives: Vec<(usize, usize)>,
    /// Negative pairs used for validation
    pub validation_negatives: Vec<(usize, usize)>,
}

/// All folds of a k-fold split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folds {
    k: usize,
    seed: u64,
    negative_ratio: usize,
    n_records: usize,
    folds: Vec<Fold>,
}

impl KFold {
    /// Constructs a new split configuration
    pub fn new(k: usize, seed: u64, negative_ratio: usize) -> Self {
        Self {
            k,
            seed,
            negative_ratio,
        }
    }

    /// Splits `n_records` positive records into folds and samples
    /// negatives among the unknown pairs of `adjacency`
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if `k < 2` or `k > n_records`
    ///
    /// # Examples
    ///
    /// ```
    /// use ncda::folds::KFold;
    /// use ncda::{AdjacencyMatrix, Association, AssociationSet};
    ///
    /// let mut associations = AssociationSet::default();
    /// for (rna, disease) in [("a", "x"), ("b", "y"), ("c", "x"), ("a", "z")] {
    ///     associations.insert(Association::new(rna, disease));
    /// }
    /// let adjacency = AdjacencyMatrix::from_records(&associations);
    ///
    /// let folds = KFold::new(2, 1, 1).split(associations.len(), &adjacency).unwrap();
    /// assert_eq!(folds.len(), 2);
    /// assert_eq!(folds.get(0).unwrap().validation.len(), 2);
    /// ```
    pub fn split(&self, n_records: usize, adjacency: &AdjacencyMatrix) -> NcdaResult<Folds> {
        if self.k < 2 || self.k > n_records {
            return Err(NcdaError::InvalidInput(format!(
                "number of folds must be between 2 and {n_records}, got {}",
                self.k
            )));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut indices: Vec<usize> = (0..n_records).collect();
        indices.shuffle(&mut rng);

        let mut validation_sets: Vec<Vec<usize>> = vec![Vec::new(); self.k];
        for (pos, idx) in indices.into_iter().enumerate() {
            validation_sets[pos % self.k].push(idx);
        }

        let unknown = adjacency.unknown();
        let mut folds = Vec::with_capacity(self.k);
        for (fold_idx, mut validation) in validation_sets.into_iter().enumerate() {
            validation.sort_unstable();
            let train: Vec<usize> = (0..n_records)
                .filter(|idx| validation.binary_search(idx).is_err())
                .collect();

            let n_train = self.negative_ratio * train.len();
            let n_validation = self.negative_ratio * validation.len();
            let (train_negatives, validation_negatives) =
                sample_negatives(&unknown, n_train, n_validation, &mut rng);
            debug!(
                "Fold {fold_idx}: {} + {} training, {} + {} validation pairs",
                train.len(),
                train_negatives.len(),
                validation.len(),
                validation_negatives.len()
            );

            folds.push(Fold {
                index: fold_idx,
                train,
                validation,
                train_negatives,
                validation_negatives,
            });
        }
        info!("Split {n_records} associations into {} folds", self.k);

        Ok(Folds {
            k: self.k,
            seed: self.seed,
            negative_ratio: self.negative_ratio,
            n_records,
            folds,
        })
    }
}

/// Samples disjoint training and validation negatives
///
/// If fewer unknown pairs are available than requested, all are used and
/// distributed in proportion to the requested sizes.
fn sample_negatives(
    unknown: &[(usize, usize)],
    n_train: usize,
    n_validation: usize,
    rng: &mut ChaCha8Rng,
) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let requested = n_train + n_validation;
    let total = requested.min(unknown.len());
    if total == 0 {
        return (Vec::new(), Vec::new());
    }
    let n_validation = if total < requested {
        total * n_validation / requested
    } else {
        n_validation
    };

    let sampled: Vec<(usize, usize)> = index::sample(rng, unknown.len(), total)
        .into_iter()
        .map(|idx| unknown[idx])
        .collect();
    let (validation, train) = sampled.split_at(n_validation);
    (train.to_vec(), validation.to_vec())
}

impl Folds {
    /// Number of folds
    pub fn len(&self) -> usize {
        self.folds.len()
    }

    /// Returns `true` if there are no folds
    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    /// Returns a single fold
    pub fn get(&self, index: usize) -> Option<&Fold> {
        self.folds.get(index)
    }

    /// Iterates all folds
    pub fn iter(&self) -> std::slice::Iter<'_, Fold> {
        self.folds.iter()
    }

    /// Number of positive records that were split
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// The seed used for the split
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Checks the consistency of the split
    ///
    /// - there are exactly `k` folds, in order
    /// - the validation sets are disjoint and cover every record once
    /// - every training set holds exactly the records outside its validation set
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if any of the checks fails
    pub fn validate(&self) -> NcdaResult<()> {
        if self.folds.len() != self.k {
            return Err(NcdaError::InvalidInput(format!(
                "expected {} folds, found {}",
                self.k,
                self.folds.len()
            )));
        }
        for (pos, fold) in self.folds.iter().enumerate() {
            if fold.index != pos {
                return Err(NcdaError::InvalidInput(format!(
                    "fold at position {pos} has index {}",
                    fold.index
                )));
            }
            let mut in_validation = vec![false; self.n_records];
            for idx in &fold.validation {
                if let Some(flag) = in_validation.get_mut(*idx) {
                    *flag = true;
                }
            }
            let mut train = fold.train.clone();
            train.sort_unstable();
            let complement: Vec<usize> = (0..self.n_records)
                .filter(|idx| !in_validation[*idx])
                .collect();
            if train != complement {
                return Err(NcdaError::InvalidInput(format!(
                    "training records of fold {pos} are not the complement of its validation records"
                )));
            }
        }

        let mut seen = vec![false; self.n_records];
        for fold in &self.folds {
            for idx in &fold.validation {
                match seen.get_mut(*idx) {
                    Some(used) if !*used => *used = true,
                    _ => {
                        return Err(NcdaError::InvalidInput(format!(
                            "record {idx} is used in more than one validation set"
                        )))
                    }
                }
            }
        }
        if let Some(missing) = seen.iter().position(|used| !used) {
            return Err(NcdaError::InvalidInput(format!(
                "record {missing} is not part of any validation set"
            )));
        }
        Ok(())
    }

    /// Writes the folds as JSON
    ///
    /// # Errors
    ///
    /// [`NcdaError::Io`] or [`NcdaError::Json`] if the file can't be written
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> NcdaResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads folds from JSON and validates them
    ///
    /// # Errors
    ///
    /// - [`NcdaError::CannotOpenFile`] if the file can't be opened
    /// - [`NcdaError::Json`] if the content is not valid
    /// - [`NcdaError::InvalidInput`] if the folds are inconsistent
    pub fn from_json<P: AsRef<Path>>(path: P) -> NcdaResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|_| NcdaError::CannotOpenFile(path.display().to_string()))?;
        let folds: Self = serde_json::from_reader(BufReader::new(file))?;
        folds.validate()?;
        Ok(folds)
    }
}

impl<'a> IntoIterator for &'a Folds {
    type Item = &'a Fold;
    type IntoIter = std::slice::Iter<'a, Fold>;
    fn into_iter(self) -> Self::IntoIter {
        self.folds.iter()
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;
    use crate::{Association, AssociationSet};

    fn adjacency() -> (AssociationSet, AdjacencyMatrix) {
        let mut set = AssociationSet::default();
        for rna in 0..4 {
            for disease in 0..3 {
                if (rna + disease) % 2 == 0 {
                    set.insert(Association::new(&format!("r{rna}"), &format!("d{disease}")));
                }
            }
        }
        let adj = AdjacencyMatrix::from_records(&set);
        (set, adj)
    }

    #[test]
    fn validation_sets_cover_records() {
        let (set, adj) = adjacency();
        assert_eq!(set.len(), 6);
        let folds = KFold::new(4, 3, 1).split(set.len(), &adj).unwrap();
        folds.validate().unwrap();

        let sizes: Vec<usize> = folds.iter().map(|f| f.validation.len()).collect();
        assert_eq!(sizes.iter().sum::<usize>(), 6);
        assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);

        for fold in &folds {
            assert_eq!(fold.train.len() + fold.validation.len(), 6);
            assert!(fold.train.iter().all(|idx| !fold.validation.contains(idx)));
        }
    }

    #[test]
    fn negatives_are_unknown_and_disjoint() {
        let (set, adj) = adjacency();
        let folds = KFold::new(3, 11, 1).split(set.len(), &adj).unwrap();
        for fold in &folds {
            let train: HashSet<_> = fold.train_negatives.iter().collect();
            let validation: HashSet<_> = fold.validation_negatives.iter().collect();
            assert!(train.is_disjoint(&validation));
            for (row, col) in train.iter().chain(validation.iter()) {
                assert!(!adj.is_known(*row, *col));
            }
            // 6 unknown pairs for 4 + 2 requested negatives
            assert_eq!(fold.train_negatives.len(), 4);
            assert_eq!(fold.validation_negatives.len(), 2);
        }
    }

    #[test]
    fn insufficient_negatives() {
        let (set, adj) = adjacency();
        let folds = KFold::new(2, 5, 3).split(set.len(), &adj).unwrap();
        let fold = folds.get(0).unwrap();
        // 9 + 9 requested, 6 available
        assert_eq!(fold.train_negatives.len() + fold.validation_negatives.len(), 6);
        assert_eq!(fold.validation_negatives.len(), 3);
    }

    #[test]
    fn deterministic_per_seed() {
        let (set, adj) = adjacency();
        let a = KFold::new(3, 42, 1).split(set.len(), &adj).unwrap();
        let b = KFold::new(3, 42, 1).split(set.len(), &adj).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_k() {
        let (set, adj) = adjacency();
        assert!(KFold::new(1, 0, 1).split(set.len(), &adj).is_err());
        assert!(KFold::new(7, 0, 1).split(set.len(), &adj).is_err());
    }

    #[test]
    fn inconsistent_folds() {
        let (set, adj) = adjacency();
        let folds = KFold::new(3, 1, 1).split(set.len(), &adj).unwrap();

        let mut missing_fold = folds.clone();
        missing_fold.folds.pop();
        assert!(matches!(missing_fold.validate(), Err(NcdaError::InvalidInput(_))));

        let mut overlap = folds.clone();
        let leaked = overlap.folds[0].validation[0];
        overlap.folds[0].train.push(leaked);
        assert!(matches!(overlap.validate(), Err(NcdaError::InvalidInput(_))));

        let mut dropped = folds.clone();
        dropped.folds[1].train.pop();
        assert!(matches!(dropped.validate(), Err(NcdaError::InvalidInput(_))));

        let mut reordered = folds.clone();
        reordered.folds.swap(0, 2);
        assert!(reordered.validate().is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FOLDS_FILENAME);
        overlap.to_json(&path).unwrap();
        assert!(Folds::from_json(&path).is_err());
    }

    #[test]
    fn json_roundtrip() {
        let (set, adj) = adjacency();
        let folds = KFold::default().split(set.len(), &adj).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FOLDS_FILENAME);
        folds.to_json(&path).unwrap();
        assert_eq!(Folds::from_json(&path).unwrap(), folds);
    }
}
