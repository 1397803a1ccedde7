use std::collections::HashMap;

use candle_core::{Device, Tensor};

use crate::kmer::KmerEmbedding;
use crate::model::FeatureDims;
use crate::{LabeledMatrix, NcdaError, NcdaResult};

/// ncRNA - disease pairs with their labels
///
/// Pairs are `(row, col)` positions of the [`AdjacencyMatrix`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabeledPairs {
    pairs: Vec<(usize, usize)>,
    labels: Vec<bool>,
}

impl LabeledPairs {
    /// Combines positive and negative pairs, positives first
    pub fn new(positives: &[(usize, usize)], negatives: &[(usize, usize)]) -> Self {
        let pairs: Vec<(usize, usize)> = positives.iter().chain(negatives).copied().collect();
        let labels = std::iter::repeat(true)
            .take(positives.len())
            .chain(std::iter::repeat(false).take(negatives.len()))
            .collect();
        Self { pairs, labels }
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no pairs
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The pairs
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// `true` for every known association
    pub fn labels(&self) -> &[bool] {
        &self.labels
    }
}

/// Collects the mean k-mer vectors of all ncRNAs in the order of `labels`
///
/// ncRNAs without an embedding get a zero vector.
///
/// # Errors
///
/// - [`NcdaError::InvalidInput`] if no embedding is given
/// - [`NcdaError::DimensionMismatch`] if the embeddings differ in size
pub fn kmer_features(embeddings: &[KmerEmbedding], labels: &[String]) -> NcdaResult<LabeledMatrix> {
    let Some(first) = embeddings.first() else {
        return Err(NcdaError::InvalidInput(
            "at least one k-mer embedding is required".to_string(),
        ));
    };
    let dim = first.dim();
    let columns: Vec<String> = (0..dim).map(|i| format!("e{i}")).collect();
    let mut features = LabeledMatrix::zeros(labels.to_vec(), columns);
    let rows: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(idx, label)| (label.as_str(), idx))
        .collect();

    for embedding in embeddings {
        if embedding.dim() != dim {
            return Err(NcdaError::DimensionMismatch {
                expected: dim,
                found: embedding.dim(),
            });
        }
        let vectors = embedding.sequence_vectors();
        for (idx, id) in vectors.row_labels().iter().enumerate() {
            let (Some(row), Some(values)) = (rows.get(id.as_str()), vectors.row(idx)) else {
                continue;
            };
            for (col, value) in values.iter().enumerate() {
                features.set(*row, col, *value);
            }
        }
    }
    Ok(features)
}

/// The feature matrices of all ncRNAs and diseases on the device
#[derive(Debug, Clone)]
pub struct FeatureSet {
    rna: Tensor,
    disease: Tensor,
    kmer: Tensor,
    dims: FeatureDims,
    n_rna: usize,
    n_disease: usize,
}

impl FeatureSet {
    /// Moves the feature matrices to the device
    ///
    /// `rna` and `kmer` need one row per ncRNA, `disease` one row per disease.
    ///
    /// # Errors
    ///
    /// - [`NcdaError::DimensionMismatch`] if `rna` and `kmer` differ in rows
    /// - [`NcdaError::Model`] if the tensors can't be created
    pub fn new(
        rna: &LabeledMatrix,
        disease: &LabeledMatrix,
        kmer: &LabeledMatrix,
        device: &Device,
    ) -> NcdaResult<Self> {
        if rna.nrows() != kmer.nrows() {
            return Err(NcdaError::DimensionMismatch {
                expected: rna.nrows(),
                found: kmer.nrows(),
            });
        }
        Ok(Self {
            rna: Tensor::from_slice(rna.data(), rna.dim(), device)?,
            disease: Tensor::from_slice(disease.data(), disease.dim(), device)?,
            kmer: Tensor::from_slice(kmer.data(), kmer.dim(), device)?,
            dims: FeatureDims {
                rna: rna.ncols(),
                disease: disease.ncols(),
                kmer: kmer.ncols(),
            },
            n_rna: rna.nrows(),
            n_disease: disease.nrows(),
        })
    }

    /// The input sizes of the model
    pub fn dims(&self) -> FeatureDims {
        self.dims
    }

    /// Selects the feature rows of a batch of `(rna, disease)` pairs
    ///
    /// # Errors
    ///
    /// - [`NcdaError::InvalidInput`] if a pair is out of range
    /// - [`NcdaError::Model`] if the tensors can't be created
    pub fn batch(&self, pairs: &[(usize, usize)]) -> NcdaResult<(Tensor, Tensor, Tensor)> {
        let mut rows = Vec::with_capacity(pairs.len());
        let mut cols = Vec::with_capacity(pairs.len());
        for (row, col) in pairs {
            if *row >= self.n_rna || *col >= self.n_disease {
                return Err(NcdaError::InvalidInput(format!(
                    "pair ({row}, {col}) exceeds the {}x{} feature matrices",
                    self.n_rna, self.n_disease
                )));
            }
            rows.push(u32::try_from(*row)?);
            cols.push(u32::try_from(*col)?);
        }
        let device = self.rna.device();
        let rows = Tensor::from_vec(rows, pairs.len(), device)?;
        let cols = Tensor::from_vec(cols, pairs.len(), device)?;
        Ok((
            self.rna.index_select(&rows, 0)?,
            self.disease.index_select(&cols, 0)?,
            self.kmer.index_select(&rows, 0)?,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kmer::{KmerTokenizer, Word2VecConfig};
    use crate::{RnaKind, RnaRecord, SequenceSet};

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn labeled_pairs() {
        let pairs = LabeledPairs::new(&[(0, 1)], &[(1, 1), (2, 0)]);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.labels(), &[true, false, false]);
        assert_eq!(pairs.pairs()[2], (2, 0));
    }

    #[test]
    fn batch_selects_rows() {
        let rna = LabeledMatrix::new(
            labels(&["a", "b"]),
            labels(&["a", "b"]),
            vec![1.0, 0.2, 0.2, 1.0],
        )
        .unwrap();
        let disease = LabeledMatrix::identity(labels(&["x", "y", "z"]));
        let kmer =
            LabeledMatrix::new(labels(&["a", "b"]), labels(&["e0"]), vec![3.0, 4.0]).unwrap();
        let features = FeatureSet::new(&rna, &disease, &kmer, &Device::Cpu).unwrap();
        assert_eq!(
            features.dims(),
            FeatureDims {
                rna: 2,
                disease: 3,
                kmer: 1
            }
        );

        let (r, d, k) = features.batch(&[(1, 2), (0, 0)]).unwrap();
        assert_eq!(r.to_vec2::<f32>().unwrap(), vec![vec![0.2, 1.0], vec![1.0, 0.2]]);
        assert_eq!(d.to_vec2::<f32>().unwrap()[0], vec![0.0, 0.0, 1.0]);
        assert_eq!(k.to_vec2::<f32>().unwrap(), vec![vec![4.0], vec![3.0]]);

        assert!(features.batch(&[(2, 0)]).is_err());
    }

    #[test]
    fn kmer_vectors_follow_labels() {
        let mut set = SequenceSet::new(RnaKind::Mirna);
        set.push(RnaRecord::new("m1", "ACGUACGU")).unwrap();
        let tokenizer = KmerTokenizer::new(3, 4).unwrap();
        let config = Word2VecConfig {
            dim: 5,
            epochs: 1,
            ..Default::default()
        };
        let embedding = KmerEmbedding::train(&set, tokenizer, config).unwrap();

        let features = kmer_features(&[embedding], &labels(&["l1", "m1"])).unwrap();
        assert_eq!(features.dim(), (2, 5));
        assert!(features.row(0).unwrap().iter().all(|v| *v == 0.0));
        assert!(features.row(1).unwrap().iter().any(|v| *v != 0.0));

        assert!(kmer_features(&[], &labels(&["m1"])).is_err());
    }
}
