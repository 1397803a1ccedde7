use candle_core::Tensor;
use candle_nn::{linear, ops, Linear, Module, VarBuilder};

use crate::model::ModelConfig;
use crate::NcdaResult;

/// Input sizes of the three views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureDims {
    /// Columns of the merged ncRNA similarity
    pub rna: usize,
    /// Columns of the disease similarity
    pub disease: usize,
    /// Size of the k-mer vectors
    pub kmer: usize,
}

/// Multi-view MLP that predicts one logit per ncRNA - disease pair
///
/// Every view is projected by a `Linear` layer with ReLU, the projections
/// are concatenated and passed through a hidden layer with dropout to the
/// output logit.
#[derive(Debug)]
pub struct AssociationModel {
    rna_projection: Linear,
    disease_projection: Linear,
    kmer_projection: Linear,
    hidden: Linear,
    output: Linear,
    dropout: f32,
}

impl AssociationModel {
    /// Creates the layers below the given [`VarBuilder`]
    ///
    /// # Errors
    ///
    /// [`crate::NcdaError::Model`] if a layer can't be created
    pub fn new(dims: FeatureDims, config: &ModelConfig, vb: VarBuilder) -> NcdaResult<Self> {
        let projection = config.projection_size;
        Ok(Self {
            rna_projection: linear(dims.rna, projection, vb.pp("rna_projection"))?,
            disease_projection: linear(dims.disease, projection, vb.pp("disease_projection"))?,
            kmer_projection: linear(dims.kmer, projection, vb.pp("kmer_projection"))?,
            hidden: linear(3 * projection, config.hidden_size, vb.pp("hidden"))?,
            output: linear(config.hidden_size, 1, vb.pp("output"))?,
            dropout: config.dropout,
        })
    }

    /// Returns the logits of a batch of pairs, shape `(batch,)`
    ///
    /// Dropout is only applied if `train` is `true`.
    ///
    /// # Errors
    ///
    /// [`crate::NcdaError::Model`] if the inputs don't match the layer sizes
    pub fn forward(
        &self,
        rna: &Tensor,
        disease: &Tensor,
        kmer: &Tensor,
        train: bool,
    ) -> NcdaResult<Tensor> {
        let rna = self.rna_projection.forward(rna)?.relu()?;
        let disease = self.disease_projection.forward(disease)?.relu()?;
        let kmer = self.kmer_projection.forward(kmer)?.relu()?;

        let x = Tensor::cat(&[&rna, &disease, &kmer], 1)?;
        let x = self.apply_dropout(x, train)?;
        let x = self.hidden.forward(&x)?.relu()?;
        let x = self.apply_dropout(x, train)?;
        Ok(self.output.forward(&x)?.squeeze(1)?)
    }

    /// Returns the association probabilities of a batch of pairs
    ///
    /// # Errors
    ///
    /// [`crate::NcdaError::Model`] if the inputs don't match the layer sizes
    pub fn predict(&self, rna: &Tensor, disease: &Tensor, kmer: &Tensor) -> NcdaResult<Vec<f32>> {
        let logits = self.forward(rna, disease, kmer, false)?;
        Ok(ops::sigmoid(&logits)?.to_vec1::<f32>()?)
    }

    fn apply_dropout(&self, x: Tensor, train: bool) -> NcdaResult<Tensor> {
        if train && self.dropout > 0.0 {
            Ok(ops::dropout(&x, self.dropout)?)
        } else {
            Ok(x)
        }
    }
}
