//! Neural association predictor
//!
//! An [`AssociationModel`] scores ncRNA - disease pairs from three views:
//! the ncRNA row of the merged ncRNA similarity, the disease row of the
//! disease similarity and the mean k-mer vector of the ncRNA. The
//! [`Trainer`] fits one model per cross validation fold.
use candle_core::Device;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::NcdaResult;

mod architecture;
mod features;
mod loss;
mod trainer;

pub use architecture::{AssociationModel, FeatureDims};
pub use features::{kmer_features, FeatureSet, LabeledPairs};
pub use loss::bce_with_logits;
pub use trainer::Trainer;

/// Hyperparameters of the association model and its training
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Output size of the projection of each view
    pub projection_size: usize,
    /// Size of the hidden layer of the MLP
    pub hidden_size: usize,
    /// Dropout probability during training
    pub dropout: f32,
    /// Learning rate of AdamW
    pub learning_rate: f64,
    /// Weight decay of AdamW
    pub weight_decay: f64,
    /// Passes over the training pairs
    pub epochs: usize,
    /// Pairs per optimizer step
    pub batch_size: usize,
    /// Seed of the batch shuffling
    pub seed: u64,
    /// Minimum probability of a positive prediction
    pub threshold: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            projection_size: 64,
            hidden_size: 64,
            dropout: 0.3,
            learning_rate: 1e-3,
            weight_decay: 1e-4,
            epochs: 50,
            batch_size: 64,
            seed: 42,
            threshold: 0.5,
        }
    }
}

/// File name of the weights of one fold, e.g. `model_fold0.safetensors`
pub fn weights_file_name(fold: usize) -> String {
    format!("model_fold{fold}.safetensors")
}

/// Returns the device for tensor math
///
/// With the `cuda` feature the first GPU is used if available.
pub fn device() -> NcdaResult<Device> {
    #[cfg(feature = "cuda")]
    let device = Device::cuda_if_available(0)?;
    #[cfg(not(feature = "cuda"))]
    let device = Device::Cpu;
    debug!("Using device {device:?}");
    Ok(device)
}
