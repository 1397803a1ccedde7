use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::folds::{Fold, Folds};
use crate::model::{
    bce_with_logits, weights_file_name, AssociationModel, FeatureSet, LabeledPairs, ModelConfig,
};
use crate::stats::{CrossValidationReport, FoldReport, Metrics};
use crate::{NcdaError, NcdaResult};

/// Trains and evaluates one [`AssociationModel`] per fold
#[derive(Debug)]
pub struct Trainer<'a> {
    config: ModelConfig,
    features: &'a FeatureSet,
    device: Device,
}

impl<'a> Trainer<'a> {
    /// Constructs a new trainer on the given features
    pub fn new(config: ModelConfig, features: &'a FeatureSet, device: Device) -> Self {
        Self {
            config,
            features,
            device,
        }
    }

    /// Runs the full cross validation
    ///
    /// `records` holds the adjacency position of every association record,
    /// the folds refer to it by index. If `out_dir` is given, the weights of
    /// every fold are saved there.
    ///
    /// # Errors
    ///
    /// See [`Trainer::train_fold`]
    pub fn cross_validate(
        &self,
        folds: &Folds,
        records: &[(usize, usize)],
        out_dir: Option<&Path>,
    ) -> NcdaResult<CrossValidationReport> {
        let mut reports = Vec::with_capacity(folds.len());
        for fold in folds {
            let weights = out_dir.map(|dir| dir.join(weights_file_name(fold.index)));
            let report = self.train_fold(fold, records, weights.as_deref())?;
            info!(
                "Fold {}: AUROC {:.4}, AUPRC {:.4}, F1 {:.4}",
                fold.index, report.metrics.auroc, report.metrics.auprc, report.metrics.f1
            );
            reports.push(report);
        }
        let report = CrossValidationReport::new(reports);
        info!(
            "Cross validation: AUROC {:.4} +/- {:.4}, AUPRC {:.4} +/- {:.4}",
            report.mean().auroc,
            report.std().auroc,
            report.mean().auprc,
            report.std().auprc
        );
        Ok(report)
    }

    /// Trains a new model on the training pairs of the fold and evaluates
    /// it on the validation pairs
    ///
    /// # Errors
    ///
    /// - [`NcdaError::InvalidInput`] if the fold refers to unknown records
    ///   or has no training pairs
    /// - [`NcdaError::Model`] if training fails or the weights can't be saved
    pub fn train_fold(
        &self,
        fold: &Fold,
        records: &[(usize, usize)],
        weights: Option<&Path>,
    ) -> NcdaResult<FoldReport> {
        let train = LabeledPairs::new(&positions(&fold.train, records)?, &fold.train_negatives);
        let validation = LabeledPairs::new(
            &positions(&fold.validation, records)?,
            &fold.validation_negatives,
        );
        if train.is_empty() {
            return Err(NcdaError::InvalidInput(format!(
                "fold {} has no training pairs",
                fold.index
            )));
        }

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &self.device);
        let model = AssociationModel::new(self.features.dims(), &self.config, vb)?;

        let seed = self.config.seed.wrapping_add(fold.index as u64);
        let final_loss = self.fit(&model, &varmap, &train, seed)?;

        let scores = self.predict(&model, validation.pairs())?;
        let metrics = Metrics::evaluate(&scores, validation.labels(), self.config.threshold)?;

        if let Some(path) = weights {
            varmap.save(path)?;
            debug!("Saved weights of fold {} to {}", fold.index, path.display());
        }

        Ok(FoldReport {
            fold: fold.index,
            n_train: train.len(),
            n_validation: validation.len(),
            final_loss,
            metrics,
        })
    }

    /// Optimizes the model and returns the mean loss of the last epoch
    fn fit(
        &self,
        model: &AssociationModel,
        varmap: &VarMap,
        train: &LabeledPairs,
        seed: u64,
    ) -> NcdaResult<f64> {
        let params = ParamsAdamW {
            lr: self.config.learning_rate,
            weight_decay: self.config.weight_decay,
            ..Default::default()
        };
        let mut optimizer = AdamW::new(varmap.all_vars(), params)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..train.len()).collect();
        let batch_size = self.config.batch_size.max(1);

        let mut epoch_loss = 0.0;
        for epoch in 0..self.config.epochs {
            order.shuffle(&mut rng);
            let mut total = 0.0;
            let mut batches = 0usize;
            for chunk in order.chunks(batch_size) {
                let pairs: Vec<(usize, usize)> = chunk.iter().map(|idx| train.pairs()[*idx]).collect();
                let targets: Vec<f32> = chunk
                    .iter()
                    .map(|idx| if train.labels()[*idx] { 1.0 } else { 0.0 })
                    .collect();

                let (rna, disease, kmer) = self.features.batch(&pairs)?;
                let targets = Tensor::from_vec(targets, chunk.len(), &self.device)?;
                let logits = model.forward(&rna, &disease, &kmer, true)?;
                let loss = bce_with_logits(&logits, &targets)?;
                optimizer.backward_step(&loss)?;

                total += f64::from(loss.to_scalar::<f32>()?);
                batches += 1;
            }
            #[allow(clippy::cast_precision_loss)]
            {
                epoch_loss = total / batches.max(1) as f64;
            }
            trace!("epoch {epoch}: loss {epoch_loss:.5}");
        }
        debug!(
            "Trained on {} pairs for {} epochs, final loss {epoch_loss:.5}",
            train.len(),
            self.config.epochs
        );
        Ok(epoch_loss)
    }

    /// Returns the association probability of every pair
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if a pair exceeds the feature matrices
    pub fn predict(&self, model: &AssociationModel, pairs: &[(usize, usize)]) -> NcdaResult<Vec<f32>> {
        let mut scores = Vec::with_capacity(pairs.len());
        for chunk in pairs.chunks(self.config.batch_size.max(1)) {
            let (rna, disease, kmer) = self.features.batch(chunk)?;
            scores.extend(model.predict(&rna, &disease, &kmer)?);
        }
        Ok(scores)
    }
}

fn positions(indices: &[usize], records: &[(usize, usize)]) -> NcdaResult<Vec<(usize, usize)>> {
    indices
        .iter()
        .map(|idx| {
            records.get(*idx).copied().ok_or_else(|| {
                NcdaError::InvalidInput(format!(
                    "record {idx} does not exist, only {} records are known",
                    records.len()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::folds::KFold;
    use crate::{AdjacencyMatrix, Association, AssociationSet, LabeledMatrix};

    fn labels(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    fn setup() -> (AssociationSet, AdjacencyMatrix, FeatureSet) {
        let mut set = AssociationSet::default();
        for rna in 0..6 {
            set.insert(Association::new(&format!("r{rna}"), &format!("d{}", rna % 3)));
        }
        let adjacency =
            AdjacencyMatrix::from_associations(&set, labels("r", 6), labels("d", 4)).unwrap();

        let rna = LabeledMatrix::identity(labels("r", 6));
        let disease = LabeledMatrix::identity(labels("d", 4));
        let kmer_data = (0..12).map(|v| v as f32 / 12.0).collect();
        let kmer = LabeledMatrix::new(labels("r", 6), labels("e", 2), kmer_data).unwrap();
        let features = FeatureSet::new(&rna, &disease, &kmer, &Device::Cpu).unwrap();
        (set, adjacency, features)
    }

    fn config() -> ModelConfig {
        ModelConfig {
            projection_size: 4,
            hidden_size: 4,
            epochs: 3,
            batch_size: 4,
            ..Default::default()
        }
    }

    #[test]
    fn cross_validation() {
        let (set, adjacency, features) = setup();
        let records = adjacency.record_positions(&set).unwrap();
        let folds = KFold::new(3, 1, 1).split(set.len(), &adjacency).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(config(), &features, Device::Cpu);
        let report = trainer
            .cross_validate(&folds, &records, Some(dir.path()))
            .unwrap();

        assert_eq!(report.folds().len(), 3);
        for fold in report.folds() {
            assert_eq!(fold.n_train, 8);
            assert_eq!(fold.n_validation, 4);
            assert!(fold.final_loss.is_finite());
            assert!((0.0..=1.0).contains(&fold.metrics.auroc));
            assert!(dir.path().join(weights_file_name(fold.fold)).exists());
        }
    }

    #[test]
    fn unknown_records() {
        let (set, adjacency, features) = setup();
        let folds = KFold::new(2, 1, 1).split(set.len(), &adjacency).unwrap();
        let trainer = Trainer::new(config(), &features, Device::Cpu);
        let res = trainer.train_fold(folds.get(0).unwrap(), &[(0, 0)], None);
        assert!(matches!(res, Err(NcdaError::InvalidInput(_))));
    }
}
