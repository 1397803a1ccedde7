//! The stages of the association pipeline
//!
//! Every stage reads the files of the previous stages from the data
//! directory of the [`PipelineConfig`] and writes its own results there.
//! [`run_all`] runs all stages in order.
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::alignment::similarity_matrix;
use crate::folds::Folds;
use crate::kmer::KmerEmbedding;
use crate::merge::MultiView;
use crate::model::{self, kmer_features, FeatureSet, Trainer};
use crate::similarity::disease_similarity_matrix;
use crate::stats::CrossValidationReport;
use crate::{
    AdjacencyMatrix, AssociationSet, LabeledMatrix, NcdaError, NcdaResult, Ontology,
    PipelineConfig, RnaKind, SequenceSet,
};

/// The pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Pairwise sequence similarity per ncRNA type
    Similarity,
    /// Merging of the per-type similarity matrices
    Merge,
    /// Disease semantic similarity
    Disease,
    /// ncRNA - disease adjacency matrix
    Adjacency,
    /// K-mer embedding pretraining
    Kmer,
    /// Cross validation folds
    Folds,
    /// Model training and evaluation
    Train,
}

impl Stage {
    /// All stages, in execution order
    pub const ALL: [Stage; 7] = [
        Stage::Similarity,
        Stage::Merge,
        Stage::Disease,
        Stage::Adjacency,
        Stage::Kmer,
        Stage::Folds,
        Stage::Train,
    ];

    /// Runs the stage
    ///
    /// # Errors
    ///
    /// Returns the error of the failing stage
    pub fn run(self, config: &PipelineConfig) -> NcdaResult<()> {
        info!("Running stage {self}");
        match self {
            Stage::Similarity => similarity(config).map(drop),
            Stage::Merge => merge(config).map(drop),
            Stage::Disease => disease(config).map(drop),
            Stage::Adjacency => adjacency(config).map(drop),
            Stage::Kmer => kmer(config).map(drop),
            Stage::Folds => folds(config).map(drop),
            Stage::Train => train(config).map(drop),
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Similarity => "similarity",
            Stage::Merge => "merge",
            Stage::Disease => "disease",
            Stage::Adjacency => "adjacency",
            Stage::Kmer => "kmer",
            Stage::Folds => "folds",
            Stage::Train => "train",
        };
        f.write_str(name)
    }
}

/// Runs all stages in order
///
/// # Errors
///
/// Stops at the first failing stage and returns its error
pub fn run_all(config: &PipelineConfig) -> NcdaResult<()> {
    for stage in Stage::ALL {
        stage.run(config)?;
    }
    Ok(())
}

/// Returns the configured ncRNA types that have a sequence file
fn available_kinds(config: &PipelineConfig, kinds: &[RnaKind]) -> Vec<RnaKind> {
    kinds
        .iter()
        .copied()
        .filter(|kind| {
            let path = config.paths.sequences(*kind);
            let exists = path.exists();
            if !exists {
                warn!("No {kind} sequences at {}, skipping", path.display());
            }
            exists
        })
        .collect()
}

/// Calculates and writes the sequence similarity matrix of every ncRNA type
///
/// Types without a sequence file are skipped. Returns the written files.
///
/// # Errors
///
/// - [`NcdaError::InvalidInput`] if no sequence file exists
/// - errors from reading the sequences or writing the matrices
pub fn similarity(config: &PipelineConfig) -> NcdaResult<Vec<PathBuf>> {
    let kinds = available_kinds(config, &config.similarity.kinds);
    if kinds.is_empty() {
        return Err(NcdaError::InvalidInput(
            "no ncRNA sequence file found".to_string(),
        ));
    }
    let method = config
        .similarity
        .method
        .with_scoring(config.similarity.scoring);

    let mut written = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let set = SequenceSet::from_csv(kind, config.paths.sequences(kind))?;
        let matrix = similarity_matrix(&set, &method);
        let path = config.paths.rna_similarity(kind);
        matrix.to_csv(&path)?;
        info!("Wrote {kind} similarity to {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Merges the per-type similarity matrices into one matrix
///
/// # Errors
///
/// - [`NcdaError::InvalidInput`] if no per-type matrix exists
/// - errors from [`MultiView::merge`]
pub fn merge(config: &PipelineConfig) -> NcdaResult<MultiView> {
    let mut matrices = Vec::new();
    for kind in &config.similarity.kinds {
        let path = config.paths.rna_similarity(*kind);
        if path.exists() {
            matrices.push((*kind, LabeledMatrix::from_csv(&path)?));
        } else {
            warn!("No {kind} similarity at {}, skipping", path.display());
        }
    }
    if matrices.is_empty() {
        return Err(NcdaError::InvalidInput(
            "no ncRNA similarity matrix found".to_string(),
        ));
    }
    let view = MultiView::merge(matrices, config.similarity.merge)?;
    let path = config.paths.merged_similarity();
    view.matrix().to_csv(&path)?;
    info!("Wrote merged ncRNA similarity to {}", path.display());
    Ok(view)
}

/// Builds the Disease Ontology and writes the disease similarity matrix
///
/// # Errors
///
/// Errors from parsing the ontology or disease records, an unknown
/// similarity method or writing the matrix
pub fn disease(config: &PipelineConfig) -> NcdaResult<LabeledMatrix> {
    let ontology = Ontology::from_files(config.paths.obo(), Some(config.paths.disease_records()))?;
    info!(
        "Loaded Disease Ontology {} with {} terms and {} diseases",
        ontology.version(),
        ontology.len(),
        ontology.disease_count()
    );
    let similarity = config.disease.similarity()?;
    let matrix = disease_similarity_matrix(&ontology, &similarity, &config.disease.combiner);
    let path = config.paths.disease_similarity();
    matrix.to_csv(&path)?;
    info!("Wrote disease similarity to {}", path.display());
    Ok(matrix)
}

/// Builds the ncRNA - disease adjacency matrix
///
/// Rows follow the merged ncRNA similarity, columns the disease similarity.
///
/// # Errors
///
/// [`NcdaError::UnknownIdentifier`] if an association names an ncRNA or
/// disease without similarity
pub fn adjacency(config: &PipelineConfig) -> NcdaResult<AdjacencyMatrix> {
    let associations = AssociationSet::from_csv(config.paths.associations())?;
    let rna = LabeledMatrix::from_csv(config.paths.merged_similarity())?;
    let disease = LabeledMatrix::from_csv(config.paths.disease_similarity())?;

    let adjacency = AdjacencyMatrix::from_associations(
        &associations,
        rna.row_labels().to_vec(),
        disease.row_labels().to_vec(),
    )?;
    let path = config.paths.adjacency();
    adjacency.to_csv(&path)?;
    info!(
        "Wrote {}x{} adjacency with {} associations to {}",
        adjacency.matrix().nrows(),
        adjacency.matrix().ncols(),
        adjacency.count(),
        path.display()
    );
    Ok(adjacency)
}

/// Trains and writes the k-mer embedding of every ncRNA type
///
/// Types without a sequence file are skipped.
///
/// # Errors
///
/// Errors from reading the sequences, training or writing the embeddings
pub fn kmer(config: &PipelineConfig) -> NcdaResult<Vec<PathBuf>> {
    let tokenizer = config.kmer.tokenizer()?;
    let word2vec = config.kmer.word2vec();

    let mut written = Vec::new();
    for kind in available_kinds(config, &config.kmer.kinds) {
        let set = SequenceSet::from_csv(kind, config.paths.sequences(kind))?;
        let embedding = KmerEmbedding::train(&set, tokenizer, word2vec)?;
        let path = config.paths.kmer_embedding(kind, word2vec.dim);
        embedding.to_json(&path)?;
        info!("Wrote {kind} k-mer embedding to {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Splits the associations into cross validation folds
///
/// # Errors
///
/// Errors from reading the associations or adjacency and from the split
pub fn folds(config: &PipelineConfig) -> NcdaResult<Folds> {
    let associations = AssociationSet::from_csv(config.paths.associations())?;
    let adjacency = AdjacencyMatrix::from_csv(config.paths.adjacency())?;
    if adjacency.count() != associations.len() {
        return Err(NcdaError::InvalidInput(format!(
            "adjacency holds {} associations, expected {}",
            adjacency.count(),
            associations.len()
        )));
    }
    let folds = config.folds.split(associations.len(), &adjacency)?;
    let path = config.paths.folds();
    folds.to_json(&path)?;
    info!("Wrote {} folds to {}", folds.len(), path.display());
    Ok(folds)
}

/// Trains and evaluates one association model per fold
///
/// # Errors
///
/// Errors from reading the previous results or from training
pub fn train(config: &PipelineConfig) -> NcdaResult<CrossValidationReport> {
    let associations = AssociationSet::from_csv(config.paths.associations())?;
    let adjacency = AdjacencyMatrix::from_csv(config.paths.adjacency())?;
    let rna = LabeledMatrix::from_csv(config.paths.merged_similarity())?;
    let disease = LabeledMatrix::from_csv(config.paths.disease_similarity())?;
    let folds = Folds::from_json(config.paths.folds())?;

    if rna.row_labels() != adjacency.matrix().row_labels()
        || disease.row_labels() != adjacency.matrix().col_labels()
    {
        return Err(NcdaError::InvalidInput(
            "adjacency does not match the similarity matrices".to_string(),
        ));
    }
    if folds.n_records() != associations.len() {
        return Err(NcdaError::DimensionMismatch {
            expected: associations.len(),
            found: folds.n_records(),
        });
    }

    let mut embeddings = Vec::new();
    let mut missing = Vec::new();
    for kind in &config.kmer.kinds {
        let path = config.paths.kmer_embedding(*kind, config.kmer.dim);
        if path.exists() {
            embeddings.push(KmerEmbedding::from_json(&path)?);
        } else {
            debug!("No k-mer embedding at {}", path.display());
            missing.push(path.display().to_string());
        }
    }
    if embeddings.is_empty() {
        return Err(NcdaError::CannotOpenFile(format!(
            "no k-mer embedding of dimension {} found, looked for: {}",
            config.kmer.dim,
            missing.join(", ")
        )));
    }
    let kmer = kmer_features(&embeddings, rna.row_labels())?;

    let device = model::device()?;
    let features = FeatureSet::new(&rna, &disease, &kmer, &device)?;
    let records = adjacency.record_positions(&associations)?;

    fs::create_dir_all(&config.paths.data_dir)?;
    let trainer = Trainer::new(config.model, &features, device);
    let report = trainer.cross_validate(&folds, &records, Some(&config.paths.data_dir))?;

    let path = config.paths.report();
    report.to_json(&path)?;
    info!("Wrote cross validation report to {}", path.display());
    Ok(report)
}
