//! Pipeline configuration, read from TOML
//!
//! Every section is optional, missing values fall back to their defaults:
//!
//! ```toml
//! [paths]
//! data_dir = "data"
//!
//! [similarity]
//! method = "local"
//!
//! [disease]
//! method = "lin"
//! combiner = "bma"
//!
//! [folds]
//! k = 10
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alignment::{AlignmentMethod, AlignmentScoring};
use crate::folds::{KFold, FOLDS_FILENAME};
use crate::kmer::{KmerEmbedding, KmerTokenizer, Word2VecConfig};
use crate::merge::MergeStrategy;
use crate::model::{weights_file_name, ModelConfig};
use crate::similarity::{Builtins, StandardCombiner};
use crate::stats::REPORT_FILENAME;
use crate::term::InformationContentKind;
use crate::{
    NcdaError, NcdaResult, RnaKind, ASSOCIATIONS_FILENAME, DISEASE_RECORDS_FILENAME,
    DISEASE_SIMILARITY_FILENAME, OBO_FILENAME,
};

/// Configuration of all pipeline stages
///
/// # Examples
///
/// ```
/// use ncda::PipelineConfig;
///
/// let config = PipelineConfig::from_toml("[folds]\nk = 3\n").unwrap();
/// assert_eq!(config.folds.k, 3);
/// assert_eq!(config.folds.seed, 42);
/// assert!(config.paths.disease_similarity().ends_with("d2d_do.csv"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Input and output files
    pub paths: PathsConfig,
    /// ncRNA sequence similarity and merging
    pub similarity: SimilarityConfig,
    /// Disease semantic similarity
    pub disease: DiseaseConfig,
    /// K-mer embedding pretraining
    pub kmer: KmerConfig,
    /// Cross validation folds
    pub folds: KFold,
    /// Association model
    pub model: ModelConfig,
}

impl PipelineConfig {
    /// Reads the configuration from a TOML file
    ///
    /// # Errors
    ///
    /// - [`NcdaError::CannotOpenFile`] if the file can't be read
    /// - [`NcdaError::Config`] if the content is not a valid configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> NcdaResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|_| NcdaError::CannotOpenFile(path.display().to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses the configuration from a TOML string
    ///
    /// # Errors
    ///
    /// [`NcdaError::Config`] if the content is not a valid configuration
    pub fn from_toml(content: &str) -> NcdaResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the configuration as TOML
    ///
    /// # Errors
    ///
    /// [`NcdaError::Config`] if a value can't be represented in TOML
    pub fn to_toml(&self) -> NcdaResult<String> {
        toml::to_string_pretty(self).map_err(|err| NcdaError::Config(err.to_string()))
    }
}

/// Locations of all input and output files
///
/// File names are relative to `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of all pipeline files
    pub data_dir: PathBuf,
    /// Disease Ontology in OBO format
    pub obo: String,
    /// Disease names and their DOIDs
    pub disease_records: String,
    /// Curated ncRNA - disease associations
    pub associations: String,
    /// Disease - disease similarity output
    pub disease_similarity: String,
    /// Merged ncRNA similarity output
    pub merged_similarity: String,
    /// Association adjacency matrix output
    pub adjacency: String,
    /// Cross validation folds output
    pub folds: String,
    /// Cross validation report output
    pub report: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            obo: OBO_FILENAME.to_string(),
            disease_records: DISEASE_RECORDS_FILENAME.to_string(),
            associations: ASSOCIATIONS_FILENAME.to_string(),
            disease_similarity: DISEASE_SIMILARITY_FILENAME.to_string(),
            merged_similarity: "rna_similarity_merged.csv".to_string(),
            adjacency: "adjacency.csv".to_string(),
            folds: FOLDS_FILENAME.to_string(),
            report: REPORT_FILENAME.to_string(),
        }
    }
}

impl PathsConfig {
    fn path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// `<kind>_sequences.csv`
    pub fn sequences(&self, kind: RnaKind) -> PathBuf {
        self.path(&format!("{kind}_sequences.csv"))
    }

    /// `<kind>_similarity.csv`
    pub fn rna_similarity(&self, kind: RnaKind) -> PathBuf {
        self.path(&format!("{kind}_similarity.csv"))
    }

    /// The Disease Ontology
    pub fn obo(&self) -> PathBuf {
        self.path(&self.obo)
    }

    /// The disease records
    pub fn disease_records(&self) -> PathBuf {
        self.path(&self.disease_records)
    }

    /// The association records
    pub fn associations(&self) -> PathBuf {
        self.path(&self.associations)
    }

    /// The disease similarity matrix
    pub fn disease_similarity(&self) -> PathBuf {
        self.path(&self.disease_similarity)
    }

    /// The merged ncRNA similarity matrix
    pub fn merged_similarity(&self) -> PathBuf {
        self.path(&self.merged_similarity)
    }

    /// The adjacency matrix
    pub fn adjacency(&self) -> PathBuf {
        self.path(&self.adjacency)
    }

    /// The k-mer embedding of one ncRNA type
    pub fn kmer_embedding(&self, kind: RnaKind, dim: usize) -> PathBuf {
        self.path(&KmerEmbedding::file_name(kind, dim))
    }

    /// The folds
    pub fn folds(&self) -> PathBuf {
        self.path(&self.folds)
    }

    /// The model weights of one fold
    pub fn model_weights(&self, fold: usize) -> PathBuf {
        self.path(&weights_file_name(fold))
    }

    /// The cross validation report
    pub fn report(&self) -> PathBuf {
        self.path(&self.report)
    }
}

/// Settings of the ncRNA sequence similarity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// ncRNA types to process
    pub kinds: Vec<RnaKind>,
    /// Alignment algorithm
    pub method: AlignmentMethod,
    /// Alignment scores
    pub scoring: AlignmentScoring,
    /// How the per-type matrices are merged
    pub merge: MergeStrategy,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            kinds: RnaKind::ALL.to_vec(),
            method: AlignmentMethod::default(),
            scoring: AlignmentScoring::default(),
            merge: MergeStrategy::default(),
        }
    }
}

/// Settings of the disease semantic similarity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseConfig {
    /// Term similarity, see [`Builtins::new`]
    pub method: String,
    /// Combination of term similarities into a disease similarity
    pub combiner: StandardCombiner,
    /// Information content used by IC based methods
    pub ic: InformationContentKind,
}

impl Default for DiseaseConfig {
    fn default() -> Self {
        Self {
            method: "graphic".to_string(),
            combiner: StandardCombiner::default(),
            ic: InformationContentKind::default(),
        }
    }
}

impl DiseaseConfig {
    /// Returns the configured term similarity
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if the method is unknown
    pub fn similarity(&self) -> NcdaResult<Builtins> {
        Builtins::new(&self.method, self.ic)
    }
}

/// Settings of the k-mer tokenization and word2vec training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KmerConfig {
    /// ncRNA types to embed
    pub kinds: Vec<RnaKind>,
    /// Length of the k-mers
    pub k: usize,
    /// Tokens per segment
    pub max_len: usize,
    /// Size of the k-mer vectors
    pub dim: usize,
    /// Context window of word2vec
    pub window: usize,
    /// Negative samples per context token
    pub negative: usize,
    /// Passes over the corpus
    pub epochs: usize,
    /// Initial learning rate
    pub learning_rate: f32,
    /// Random seed
    pub seed: u64,
}

impl Default for KmerConfig {
    fn default() -> Self {
        let word2vec = Word2VecConfig::default();
        Self {
            kinds: RnaKind::ALL.to_vec(),
            k: 3,
            max_len: 512,
            dim: word2vec.dim,
            window: word2vec.window,
            negative: word2vec.negative,
            epochs: word2vec.epochs,
            learning_rate: word2vec.learning_rate,
            seed: word2vec.seed,
        }
    }
}

impl KmerConfig {
    /// Returns the tokenizer
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if `k` or `max_len` is `0`
    pub fn tokenizer(&self) -> NcdaResult<KmerTokenizer> {
        KmerTokenizer::new(self.k, self.max_len)
    }

    /// Returns the word2vec hyperparameters
    pub fn word2vec(&self) -> Word2VecConfig {
        Word2VecConfig {
            dim: self.dim,
            window: self.window,
            negative: self.negative,
            epochs: self.epochs,
            learning_rate: self.learning_rate,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.paths.obo(), PathBuf::from("data/doid.obo"));
        assert_eq!(
            config.paths.sequences(RnaKind::Lncrna),
            PathBuf::from("data/lncrna_sequences.csv")
        );
        assert_eq!(
            config.paths.kmer_embedding(RnaKind::Mirna, 64),
            PathBuf::from("data/kmer_embedding_mirna_64.json")
        );
        assert_eq!(
            config.paths.model_weights(2),
            PathBuf::from("data/model_fold2.safetensors")
        );
        assert_eq!(config.similarity.kinds.len(), 4);
        assert!(matches!(
            config.disease.similarity().unwrap(),
            Builtins::GraphIc(InformationContentKind::Intrinsic)
        ));
    }

    #[test]
    fn sections() {
        let config = PipelineConfig::from_toml(
            r#"
            [paths]
            data_dir = "/tmp/ncda"
            disease_similarity = "dd.csv"

            [similarity]
            kinds = ["mirna", "circrna"]
            method = "local"
            merge = "padded"

            [similarity.scoring]
            gap_open = -3

            [disease]
            method = "wang"
            combiner = "bma"

            [kmer]
            k = 4
            dim = 16

            [model]
            epochs = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.disease_similarity(), PathBuf::from("/tmp/ncda/dd.csv"));
        assert_eq!(config.similarity.kinds, vec![RnaKind::Mirna, RnaKind::Circrna]);
        assert_eq!(config.similarity.method, AlignmentMethod::Local);
        assert_eq!(config.similarity.merge, MergeStrategy::Padded);
        assert_eq!(config.similarity.scoring.gap_open, -3);
        assert_eq!(config.similarity.scoring.gap_extend, -1);
        assert_eq!(config.disease.combiner, StandardCombiner::Bma);
        assert_eq!(config.kmer.word2vec().dim, 16);
        assert_eq!(config.kmer.tokenizer().unwrap().k(), 4);
        assert_eq!(config.model.epochs, 7);
        assert_eq!(config.folds.k, 5);
    }

    #[test]
    fn invalid_config() {
        assert!(matches!(
            PipelineConfig::from_toml("[folds]\nk = \"five\""),
            Err(NcdaError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml("[unknown]\nvalue = 1"),
            Err(NcdaError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_file("/does/not/exist.toml"),
            Err(NcdaError::CannotOpenFile(_))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let config = PipelineConfig::default();
        let parsed = PipelineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
