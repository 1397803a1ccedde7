#![doc = include_str!("../README.md")]
use std::num::{ParseFloatError, ParseIntError, TryFromIntError};
use thiserror::Error;

pub mod alignment;
pub mod association;
pub mod config;
pub mod disease;
pub mod folds;
pub mod kmer;
pub mod matrix;
pub mod merge;
pub mod model;
pub mod ontology;
pub mod parser;
pub mod pipeline;
pub mod sequence;
pub mod set;
pub mod similarity;
pub mod stats;
pub mod term;
pub mod utils;

pub use association::{AdjacencyMatrix, Association, AssociationSet};
pub use config::PipelineConfig;
pub use disease::{Disease, DiseaseId};
pub use matrix::LabeledMatrix;
pub use ontology::Ontology;
pub use sequence::{RnaKind, RnaRecord, SequenceSet};
pub use set::DoSet;
pub use term::{DoTerm, DoTermId};

const DEFAULT_NUM_PARENTS: usize = 4;
const DEFAULT_NUM_ALL_PARENTS: usize = 20;
const DEFAULT_NUM_DISEASES: usize = 8;

/// Prefix of Disease Ontology term identifiers, e.g. `DOID:1324`
pub const DOID_PREFIX: &str = "DOID:";

/// Default filename of the Disease Ontology OBO file
pub const OBO_FILENAME: &str = "doid.obo";
/// Default filename of the disease to DOID mapping
pub const DISEASE_RECORDS_FILENAME: &str = "disease_doid.csv";
/// Default filename of the curated ncRNA - disease associations
pub const ASSOCIATIONS_FILENAME: &str = "associations.csv";
/// Default filename of the disease - disease similarity matrix
pub const DISEASE_SIMILARITY_FILENAME: &str = "d2d_do.csv";

/// Main error type of the `ncda` crate
#[derive(Error, Debug)]
pub enum NcdaError {
    /// Term or record does not exist
    #[error("term does not exist")]
    DoesNotExist,
    /// An ncRNA or disease identifier is not known to the target matrix
    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),
    /// Failed to parse an integer
    #[error("unable to parse Integer")]
    ParseIntError,
    /// Failed to parse a float
    #[error("unable to parse Float")]
    ParseFloatError,
    /// Failed to open or read a file
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// Input data is malformed or violates an invariant
    #[error("invalid input data: {0}")]
    InvalidInput(String),
    /// Two matrices or vectors do not have compatible shapes
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// expected size
        expected: usize,
        /// actual size
        found: usize,
    },
    /// Configuration cannot be parsed
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Error from the CSV reader or writer
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Error from (de)serializing JSON artifacts
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Generic IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Error from the tensor backend
    #[error("model error: {0}")]
    Model(String),
}

impl From<ParseIntError> for NcdaError {
    fn from(_: ParseIntError) -> Self {
        NcdaError::ParseIntError
    }
}

impl From<ParseFloatError> for NcdaError {
    fn from(_: ParseFloatError) -> Self {
        NcdaError::ParseFloatError
    }
}

impl From<TryFromIntError> for NcdaError {
    fn from(_: TryFromIntError) -> Self {
        NcdaError::ParseIntError
    }
}

impl From<candle_core::Error> for NcdaError {
    fn from(e: candle_core::Error) -> Self {
        NcdaError::Model(e.to_string())
    }
}

impl From<toml::de::Error> for NcdaError {
    fn from(e: toml::de::Error) -> Self {
        NcdaError::Config(e.to_string())
    }
}

/// Shortcut for `Result<T, NcdaError>`
pub type NcdaResult<T> = Result<T, NcdaError>;

/// Converts counts and matrix dimensions into `f32`
///
/// All counts in this crate stay far below 2^24, so the conversion is exact.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn usize_to_f32(n: usize) -> f32 {
    n as f32
}
