//! Methods to calculate the Similarity between two terms or sets of terms
//!
//! The disease semantic similarity is calculated in two steps:
//!
//! 1. the similarity of every term of disease A with every term of disease B
//!    is calculated by a [`Similarity`] algorithm, e.g. [`GraphIc`] or [`Wang`]
//! 2. the resulting term - term matrix is combined into a single score with a
//!    [`SimilarityCombiner`], e.g. [`StandardCombiner::FunSimAvg`]
//!
//! [`disease_similarity_matrix`] does this for all pairs of diseases of an
//! [`Ontology`].
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::matrix::{LabeledMatrix, Matrix};
use crate::term::InformationContentKind;
use crate::utils::upper_triangle;
use crate::{usize_to_f32, DoSet, DoTerm, NcdaError, NcdaResult, Ontology};

mod defaults;
pub use defaults::{GraphIc, Jc, Lin, Relevance, Resnik, Wang, WANG_IS_A_WEIGHT};

/// Trait for similarity score calculation between 2 [`DoTerm`]s
///
/// `ncda` comes pre-loaded with several common and well established
/// similarity algorithms that implement the `Similarity` trait.
pub trait Similarity {
    /// calculates the actual similarity between term a and term b
    fn calculate(&self, a: &DoTerm, b: &DoTerm) -> f32;
}

/// Enum of all built-in [`Similarity`] algorithms
///
/// `Builtins::Resnik` is divided by the maximum information content of the
/// ontology, so all builtins return scores within `[0, 1]`.
///
/// # Examples
///
/// ```
/// use ncda::similarity::Builtins;
/// use ncda::term::InformationContentKind;
///
/// let sim = Builtins::new("wang", InformationContentKind::Intrinsic).unwrap();
/// assert!(matches!(sim, Builtins::Wang(_)));
/// assert!(Builtins::new("foobar", InformationContentKind::Intrinsic).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Builtins {
    /// [`GraphIc`]
    GraphIc(InformationContentKind),
    /// [`Resnik`], scaled by the maximum information content
    Resnik(InformationContentKind),
    /// [`Lin`]
    Lin(InformationContentKind),
    /// [`Jc`]
    Jc(InformationContentKind),
    /// [`Relevance`]
    Relevance(InformationContentKind),
    /// [`Wang`], uses the topology only
    Wang(Wang),
}

impl Default for Builtins {
    fn default() -> Self {
        Self::GraphIc(InformationContentKind::default())
    }
}

impl Builtins {
    /// Constructs a new [`Builtins`] from its name
    ///
    /// Valid names are `graphic`, `resnik`, `lin`, `jc`, `rel` and `wang`
    /// (case-insensitive)
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if the name is unknown
    pub fn new(method: &str, kind: InformationContentKind) -> NcdaResult<Self> {
        match method.to_lowercase().as_str() {
            "graphic" => Ok(Self::GraphIc(kind)),
            "resnik" => Ok(Self::Resnik(kind)),
            "lin" => Ok(Self::Lin(kind)),
            "jc" => Ok(Self::Jc(kind)),
            "rel" | "relevance" => Ok(Self::Relevance(kind)),
            "wang" => Ok(Self::Wang(Wang::default())),
            _ => Err(NcdaError::InvalidInput(format!(
                "unknown similarity method: {method}"
            ))),
        }
    }
}

impl Similarity for Builtins {
    fn calculate(&self, a: &DoTerm, b: &DoTerm) -> f32 {
        match self {
            Builtins::GraphIc(kind) => GraphIc::new(*kind).calculate(a, b),
            Builtins::Resnik(kind) => {
                let max_ic = a.ontology().max_information_content(kind);
                if max_ic == 0.0 {
                    return 0.0;
                }
                Resnik::new(*kind).calculate(a, b) / max_ic
            }
            Builtins::Lin(kind) => Lin::new(*kind).calculate(a, b),
            Builtins::Jc(kind) => Jc::new(*kind).calculate(a, b),
            Builtins::Relevance(kind) => Relevance::new(*kind).calculate(a, b),
            Builtins::Wang(wang) => wang.calculate(a, b),
        }
    }
}

/// This trait is needed for custom implementations
///
/// For similarity calculation between sets of `DoTerm`s
/// the similarity scores must be combined
pub trait SimilarityCombiner {
    /// This method implements the actual logic to calculate a single
    /// similarity score from a Matrix of term - term similarity scores.
    fn combine(&self, m: &Matrix<f32>) -> f32;

    /// this method is called by [`GroupSimilarity`] to combine individual term - term
    /// similarity scores into a single score for the group - group similarity
    fn calculate(&self, m: &Matrix<f32>) -> f32 {
        if m.is_empty() {
            return 0.0;
        }
        self.combine(m)
    }

    /// Returns the maximum values of each row
    fn row_maxes(&self, m: &Matrix<f32>) -> Vec<f32> {
        m.rows()
            .map(|row| row.iter().fold(f32::MIN, |max, v| max.max(*v)))
            .collect()
    }

    /// Returns the maximum values of each column
    fn col_maxes(&self, m: &Matrix<f32>) -> Vec<f32> {
        m.cols()
            .map(|col| col.fold(f32::MIN, |max, v| max.max(*v)))
            .collect()
    }

    /// Returns the dimenension of the `Matrix`, (rows, columns)
    fn dim_f32(&self, m: &Matrix<f32>) -> (f32, f32) {
        let (rows, cols) = m.dim();
        (usize_to_f32(rows), usize_to_f32(cols))
    }
}

impl<C: SimilarityCombiner> SimilarityCombiner for &C {
    fn combine(&self, m: &Matrix<f32>) -> f32 {
        (*self).combine(m)
    }
}

/// Default implementations for combining similarity scores
/// for comparison of 2 sets of terms
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardCombiner {
    /// funSimAvg algorithm from [Schlicker A, et. al., BMC Bioinf (2006)](https://pubmed.ncbi.nlm.nih.gov/16776819/)
    #[default]
    FunSimAvg,
    /// funSimMax algorithm from [Schlicker A, et. al., BMC Bioinf (2006)](https://pubmed.ncbi.nlm.nih.gov/16776819/)
    FunSimMax,
    /// Best-match average from [Wang JZ, et. al., Bioinformatics (2007)](https://pubmed.ncbi.nlm.nih.gov/17344234/)
    Bma,
}

impl TryFrom<&str> for StandardCombiner {
    type Error = NcdaError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "funsimavg" => Ok(StandardCombiner::FunSimAvg),
            "funsimmax" => Ok(StandardCombiner::FunSimMax),
            "bma" | "bwa" => Ok(StandardCombiner::Bma),
            _ => Err(NcdaError::InvalidInput(format!(
                "unknown combination method: {value}"
            ))),
        }
    }
}

impl StandardCombiner {
    fn fun_sim_avg(&self, m: &Matrix<f32>) -> f32 {
        let (rows, cols) = self.dim_f32(m);
        let row_maxes = self.row_maxes(m);
        let col_maxes = self.col_maxes(m);
        let mut nom = row_maxes.iter().sum::<f32>() / rows;
        nom += col_maxes.iter().sum::<f32>() / cols;

        nom / 2.0
    }

    fn fun_sim_max(&self, m: &Matrix<f32>) -> f32 {
        let (rows, cols) = self.dim_f32(m);
        let row_maxes = self.row_maxes(m);
        let col_maxes = self.col_maxes(m);

        (row_maxes.iter().sum::<f32>() / rows).max(col_maxes.iter().sum::<f32>() / cols)
    }

    fn bma(&self, m: &Matrix<f32>) -> f32 {
        let (rows, cols) = self.dim_f32(m);
        let row_maxes = self.row_maxes(m);
        let col_maxes = self.col_maxes(m);

        (row_maxes.iter().sum::<f32>() + col_maxes.iter().sum::<f32>()) / (rows + cols)
    }
}

impl SimilarityCombiner for StandardCombiner {
    fn combine(&self, m: &Matrix<f32>) -> f32 {
        match self {
            StandardCombiner::FunSimAvg => self.fun_sim_avg(m),
            StandardCombiner::FunSimMax => self.fun_sim_max(m),
            StandardCombiner::Bma => self.bma(m),
        }
    }
}

/// Calculates the Similarity score between two sets of Disease Ontology terms
pub struct GroupSimilarity<T, C> {
    combiner: C,
    similarity: T,
}

impl<T: Similarity, C: SimilarityCombiner> GroupSimilarity<T, C> {
    /// Constructs a new `GroupSimilarity`
    ///
    /// # Examples
    ///
    /// ```
    /// use ncda::similarity::{GraphIc, GroupSimilarity, StandardCombiner};
    /// use ncda::term::InformationContentKind;
    ///
    /// let graphic = GraphIc::new(InformationContentKind::Intrinsic);
    /// let sim = GroupSimilarity::new(StandardCombiner::FunSimAvg, graphic);
    /// ```
    pub fn new(combiner: C, similarity: T) -> Self {
        Self {
            combiner,
            similarity,
        }
    }

    /// calculates the similarity between two sets of terms
    pub fn calculate(&self, a: &DoSet, b: &DoSet) -> f32 {
        let mut v = Vec::with_capacity(a.len() * b.len());
        let mut rows = 0;
        let mut cols = 0;
        for t1 in a {
            rows += 1;
            cols = 0;
            for t2 in b {
                cols += 1;
                v.push(self.similarity.calculate(&t1, &t2));
            }
        }
        let m = Matrix::new(rows, cols, &v);
        self.combiner.calculate(&m)
    }
}

impl<T: Similarity> Similarity for &T {
    fn calculate(&self, a: &DoTerm, b: &DoTerm) -> f32 {
        (*self).calculate(a, b)
    }
}

impl Default for GroupSimilarity<Builtins, StandardCombiner> {
    fn default() -> Self {
        Self {
            combiner: StandardCombiner::default(),
            similarity: Builtins::default(),
        }
    }
}

/// Calculates the disease - disease semantic similarity of all diseases of the [`Ontology`]
///
/// The result is a symmetric matrix in the insertion order of the diseases,
/// with `1.0` on the diagonal and all values clamped to `[0, 1]`. Diseases
/// without any mapped terms have a similarity of `0.0` to all other diseases.
///
/// Disease pairs are scored in parallel.
///
/// # Examples
///
/// ```
/// use ncda::Ontology;
/// use ncda::similarity::{disease_similarity_matrix, Builtins, StandardCombiner};
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("disease".to_string(), 4u32);
/// ontology.insert_term("cancer".to_string(), 162u32);
/// ontology.add_parent(4u32, 162u32).unwrap();
/// ontology.create_cache().unwrap();
///
/// let cancer = ontology.add_disease("Neoplasms").unwrap();
/// ontology.annotate_disease(cancer, 162u32).unwrap();
/// ontology.add_disease("Unmapped").unwrap();
/// ontology.calculate_information_content().unwrap();
///
/// let m = disease_similarity_matrix(&ontology, &Builtins::default(), &StandardCombiner::default());
/// assert_eq!(m.dim(), (2, 2));
/// assert_eq!(m.get(0, 1), Some(0.0));
/// assert_eq!(m.get(1, 1), Some(1.0));
/// ```
pub fn disease_similarity_matrix<S, C>(
    ontology: &Ontology,
    similarity: &S,
    combiner: &C,
) -> LabeledMatrix
where
    S: Similarity + Sync,
    C: SimilarityCombiner + Sync,
{
    let labels: Vec<String> = ontology.diseases().map(|d| d.name().to_string()).collect();
    let sets: Vec<DoSet> = ontology
        .diseases()
        .map(|disease| disease.to_do_set(ontology))
        .collect();
    info!("Calculating semantic similarity of {} diseases", sets.len());

    let pairs = upper_triangle(sets.len());
    let scores: Vec<f32> = pairs
        .par_iter()
        .map(|(i, j)| {
            sets[*i]
                .similarity(&sets[*j], similarity, combiner)
                .clamp(0.0, 1.0)
        })
        .collect();
    debug!("Scored {} disease pairs", scores.len());

    let mut matrix = LabeledMatrix::identity(labels);
    for ((i, j), score) in pairs.into_iter().zip(scores) {
        matrix.set(i, j, score);
        matrix.set(j, i, score);
    }
    matrix
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn combiners() {
        let data = vec![1.0, 0.2, 0.4, 0.6, 0.5, 0.3];
        let m = Matrix::new(2, 3, &data);
        // row maxes: 1.0, 0.6 / col maxes: 1.0, 0.5, 0.4
        let avg = StandardCombiner::FunSimAvg.calculate(&m);
        assert!((avg - (0.8 + 1.9 / 3.0) / 2.0).abs() < 1e-6);

        let max = StandardCombiner::FunSimMax.calculate(&m);
        assert!((max - 0.8).abs() < 1e-6);

        let bma = StandardCombiner::Bma.calculate(&m);
        assert!((bma - 3.5 / 5.0).abs() < 1e-6);
    }

    #[test]
    fn empty_matrix() {
        let data: Vec<f32> = vec![];
        let m = Matrix::new(0, 0, &data);
        assert!(StandardCombiner::Bma.calculate(&m).abs() < f32::EPSILON);
    }

    #[test]
    fn combiner_from_str() {
        assert_eq!(
            StandardCombiner::try_from("FunSimMax").unwrap(),
            StandardCombiner::FunSimMax
        );
        assert_eq!(StandardCombiner::try_from("bma").unwrap(), StandardCombiner::Bma);
        assert!(StandardCombiner::try_from("avg").is_err());
    }

    #[test]
    fn builtins_from_str() {
        let kind = InformationContentKind::Annotation;
        assert!(matches!(
            Builtins::new("GraphIC", kind).unwrap(),
            Builtins::GraphIc(InformationContentKind::Annotation)
        ));
        assert!(matches!(Builtins::new("rel", kind).unwrap(), Builtins::Relevance(_)));
        assert!(matches!(Builtins::new("jc", kind).unwrap(), Builtins::Jc(_)));
    }
}
