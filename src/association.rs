//! Curated ncRNA - disease associations and the binary adjacency matrix
use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::{parser, LabeledMatrix, NcdaError, NcdaResult};

/// A single known ncRNA - disease association
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Association {
    rna: String,
    disease: String,
}

impl Association {
    /// Constructs a new association
    pub fn new(rna: &str, disease: &str) -> Self {
        Self {
            rna: rna.trim().to_string(),
            disease: disease.trim().to_string(),
        }
    }

    /// The ncRNA identifier
    pub fn rna(&self) -> &str {
        &self.rna
    }

    /// The disease name
    pub fn disease(&self) -> &str {
        &self.disease
    }
}

/// Unique associations in first-seen order
///
/// # Examples
///
/// ```
/// use ncda::{Association, AssociationSet};
///
/// let mut set = AssociationSet::default();
/// assert!(set.insert(Association::new("hsa-mir-21", "Breast Neoplasms")));
/// assert!(!set.insert(Association::new("hsa-mir-21", "Breast Neoplasms")));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct AssociationSet {
    records: Vec<Association>,
    seen: HashSet<Association>,
}

impl AssociationSet {
    /// Reads all associations of a CSV file with the columns `rna,disease`
    ///
    /// Duplicate rows are collapsed.
    ///
    /// # Errors
    ///
    /// - [`NcdaError::CannotOpenFile`] if the file can't be opened
    /// - [`NcdaError::InvalidInput`] for malformed rows
    pub fn from_csv<P: AsRef<Path>>(path: P) -> NcdaResult<Self> {
        let mut set = Self::default();
        parser::associations::parse(path, &mut set)?;
        Ok(set)
    }

    /// Adds an association
    ///
    /// Returns `true` if the association was not present before
    pub fn insert(&mut self, association: Association) -> bool {
        if self.seen.contains(&association) {
            return false;
        }
        self.seen.insert(association.clone());
        self.records.push(association);
        true
    }

    /// Number of unique associations
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no associations
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if the association is present
    pub fn contains(&self, association: &Association) -> bool {
        self.seen.contains(association)
    }

    /// Returns the association at `index`
    pub fn get(&self, index: usize) -> Option<&Association> {
        self.records.get(index)
    }

    /// Iterates all associations in first-seen order
    pub fn iter(&self) -> std::slice::Iter<'_, Association> {
        self.records.iter()
    }

    /// Returns the unique ncRNA identifiers, in first-seen order
    pub fn rna_ids(&self) -> Vec<String> {
        unique(self.records.iter().map(Association::rna))
    }

    /// Returns the unique disease names, in first-seen order
    pub fn disease_ids(&self) -> Vec<String> {
        unique(self.records.iter().map(Association::disease))
    }
}

impl<'a> IntoIterator for &'a AssociationSet {
    type Item = &'a Association;
    type IntoIter = std::slice::Iter<'a, Association>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn unique<'a, I: Iterator<Item = &'a str>>(iter: I) -> Vec<String> {
    let mut seen = HashSet::new();
    iter.filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Binary ncRNA x disease matrix of known associations
///
/// Rows are ncRNAs, columns are diseases. An entry is `1.0` if the
/// association is known and `0.0` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyMatrix {
    matrix: LabeledMatrix,
}

fn locate(matrix: &LabeledMatrix, associations: &AssociationSet) -> NcdaResult<Vec<(usize, usize)>> {
    let rows = matrix.row_lookup();
    let cols = matrix.col_lookup();
    associations
        .iter()
        .map(|association| {
            let row = rows
                .get(association.rna())
                .ok_or_else(|| NcdaError::UnknownIdentifier(association.rna().to_string()))?;
            let col = cols
                .get(association.disease())
                .ok_or_else(|| NcdaError::UnknownIdentifier(association.disease().to_string()))?;
            Ok((*row, *col))
        })
        .collect()
}

impl AdjacencyMatrix {
    /// Builds the adjacency matrix for the given ncRNA and disease labels
    ///
    /// # Errors
    ///
    /// [`NcdaError::UnknownIdentifier`] if an association names an ncRNA or
    /// disease that is not part of the labels
    pub fn from_associations(
        associations: &AssociationSet,
        rna_labels: Vec<String>,
        disease_labels: Vec<String>,
    ) -> NcdaResult<Self> {
        let mut matrix = LabeledMatrix::zeros(rna_labels, disease_labels);
        let positions = locate(&matrix, associations)?;
        for (row, col) in positions {
            matrix.set(row, col, 1.0);
        }
        info!(
            "Built {}x{} adjacency matrix with {} associations",
            matrix.nrows(),
            matrix.ncols(),
            associations.len()
        );
        Ok(Self { matrix })
    }

    /// Returns the `(row, col)` position of every association, in record order
    ///
    /// # Errors
    ///
    /// [`NcdaError::UnknownIdentifier`] if an association is not part of the matrix
    pub fn record_positions(&self, associations: &AssociationSet) -> NcdaResult<Vec<(usize, usize)>> {
        locate(&self.matrix, associations)
    }

    /// Builds the adjacency matrix with the ncRNAs and diseases of the associations
    pub fn from_records(associations: &AssociationSet) -> Self {
        let mut matrix = LabeledMatrix::zeros(associations.rna_ids(), associations.disease_ids());
        let rows = matrix.row_lookup();
        let cols = matrix.col_lookup();
        let positions: Vec<(usize, usize)> = associations
            .iter()
            .filter_map(|a| Some((*rows.get(a.rna())?, *cols.get(a.disease())?)))
            .collect();
        for (row, col) in positions {
            matrix.set(row, col, 1.0);
        }
        Self { matrix }
    }

    /// Wraps an existing binary matrix, e.g. one read from disk
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if the matrix contains values other than `0` and `1`
    pub fn try_from_matrix(matrix: LabeledMatrix) -> NcdaResult<Self> {
        if matrix.data().iter().any(|v| *v != 0.0 && *v != 1.0) {
            return Err(NcdaError::InvalidInput(
                "adjacency matrix must be binary".to_string(),
            ));
        }
        Ok(Self { matrix })
    }

    /// Reads the adjacency matrix from a CSV file
    ///
    /// # Errors
    ///
    /// See [`LabeledMatrix::from_csv`] and [`AdjacencyMatrix::try_from_matrix`]
    pub fn from_csv<P: AsRef<Path>>(path: P) -> NcdaResult<Self> {
        Self::try_from_matrix(LabeledMatrix::from_csv(path)?)
    }

    /// The underlying matrix
    pub fn matrix(&self) -> &LabeledMatrix {
        &self.matrix
    }

    /// Number of known associations
    pub fn count(&self) -> usize {
        self.matrix.data().iter().filter(|v| **v > 0.0).count()
    }

    /// Returns `true` if the association of `row` and `col` is known
    pub fn is_known(&self, row: usize, col: usize) -> bool {
        self.matrix.get(row, col).is_some_and(|v| v > 0.0)
    }

    /// Returns the `(row, col)` positions of all known associations, row-major
    pub fn positives(&self) -> Vec<(usize, usize)> {
        self.positions(|v| v > 0.0)
    }

    /// Returns the `(row, col)` positions of all unknown pairs, row-major
    pub fn unknown(&self) -> Vec<(usize, usize)> {
        self.positions(|v| v == 0.0)
    }

    fn positions<F: Fn(f32) -> bool>(&self, filter: F) -> Vec<(usize, usize)> {
        let ncols = self.matrix.ncols();
        self.matrix
            .data()
            .iter()
            .enumerate()
            .filter(|(_, v)| filter(**v))
            .map(|(idx, _)| (idx / ncols, idx % ncols))
            .collect()
    }

    /// Writes the matrix as CSV
    ///
    /// # Errors
    ///
    /// See [`LabeledMatrix::to_csv`]
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> NcdaResult<()> {
        debug!("Writing adjacency matrix to {}", path.as_ref().display());
        self.matrix.to_csv(path)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn associations() -> AssociationSet {
        let mut set = AssociationSet::default();
        for (rna, disease) in [
            ("hsa-mir-21", "Breast Neoplasms"),
            ("hsa-mir-155", "Lymphoma"),
            ("hsa-mir-21", "Lymphoma"),
            ("hsa-mir-21", "Breast Neoplasms"),
        ] {
            set.insert(Association::new(rna, disease));
        }
        set
    }

    #[test]
    fn unique_records() {
        let set = associations();
        assert_eq!(set.len(), 3);
        assert_eq!(set.rna_ids(), vec!["hsa-mir-21", "hsa-mir-155"]);
        assert_eq!(set.disease_ids(), vec!["Breast Neoplasms", "Lymphoma"]);
    }

    #[test]
    fn positions_in_record_order() {
        let set = associations();
        let adj = AdjacencyMatrix::from_associations(
            &set,
            vec!["hsa-mir-155".to_string(), "hsa-mir-21".to_string()],
            vec!["Lymphoma".to_string(), "Breast Neoplasms".to_string()],
        )
        .unwrap();
        assert_eq!(
            adj.record_positions(&set).unwrap(),
            vec![(1, 1), (0, 0), (1, 0)]
        );

        let mut other = AssociationSet::default();
        other.insert(Association::new("hsa-mir-1", "Lymphoma"));
        assert!(matches!(
            adj.record_positions(&other),
            Err(NcdaError::UnknownIdentifier(_))
        ));
    }

    #[test]
    fn one_entry_per_record() {
        let set = associations();
        let adj = AdjacencyMatrix::from_records(&set);
        assert_eq!(adj.count(), set.len());
        assert!((adj.matrix().sum() - 3.0).abs() < f32::EPSILON);
        assert!(adj.is_known(1, 1));
        assert!(!adj.is_known(1, 0));
        assert_eq!(adj.unknown(), vec![(1, 0)]);
        assert_eq!(adj.positives(), vec![(0, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn given_labels() {
        let set = associations();
        let rnas = vec!["hsa-mir-1".to_string(), "hsa-mir-155".to_string(), "hsa-mir-21".to_string()];
        let diseases = vec!["Lymphoma".to_string(), "Breast Neoplasms".to_string()];
        let adj = AdjacencyMatrix::from_associations(&set, rnas, diseases).unwrap();
        assert_eq!(adj.matrix().dim(), (3, 2));
        assert_eq!(adj.matrix().row(0), Some(&[0.0, 0.0][..]));
        assert_eq!(adj.matrix().row(2), Some(&[1.0, 1.0][..]));
    }

    #[test]
    fn unknown_identifier() {
        let set = associations();
        let res = AdjacencyMatrix::from_associations(
            &set,
            vec!["hsa-mir-21".to_string()],
            vec!["Breast Neoplasms".to_string(), "Lymphoma".to_string()],
        );
        assert!(matches!(res, Err(NcdaError::UnknownIdentifier(id)) if id == "hsa-mir-155"));
    }

    #[test]
    fn non_binary_matrix() {
        let m = LabeledMatrix::identity(vec!["a".to_string()]);
        assert!(AdjacencyMatrix::try_from_matrix(m).is_ok());
        let m = LabeledMatrix::new(vec!["a".to_string()], vec!["b".to_string()], vec![0.5]).unwrap();
        assert!(AdjacencyMatrix::try_from_matrix(m).is_err());
    }
}
