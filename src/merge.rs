//! Merging the per-type ncRNA similarity matrices into one multi-view matrix
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{LabeledMatrix, NcdaError, NcdaResult, RnaKind};

/// How the per-type matrices are combined
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Square matrix with every per-type matrix as a block on the diagonal
    #[default]
    #[serde(alias = "block")]
    BlockDiagonal,
    /// One row per ncRNA, every row right-padded with zeros to the
    /// size of the largest per-type matrix
    Padded,
}

impl TryFrom<&str> for MergeStrategy {
    type Error = NcdaError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "block" | "blockdiagonal" => Ok(MergeStrategy::BlockDiagonal),
            "padded" | "pad" => Ok(MergeStrategy::Padded),
            _ => Err(NcdaError::InvalidInput(format!(
                "unknown merge strategy: {value}"
            ))),
        }
    }
}

/// The position of one [`RnaKind`] inside the merged matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// ncRNA type
    pub kind: RnaKind,
    /// first row of the block
    pub offset: usize,
    /// number of rows of the block
    pub size: usize,
}

/// The merged ncRNA similarity of all types
///
/// # Examples
///
/// ```
/// use ncda::merge::{MergeStrategy, MultiView};
/// use ncda::{LabeledMatrix, RnaKind};
///
/// let mirna = LabeledMatrix::identity(vec!["mir-1".to_string(), "mir-2".to_string()]);
/// let lncrna = LabeledMatrix::identity(vec!["lnc-1".to_string()]);
///
/// let view = MultiView::merge(
///     vec![(RnaKind::Mirna, mirna), (RnaKind::Lncrna, lncrna)],
///     MergeStrategy::BlockDiagonal,
/// ).unwrap();
///
/// assert_eq!(view.matrix().dim(), (3, 3));
/// assert_eq!(view.block(RnaKind::Lncrna).unwrap().offset, 2);
/// ```
#[derive(Debug, Clone)]
pub struct MultiView {
    matrix: LabeledMatrix,
    blocks: Vec<Block>,
    strategy: MergeStrategy,
}

impl MultiView {
    /// Merges the per-type matrices
    ///
    /// The matrices are ordered by [`RnaKind`], independent of the order
    /// they are passed in.
    ///
    /// # Errors
    ///
    /// - [`NcdaError::InvalidInput`] if a kind is given twice, a matrix
    ///   is not square or an ncRNA identifier appears in more than one type
    pub fn merge(
        mut matrices: Vec<(RnaKind, LabeledMatrix)>,
        strategy: MergeStrategy,
    ) -> NcdaResult<Self> {
        matrices.sort_by_key(|(kind, _)| *kind);

        let mut kinds = HashSet::new();
        let mut labels = HashSet::new();
        for (kind, matrix) in &matrices {
            if !kinds.insert(*kind) {
                return Err(NcdaError::InvalidInput(format!(
                    "{kind} similarity matrix given twice"
                )));
            }
            if matrix.nrows() != matrix.ncols() {
                return Err(NcdaError::InvalidInput(format!(
                    "{kind} similarity matrix is not square"
                )));
            }
            for label in matrix.row_labels() {
                if !labels.insert(label.as_str()) {
                    return Err(NcdaError::InvalidInput(format!(
                        "duplicate ncRNA identifier {label}"
                    )));
                }
            }
        }

        let mut blocks = Vec::with_capacity(matrices.len());
        let mut offset = 0;
        for (kind, matrix) in &matrices {
            blocks.push(Block {
                kind: *kind,
                offset,
                size: matrix.nrows(),
            });
            offset += matrix.nrows();
        }
        let total = offset;

        let row_labels: Vec<String> = matrices
            .iter()
            .flat_map(|(_, m)| m.row_labels().iter().cloned())
            .collect();

        let matrix = match strategy {
            MergeStrategy::BlockDiagonal => {
                let mut merged = LabeledMatrix::zeros(row_labels.clone(), row_labels);
                for (block, (_, m)) in blocks.iter().zip(&matrices) {
                    for i in 0..block.size {
                        for j in 0..block.size {
                            merged.set(block.offset + i, block.offset + j, m.data()[i * block.size + j]);
                        }
                    }
                }
                merged
            }
            MergeStrategy::Padded => {
                let width = blocks.iter().map(|b| b.size).max().unwrap_or(0);
                let col_labels: Vec<String> = (0..width).map(|i| format!("f{i}")).collect();
                let mut merged = LabeledMatrix::zeros(row_labels, col_labels);
                for (block, (_, m)) in blocks.iter().zip(&matrices) {
                    for i in 0..block.size {
                        for j in 0..block.size {
                            merged.set(block.offset + i, j, m.data()[i * block.size + j]);
                        }
                    }
                }
                merged
            }
        };

        info!(
            "Merged {} ncRNA types into a {}x{} matrix",
            blocks.len(),
            matrix.nrows(),
            matrix.ncols()
        );
        debug_assert_eq!(matrix.nrows(), total);
        Ok(Self {
            matrix,
            blocks,
            strategy,
        })
    }

    /// The merged matrix
    pub fn matrix(&self) -> &LabeledMatrix {
        &self.matrix
    }

    /// Consumes the view and returns the merged matrix
    pub fn into_matrix(self) -> LabeledMatrix {
        self.matrix
    }

    /// The blocks of all merged types, in merge order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the block of a single type
    pub fn block(&self, kind: RnaKind) -> Option<&Block> {
        self.blocks.iter().find(|b| b.kind == kind)
    }

    /// The strategy used to merge the matrices
    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// The ncRNA identifiers, in merged order
    pub fn labels(&self) -> &[String] {
        self.matrix.row_labels()
    }
}
