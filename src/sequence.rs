//! ncRNA types, sequences and per-type sequence sets
use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{parser, NcdaError, NcdaResult};

/// The four types of non-coding RNA
///
/// The order of the variants is the order of the blocks
/// in the merged ncRNA similarity matrix.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RnaKind {
    /// microRNA
    Mirna,
    /// piwi-interacting RNA
    Pirna,
    /// long non-coding RNA
    Lncrna,
    /// circular RNA
    Circrna,
}

impl RnaKind {
    /// All kinds, in merge order
    pub const ALL: [RnaKind; 4] = [
        RnaKind::Mirna,
        RnaKind::Pirna,
        RnaKind::Lncrna,
        RnaKind::Circrna,
    ];

    /// Returns the lowercase name, e.g. `mirna`
    pub fn as_str(&self) -> &'static str {
        match self {
            RnaKind::Mirna => "mirna",
            RnaKind::Pirna => "pirna",
            RnaKind::Lncrna => "lncrna",
            RnaKind::Circrna => "circrna",
        }
    }
}

impl TryFrom<&str> for RnaKind {
    type Error = NcdaError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "mirna" => Ok(RnaKind::Mirna),
            "pirna" => Ok(RnaKind::Pirna),
            "lncrna" => Ok(RnaKind::Lncrna),
            "circrna" => Ok(RnaKind::Circrna),
            _ => Err(NcdaError::InvalidInput(format!("unknown ncRNA type: {value}"))),
        }
    }
}

impl std::str::FromStr for RnaKind {
    type Err = NcdaError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl Display for RnaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ncRNA with its nucleotide sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RnaRecord {
    id: String,
    sequence: String,
}

impl RnaRecord {
    /// Constructs a new record
    ///
    /// The sequence is uppercased and all whitespace is removed
    pub fn new(id: &str, sequence: &str) -> Self {
        Self {
            id: id.trim().to_string(),
            sequence: sequence
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| c.to_ascii_uppercase())
                .collect(),
        }
    }

    /// The identifier used in the association data, e.g. `hsa-mir-21`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The nucleotide sequence
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// The nucleotide sequence as bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.sequence.as_bytes()
    }

    /// Number of nucleotides
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns `true` if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// All sequences of one [`RnaKind`], in file order
///
/// # Examples
///
/// ```
/// use ncda::{RnaKind, RnaRecord, SequenceSet};
///
/// let mut set = SequenceSet::new(RnaKind::Mirna);
/// set.push(RnaRecord::new("hsa-mir-21", "uagcuuaucagacugauguuga")).unwrap();
/// assert!(set.push(RnaRecord::new("hsa-mir-21", "ACGU")).is_err());
///
/// assert_eq!(set.len(), 1);
/// assert_eq!(set.get(0).unwrap().sequence(), "UAGCUUAUCAGACUGAUGUUGA");
/// ```
#[derive(Debug, Clone)]
pub struct SequenceSet {
    kind: RnaKind,
    records: Vec<RnaRecord>,
    ids: HashSet<String>,
}

impl SequenceSet {
    /// Constructs an empty set
    pub fn new(kind: RnaKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Reads all sequences of a CSV file with the columns `id,sequence`
    ///
    /// # Errors
    ///
    /// - [`NcdaError::CannotOpenFile`] if the file can't be opened
    /// - [`NcdaError::InvalidInput`] for malformed rows or duplicate identifiers
    pub fn from_csv<P: AsRef<Path>>(kind: RnaKind, path: P) -> NcdaResult<Self> {
        let mut set = Self::new(kind);
        parser::sequences::parse(path, &mut set)?;
        Ok(set)
    }

    /// Adds a record to the set
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if the identifier is already present
    pub fn push(&mut self, record: RnaRecord) -> NcdaResult<()> {
        if !self.ids.insert(record.id().to_string()) {
            return Err(NcdaError::InvalidInput(format!(
                "duplicate {} identifier: {}",
                self.kind,
                record.id()
            )));
        }
        self.records.push(record);
        Ok(())
    }

    /// The [`RnaKind`] of all records
    pub fn kind(&self) -> RnaKind {
        self.kind
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the set has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record at `index`
    pub fn get(&self, index: usize) -> Option<&RnaRecord> {
        self.records.get(index)
    }

    /// Returns the identifiers, in file order
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id().to_string()).collect()
    }

    /// Returns `true` if a record with this identifier exists
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Iterates all records
    pub fn iter(&self) -> std::slice::Iter<'_, RnaRecord> {
        self.records.iter()
    }

    /// Returns all records as a slice
    pub fn records(&self) -> &[RnaRecord] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a SequenceSet {
    type Item = &'a RnaRecord;
    type IntoIter = std::slice::Iter<'a, RnaRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(RnaKind::try_from("miRNA").unwrap(), RnaKind::Mirna);
        assert_eq!("circrna".parse::<RnaKind>().unwrap(), RnaKind::Circrna);
        assert!(RnaKind::try_from("snorna").is_err());
        assert_eq!(RnaKind::Lncrna.to_string(), "lncrna");
        assert_eq!(serde_json::to_string(&RnaKind::Pirna).unwrap(), "\"pirna\"");
    }

    #[test]
    fn record_normalization() {
        let r = RnaRecord::new(" piR-1 ", "acgu\nTTga ");
        assert_eq!(r.id(), "piR-1");
        assert_eq!(r.sequence(), "ACGUTTGA");
        assert_eq!(r.len(), 8);
        assert!(RnaRecord::new("x", " ").is_empty());
    }

    #[test]
    fn set_order() {
        let mut set = SequenceSet::new(RnaKind::Lncrna);
        set.push(RnaRecord::new("b", "A")).unwrap();
        set.push(RnaRecord::new("a", "C")).unwrap();
        assert_eq!(set.ids(), vec!["b".to_string(), "a".to_string()]);
        assert!(set.contains("a"));
        assert!(!set.contains("c"));
    }
}
