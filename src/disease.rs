//! Diseases as they appear in the curated association data
//!
//! A [`Disease`] is identified by its name (the identifier used in the
//! association file) and is mapped to one or more Disease Ontology terms.
//! Diseases without a mapped term are kept: they are part of the disease
//! similarity matrix but only similar to themselves.
use std::collections::HashSet;
use std::fmt::Display;

use crate::term::DoGroup;
use crate::{DoSet, DoTermId, Ontology};

/// A set of unique [`DiseaseId`]s
pub type Diseases = HashSet<DiseaseId>;

/// The identifier of a [`Disease`] within an [`Ontology`]
///
/// Ids are assigned in insertion order, starting at 0.
#[derive(Clone, Copy, Default, Debug, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub struct DiseaseId {
    inner: u32,
}

impl DiseaseId {
    /// Returns the position of the disease within the [`Ontology`]
    pub fn as_usize(&self) -> usize {
        self.inner as usize
    }
}

impl From<u32> for DiseaseId {
    fn from(inner: u32) -> Self {
        DiseaseId { inner }
    }
}

impl Display for DiseaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Disease:{}", self.inner)
    }
}

/// A disease and the Disease Ontology terms it maps to
#[derive(Default, Debug, Clone)]
pub struct Disease {
    id: DiseaseId,
    name: String,
    terms: DoGroup,
}

impl Disease {
    /// Initializes a new disease without any terms
    pub fn new(id: DiseaseId, name: &str) -> Disease {
        Self {
            id,
            name: name.to_string(),
            terms: DoGroup::default(),
        }
    }

    /// The unique [`DiseaseId`] of the disease
    pub fn id(&self) -> &DiseaseId {
        &self.id
    }

    /// The name of the disease, as used in the association data
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The set of Disease Ontology terms the disease maps to
    pub fn do_terms(&self) -> &DoGroup {
        &self.terms
    }

    /// Returns a [`DoSet`] of the mapped terms
    pub fn to_do_set<'a>(&self, ontology: &'a Ontology) -> DoSet<'a> {
        DoSet::new(ontology, self.terms.clone())
    }

    /// Maps the disease to a Disease Ontology term
    ///
    /// Returns `true` if the term was newly added
    pub fn add_term<I: Into<DoTermId>>(&mut self, term_id: I) -> bool {
        self.terms.insert(term_id)
    }
}

impl PartialEq for Disease {
    fn eq(&self, other: &Disease) -> bool {
        self.id == other.id
    }
}

impl Eq for Disease {}
