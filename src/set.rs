//! A `DoSet` represents the Disease Ontology terms a disease is mapped to
use crate::similarity::{GroupSimilarity, Similarity, SimilarityCombiner};
use crate::term::{DoGroup, GroupTerms, InformationContent, InformationContentKind};
use crate::{DoTerm, DoTermId, Ontology};

/// A set of unique Disease Ontology terms
///
/// A [`DoSet`] typically holds all terms a single disease is mapped to. Two
/// sets are compared with [`DoSet::similarity`], which is the basis of the
/// disease semantic similarity matrix.
///
/// # Examples
///
/// ```
/// use ncda::{DoSet, Ontology};
/// use ncda::term::{DoGroup, InformationContentKind};
/// use ncda::similarity::{Builtins, StandardCombiner};
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("disease".to_string(), 4u32);
/// ontology.insert_term("cancer".to_string(), 162u32);
/// ontology.insert_term("breast cancer".to_string(), 1612u32);
/// ontology.add_parent(4u32, 162u32).unwrap();
/// ontology.add_parent(162u32, 1612u32).unwrap();
/// ontology.create_cache().unwrap();
/// ontology.calculate_information_content().unwrap();
///
/// let mut terms = DoGroup::new();
/// terms.insert(1612u32);
/// let set = DoSet::new(&ontology, terms);
///
/// let similarity = set.similarity(
///     &set,
///     &Builtins::GraphIc(InformationContentKind::Intrinsic),
///     &StandardCombiner::default(),
/// );
/// assert!((similarity - 1.0).abs() < f32::EPSILON);
/// ```
#[must_use]
pub struct DoSet<'a> {
    ontology: &'a Ontology,
    group: DoGroup,
}

impl<'a> DoSet<'a> {
    /// Constructs a [`DoSet`]
    pub fn new(ontology: &'a Ontology, group: DoGroup) -> Self {
        Self { ontology, group }
    }

    /// Returns a new `DoSet` that contains only the child-most terms
    ///
    /// Terms that are an ancestor of another term of the set are removed.
    pub fn child_nodes(&self) -> Self {
        let group = self
            .group
            .iter()
            .filter(|term1_id| {
                self.group.iter().all(|term2_id| {
                    self.ontology
                        .get(term2_id)
                        .map_or(true, |term| !term.all_parents().contains(term1_id))
                })
            })
            .collect();
        DoSet::new(self.ontology, group)
    }

    /// Returns a new `DoSet` in which obsolete terms are replaced
    ///
    /// Obsolete terms without replacement and terms unknown to the ontology
    /// are removed.
    pub fn with_replaced_obsolete(&self) -> Self {
        let group = self
            .group
            .iter()
            .filter_map(|id| self.ontology.resolve(id))
            .collect();
        DoSet::new(self.ontology, group)
    }

    /// Returns the number of terms in the set
    pub fn len(&self) -> usize {
        self.group.len()
    }

    /// Returns `true` if the set does not contain any terms
    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    /// Returns `true` if the set contains the term
    pub fn contains(&self, id: &DoTermId) -> bool {
        self.group.contains(id)
    }

    /// Returns the maximum [`InformationContent`] of all terms of the set
    pub fn information_content(&self) -> InformationContent {
        let mut ic = InformationContent::default();
        for term in self {
            ic.max_of(term.information_content());
        }
        ic
    }

    /// Returns the highest information content of the given kind
    pub fn max_information_content(&self, kind: &InformationContentKind) -> f32 {
        self.information_content().get_kind(kind)
    }

    /// Calculates the similarity to another [`DoSet`]
    ///
    /// An empty set has a similarity of `0.0` to every other set.
    pub fn similarity<S: Similarity, C: SimilarityCombiner>(
        &self,
        other: &DoSet,
        similarity: &S,
        combiner: &C,
    ) -> f32 {
        GroupSimilarity::new(combiner, similarity).calculate(self, other)
    }

    /// Returns an iterator of the [`DoTerm`]s of the set
    pub fn iter(&self) -> GroupTerms<'_> {
        self.group.terms(self.ontology)
    }
}

impl<'a> IntoIterator for &'a DoSet<'a> {
    type Item = DoTerm<'a>;
    type IntoIter = GroupTerms<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.group.terms(self.ontology)
    }
}
