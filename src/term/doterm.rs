use std::collections::HashMap;

use crate::similarity::Similarity;
use crate::term::group::GroupTerms;
use crate::term::internal::DoTermInternal;
use crate::term::{DoGroup, DoTermId, InformationContent};
use crate::{NcdaError, NcdaResult, Ontology};

/// A single Disease Ontology term
///
/// `DoTerm` is a cheap, copyable view into the [`Ontology`], it borrows all
/// data from it.
#[derive(Debug, Clone, Copy)]
pub struct DoTerm<'a> {
    id: &'a DoTermId,
    name: &'a str,
    parents: &'a DoGroup,
    all_parents: &'a DoGroup,
    children: &'a DoGroup,
    descendants: usize,
    n_diseases: usize,
    information_content: &'a InformationContent,
    obsolete: bool,
    replacement: Option<DoTermId>,
    ontology: &'a Ontology,
}

impl<'a> DoTerm<'a> {
    /// Constructs a new [`DoTerm`]
    ///
    /// # Errors
    ///
    /// [`NcdaError::DoesNotExist`] if the term is not part of the ontology
    pub fn try_new<I: Into<DoTermId>>(ontology: &'a Ontology, term: I) -> NcdaResult<DoTerm<'a>> {
        let term = ontology.get(term).ok_or(NcdaError::DoesNotExist)?;
        Ok(DoTerm::new(ontology, term))
    }

    pub(crate) fn new(ontology: &'a Ontology, term: &'a DoTermInternal) -> DoTerm<'a> {
        DoTerm {
            id: term.id(),
            name: term.name(),
            parents: term.parents(),
            all_parents: term.all_parents(),
            children: term.children(),
            descendants: term.descendants(),
            n_diseases: term.diseases().len(),
            information_content: term.information_content(),
            obsolete: term.obsolete(),
            replacement: term.replacement(),
            ontology,
        }
    }

    /// Returns the [`DoTermId`] of the term, e.g. `DOID:1324`
    pub fn id(&self) -> &DoTermId {
        self.id
    }

    /// Returns the name of the term, e.g. `lung cancer`
    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns an iterator of the direct parents of the term
    pub fn parents(&self) -> GroupTerms<'a> {
        self.parents.terms(self.ontology)
    }

    /// Returns the [`DoTermId`]s of the direct parents
    pub fn parent_ids(&self) -> &DoGroup {
        self.parents
    }

    /// Returns the [`DoTermId`]s of all direct and indirect parents
    pub fn all_parent_ids(&self) -> &DoGroup {
        self.all_parents
    }

    /// Returns an iterator of all direct and indirect parents
    pub fn all_parents(&self) -> GroupTerms<'a> {
        self.all_parents.terms(self.ontology)
    }

    /// Returns an iterator of the direct children of the term
    pub fn children(&self) -> GroupTerms<'a> {
        self.children.terms(self.ontology)
    }

    /// Returns the [`DoTermId`]s of the direct children
    pub fn children_ids(&self) -> &DoGroup {
        self.children
    }

    /// Number of direct and indirect descendants
    pub fn descendant_count(&self) -> usize {
        self.descendants
    }

    /// Number of diseases annotated to the term or its descendants
    pub fn disease_count(&self) -> usize {
        self.n_diseases
    }

    /// Returns the common ancestors of `self` and `other`
    ///
    /// If one term is an ancestor of the other, it is included as well
    pub fn common_ancestor_ids(&self, other: &DoTerm) -> DoGroup {
        let mut res = self.all_parent_ids() & other.all_parent_ids();

        if other.all_parent_ids().contains(self.id()) {
            res.insert(*self.id());
        }

        if self.all_parent_ids().contains(other.id()) {
            res.insert(*other.id());
        }
        res
    }

    /// Returns all ancestors of `self` and `other`
    pub fn union_ancestor_ids(&self, other: &DoTerm) -> DoGroup {
        self.all_parent_ids() | other.all_parent_ids()
    }

    /// Returns the common ancestors, including the terms themselves
    pub fn all_common_ancestor_ids(&self, other: &DoTerm) -> DoGroup {
        &self.self_and_ancestors() & &other.self_and_ancestors()
    }

    /// Returns all ancestors of both terms, including the terms themselves
    pub fn all_union_ancestor_ids(&self, other: &DoTerm) -> DoGroup {
        &self.self_and_ancestors() | &other.self_and_ancestors()
    }

    fn self_and_ancestors(&self) -> DoGroup {
        let mut group = self.all_parents.clone();
        group.insert(*self.id);
        group
    }

    /// Returns the [`InformationContent`] of the term
    pub fn information_content(&self) -> &InformationContent {
        self.information_content
    }

    /// Returns `true` if the term is flagged as obsolete
    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    /// Returns the replacement term of an obsolete term, if any
    pub fn replaced_by(&self) -> Option<DoTermId> {
        self.replacement
    }

    /// Calculates the similarity of `self` and `other` using the provided `Similarity` algorithm
    pub fn similarity_score(&self, other: &DoTerm, similarity: &impl Similarity) -> f32 {
        similarity.calculate(self, other)
    }

    /// Returns `true` if `self` is a child (direct or indirect) of `other`
    pub fn child_of(&self, other: &DoTerm) -> bool {
        self.all_parent_ids().contains(other.id())
    }

    /// Returns `true` if `self` is a parent (direct or indirect) of `other`
    pub fn parent_of(&self, other: &DoTerm) -> bool {
        other.child_of(self)
    }

    /// Returns the distance (steps) from `self` to `other`, if `other` is a parent of `self`
    pub fn distance_to_ancestor(&self, other: &DoTerm) -> Option<usize> {
        if self.id() == other.id() {
            return Some(0);
        }
        if self.parent_ids().contains(other.id()) {
            return Some(1);
        }
        if !self.all_parent_ids().contains(other.id()) {
            return None;
        }
        self.parents()
            .filter_map(|p| p.distance_to_ancestor(other))
            .min()
            .map(|c| c + 1)
    }

    /// Returns the semantic contribution of the term and each of its ancestors
    ///
    /// The term itself contributes `1.0`, each ancestor contributes the maximum
    /// over its children (within the ancestor graph) of `weight * contribution(child)`.
    /// This is the "semantic value" of Wang JZ, et. al., Bioinformatics (2007).
    ///
    /// The result is sorted by [`DoTermId`].
    pub fn semantic_contributions(&self, weight: f32) -> Vec<(DoTermId, f32)> {
        let mut values: HashMap<DoTermId, f32> = HashMap::with_capacity(self.all_parents.len() + 1);
        values.insert(*self.id, 1.0);
        let mut queue = vec![(*self, 1.0f32)];
        while let Some((term, value)) = queue.pop() {
            let candidate = weight * value;
            for parent in term.parents() {
                let known = values.entry(*parent.id()).or_insert(0.0);
                if candidate > *known {
                    *known = candidate;
                    queue.push((parent, candidate));
                }
            }
        }
        let mut res: Vec<(DoTermId, f32)> = values.into_iter().collect();
        res.sort_unstable_by_key(|(id, _)| *id);
        res
    }

    pub(crate) fn ontology(&self) -> &'a Ontology {
        self.ontology
    }
}

impl PartialEq for DoTerm<'_> {
    fn eq(&self, other: &DoTerm) -> bool {
        self.id == other.id
    }
}

impl Eq for DoTerm<'_> {}
