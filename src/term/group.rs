use std::collections::HashSet;
use std::ops::{BitAnd, BitOr};

use crate::{DoTerm, DoTermId, Ontology};

/// A set of [`DoTermId`] representing a group of Disease Ontology terms
///
/// Each term can occur only once in the group and the ids are kept sorted,
/// so iteration order is deterministic.
///
/// This group is used e.g. for the parents, children or ancestors of a term
/// and for the terms annotated to a [`Disease`](crate::Disease).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoGroup {
    ids: Vec<DoTermId>,
}

impl DoGroup {
    /// Constructs a new, empty [`DoGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`DoGroup`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no [`DoTermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`DoTermId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`DoTermId`] to the group
    ///
    /// Returns whether the `DoTermId` was newly inserted.
    pub fn insert<I: Into<DoTermId>>(&mut self, id: I) -> bool {
        let id = id.into();
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Appends without checking order or uniqueness
    ///
    /// Callers must push ids in ascending order
    fn insert_unchecked(&mut self, id: DoTermId) {
        self.ids.push(id);
    }

    /// Returns `true` if the group contains the [`DoTermId`]
    pub fn contains(&self, id: &DoTermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`DoTermId`]s inside the group
    pub fn iter(&self) -> DoTermIds<'_> {
        DoTermIds::new(self.ids.iter())
    }

    /// Returns an Iterator of the [`DoTerm`]s of the group
    pub fn terms<'a>(&'a self, ontology: &'a Ontology) -> GroupTerms<'a> {
        GroupTerms {
            ids: self.ids.iter(),
            ontology,
        }
    }
}

impl From<HashSet<DoTermId>> for DoGroup {
    fn from(s: HashSet<DoTermId>) -> Self {
        let mut ids: Vec<DoTermId> = s.into_iter().collect();
        ids.sort_unstable();
        Self { ids }
    }
}

impl From<Vec<DoTermId>> for DoGroup {
    fn from(mut ids: Vec<DoTermId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }
}

impl FromIterator<DoTermId> for DoGroup {
    fn from_iter<T: IntoIterator<Item = DoTermId>>(iter: T) -> Self {
        let ids: Vec<DoTermId> = iter.into_iter().collect();
        ids.into()
    }
}

impl<'a> IntoIterator for &'a DoGroup {
    type Item = DoTermId;
    type IntoIter = DoTermIds<'a>;

    fn into_iter(self) -> DoTermIds<'a> {
        DoTermIds::new(self.ids.iter())
    }
}

/// An iterator over [`DoTermId`]s
pub struct DoTermIds<'a> {
    inner: std::slice::Iter<'a, DoTermId>,
}

impl<'a> DoTermIds<'a> {
    fn new(inner: std::slice::Iter<'a, DoTermId>) -> Self {
        Self { inner }
    }
}

impl<'a> Iterator for DoTermIds<'a> {
    type Item = DoTermId;
    fn next(&mut self) -> Option<DoTermId> {
        self.inner.next().copied()
    }
}

/// An iterator over the [`DoTerm`]s of a [`DoGroup`]
///
/// Ids that are not part of the ontology are skipped.
pub struct GroupTerms<'a> {
    ids: std::slice::Iter<'a, DoTermId>,
    ontology: &'a Ontology,
}

impl<'a> Iterator for GroupTerms<'a> {
    type Item = DoTerm<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        for id in self.ids.by_ref() {
            if let Some(term) = self.ontology.term(*id) {
                return Some(term);
            }
        }
        None
    }
}

impl BitOr for &DoGroup {
    type Output = DoGroup;

    fn bitor(self, rhs: &DoGroup) -> DoGroup {
        let mut group = DoGroup::with_capacity(self.len() + rhs.len());
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };

        for id in &large.ids {
            group.insert_unchecked(*id);
        }
        for id in &small.ids {
            group.insert(*id);
        }
        group
    }
}

impl BitAnd for &DoGroup {
    type Output = DoGroup;

    fn bitand(self, rhs: &DoGroup) -> DoGroup {
        let mut group = DoGroup::with_capacity(self.len().min(rhs.len()));
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };

        for id in &small.ids {
            if large.contains(id) {
                group.insert_unchecked(*id);
            }
        }
        group
    }
}
