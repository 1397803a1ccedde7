use std::collections::HashMap;

use crate::term::internal::DoTermInternal;
use crate::DoTermId;

/// Owns all terms of the ontology in insertion order
///
/// Lookups go through an id -> position index, iteration follows the
/// insertion order, which keeps every downstream calculation deterministic.
#[derive(Default)]
pub(crate) struct Arena {
    terms: Vec<DoTermInternal>,
    ids: HashMap<DoTermId, usize>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Inserts a new term or replaces an existing term with the same id
    pub fn insert(&mut self, term: DoTermInternal) {
        let id = *term.id();
        match self.ids.get(&id) {
            Some(&idx) => self.terms[idx] = term,
            None => {
                self.ids.insert(id, self.terms.len());
                self.terms.push(term);
            }
        }
    }

    pub fn get(&self, id: DoTermId) -> Option<&DoTermInternal> {
        self.ids.get(&id).map(|&idx| &self.terms[idx])
    }

    /// # Panics
    ///
    /// Panics if the term is not present. Only used for ids that
    /// were obtained from the arena itself.
    pub fn get_unchecked(&self, id: DoTermId) -> &DoTermInternal {
        self.get(id).expect("term must be present in the arena")
    }

    pub fn get_mut(&mut self, id: DoTermId) -> Option<&mut DoTermInternal> {
        match self.ids.get(&id) {
            Some(&idx) => Some(&mut self.terms[idx]),
            None => None,
        }
    }

    pub fn get_unchecked_mut(&mut self, id: DoTermId) -> &mut DoTermInternal {
        self.get_mut(id).expect("term must be present in the arena")
    }

    pub fn contains(&self, id: DoTermId) -> bool {
        self.ids.contains_key(&id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DoTermInternal> {
        self.terms.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, DoTermInternal> {
        self.terms.iter_mut()
    }

    pub fn keys(&self) -> Vec<DoTermId> {
        self.terms.iter().map(|term| *term.id()).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn insert_keeps_order() {
        let mut arena = Arena::default();
        arena.insert(DoTermInternal::new("b".to_string(), 20u32.into()));
        arena.insert(DoTermInternal::new("a".to_string(), 10u32.into()));
        arena.insert(DoTermInternal::new("c".to_string(), 30u32.into()));
        assert_eq!(
            arena.keys(),
            vec![DoTermId::from(20u32), DoTermId::from(10u32), DoTermId::from(30u32)]
        );
    }

    #[test]
    fn insert_replaces() {
        let mut arena = Arena::default();
        arena.insert(DoTermInternal::new("old".to_string(), 10u32.into()));
        arena.insert(DoTermInternal::new("new".to_string(), 10u32.into()));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get_unchecked(10u32.into()).name(), "new");
        assert!(arena.get(11u32.into()).is_none());
    }
}
