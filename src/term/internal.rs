use crate::disease::{DiseaseId, Diseases};
use crate::term::{DoGroup, DoTermId, InformationContent};
use crate::{DEFAULT_NUM_ALL_PARENTS, DEFAULT_NUM_DISEASES, DEFAULT_NUM_PARENTS};

#[derive(Debug)]
pub(crate) struct DoTermInternal {
    id: DoTermId,
    name: String,
    parents: DoGroup,
    all_parents: DoGroup,
    children: DoGroup,
    descendants: usize,
    diseases: Diseases,
    ic: InformationContent,
    obsolete: bool,
    replacement: Option<DoTermId>,
}

impl DoTermInternal {
    pub fn new(name: String, id: DoTermId) -> DoTermInternal {
        DoTermInternal {
            id,
            name,
            parents: DoGroup::with_capacity(DEFAULT_NUM_PARENTS),
            all_parents: DoGroup::with_capacity(DEFAULT_NUM_ALL_PARENTS),
            children: DoGroup::with_capacity(DEFAULT_NUM_PARENTS),
            descendants: 0,
            diseases: Diseases::with_capacity(DEFAULT_NUM_DISEASES),
            ic: InformationContent::default(),
            obsolete: false,
            replacement: None,
        }
    }

    pub fn id(&self) -> &DoTermId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &DoGroup {
        &self.parents
    }

    pub fn children(&self) -> &DoGroup {
        &self.children
    }

    pub fn all_parents(&self) -> &DoGroup {
        &self.all_parents
    }

    pub fn all_parents_mut(&mut self) -> &mut DoGroup {
        &mut self.all_parents
    }

    pub fn descendants(&self) -> usize {
        self.descendants
    }

    pub fn descendants_mut(&mut self) -> &mut usize {
        &mut self.descendants
    }

    pub fn diseases(&self) -> &Diseases {
        &self.diseases
    }

    /// All parents are cached once `all_parents` is populated. Root terms
    /// have no parents and are always considered cached.
    pub fn parents_cached(&self) -> bool {
        if self.parents.is_empty() {
            true
        } else {
            !self.all_parents.is_empty()
        }
    }

    pub fn add_parent<I: Into<DoTermId>>(&mut self, parent_id: I) {
        self.parents.insert(parent_id);
    }

    pub fn add_child<I: Into<DoTermId>>(&mut self, child_id: I) {
        self.children.insert(child_id);
    }

    pub fn add_disease(&mut self, disease_id: DiseaseId) -> bool {
        self.diseases.insert(disease_id)
    }

    pub fn information_content(&self) -> &InformationContent {
        &self.ic
    }

    pub fn information_content_mut(&mut self) -> &mut InformationContent {
        &mut self.ic
    }

    pub fn obsolete(&self) -> bool {
        self.obsolete
    }

    pub fn obsolete_mut(&mut self) -> &mut bool {
        &mut self.obsolete
    }

    pub fn replacement(&self) -> Option<DoTermId> {
        self.replacement
    }

    pub fn replacement_mut(&mut self) -> &mut Option<DoTermId> {
        &mut self.replacement
    }
}

impl PartialEq for DoTermInternal {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DoTermInternal {}
