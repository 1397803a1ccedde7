use core::fmt::Debug;
use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::disease::{Disease, DiseaseId};
use crate::parser;
use crate::term::internal::DoTermInternal;
use crate::term::{DoGroup, DoTerm, InformationContent, InformationContentKind};
use crate::{DoTermId, NcdaError, NcdaResult};

mod termarena;
use termarena::Arena;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Ontology` holds the Disease Ontology and the diseases mapped onto it
///
/// The [`Ontology`] struct holds all [`DoTerm`]s, their `is_a` hierarchy and
/// all [`Disease`]s of the association data together with the terms they
/// map to. It is the input for the disease semantic similarity.
///
/// # Construction
///
/// 1. Download `doid.obo` from the [Disease Ontology](https://disease-ontology.org/)
/// 2. Prepare a CSV with the columns `disease,doid` that maps every disease
///    name of the association data to one (or more) DOIDs
/// 3. Use [`Ontology::from_files`]
///
/// You can also build it all by yourself, in which case you will have to:
/// 1. construct an empty Ontology [`Ontology::default`]
/// 2. Add all terms [`Ontology::insert_term`]
/// 3. Connect terms to their parents [`Ontology::add_parent`]
/// 4. Cache all ancestor connections [`Ontology::create_cache`]
/// 5. Add diseases [`Ontology::add_disease`] and map them to terms with
///    [`Ontology::annotate_disease`] (annotations are inherited by all ancestors)
/// 6. Calculate the information content [`Ontology::calculate_information_content`]
///
/// # Layout
///
/// ```mermaid
/// erDiagram
///     ONTOLOGY ||--|{ DOTERM : contains
///     DOTERM ||--|{ DOTERM : is_a
///     DOTERM }|--o{ DISEASE : annotated
///     DOTERM {
///         str name
///         DoTermId id
///         DoGroup parents
///         DoGroup children
///         Diseases diseases
///     }
///     DISEASE {
///         str name
///         DiseaseId id
///         DoGroup do_terms
///     }
/// ```
///
/// # Examples
///
/// ```
/// use ncda::Ontology;
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("disease".to_string(), 4u32);
/// ontology.insert_term("cancer".to_string(), 162u32);
/// ontology.add_parent(4u32, 162u32).unwrap();
/// ontology.create_cache().unwrap();
/// ontology.calculate_information_content().unwrap();
///
/// let cancer = ontology.term(162u32).unwrap();
/// assert_eq!(cancer.name(), "cancer");
/// assert_eq!(cancer.parents().next().unwrap().name(), "disease");
/// ```
#[derive(Default)]
pub struct Ontology {
    do_terms: Arena,
    diseases: Vec<Disease>,
    disease_names: HashMap<String, DiseaseId>,
    alt_ids: HashMap<DoTermId, DoTermId>,
    max_ic: InformationContent,
    version: String,
}

impl Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ontology with {} terms and {} diseases",
            self.do_terms.len(),
            self.diseases.len()
        )
    }
}

/// Public API of the Ontology
impl Ontology {
    /// Builds the [`Ontology`] from a `doid.obo` file and an optional
    /// disease to DOID mapping
    ///
    /// # Errors
    ///
    /// - obo or disease file not present or readable: [`NcdaError::CannotOpenFile`]
    /// - malformed lines: [`NcdaError::InvalidInput`]
    /// - the ontology contains a cycle: [`NcdaError::InvalidInput`]
    pub fn from_files<P: AsRef<Path>>(obo: P, diseases: Option<P>) -> NcdaResult<Self> {
        let mut ont = Ontology::default();
        parser::do_obo::read_obo_file(obo, &mut ont)?;
        if let Some(diseases) = diseases {
            parser::disease_records::parse(diseases, &mut ont)?;
        }
        ont.calculate_information_content()?;
        debug!("Built {:?}", ont);
        Ok(ont)
    }

    /// Builds the [`Ontology`] from a `doid.obo` file only
    ///
    /// # Errors
    ///
    /// See [`Ontology::from_files`]
    pub fn from_obo<P: AsRef<Path>>(obo: P) -> NcdaResult<Self> {
        Self::from_files(obo, None)
    }

    /// Returns the number of terms in the Ontology
    pub fn len(&self) -> usize {
        self.do_terms.len()
    }

    /// Returns `true` if the Ontology does not contain any terms
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the [`DoTerm`] of the provided [`DoTermId`]
    ///
    /// If no such term is present in the Ontology, `None` is returned
    pub fn term<I: Into<DoTermId>>(&self, term_id: I) -> Option<DoTerm<'_>> {
        DoTerm::try_new(self, term_id.into()).ok()
    }

    /// Returns an Iterator of all [`DoTerm`]s of the Ontology
    pub fn terms(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Returns the id of the term that should be used in place of `term_id`
    ///
    /// Alternative ids are mapped to their primary term and obsolete terms
    /// are replaced by their `replaced_by` term (if present).
    /// Returns `None` if the term is unknown or obsolete without replacement.
    pub fn resolve<I: Into<DoTermId>>(&self, term_id: I) -> Option<DoTermId> {
        let mut id = term_id.into();
        // replacement chains are short, the bound guards against loops
        for _ in 0..8 {
            if !self.do_terms.contains(id) {
                id = *self.alt_ids.get(&id)?;
            }
            let term = self.get(id)?;
            if !term.obsolete() {
                return Some(id);
            }
            id = term.replacement()?;
        }
        None
    }

    /// Returns a reference to the [`Disease`] of the provided [`DiseaseId`]
    pub fn disease(&self, disease_id: &DiseaseId) -> Option<&Disease> {
        self.diseases.get(disease_id.as_usize())
    }

    /// Returns the [`Disease`] with the provided name
    pub fn disease_by_name(&self, name: &str) -> Option<&Disease> {
        self.disease_names
            .get(name)
            .and_then(|id| self.disease(id))
    }

    /// Returns an Iterator of all [`Disease`]s, in insertion order
    pub fn diseases(&self) -> std::slice::Iter<'_, Disease> {
        self.diseases.iter()
    }

    /// Returns the number of diseases
    pub fn disease_count(&self) -> usize {
        self.diseases.len()
    }

    /// Returns the `data-version` of the OBO file, if present
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the maximum information content of any term
    pub fn max_information_content(&self, kind: &InformationContentKind) -> f32 {
        self.max_ic.get_kind(kind)
    }

    /// Returns the code to create a `Mermaid` flow diagram of the ontology
    ///
    /// This is meant for small ontologies, e.g. test data
    pub fn as_mermaid(&self) -> String {
        let mut code = String::new();
        code.push_str("graph TD\n");
        for term in self {
            code.push_str(&format!(
                "{}[\"{}<br>{}\"]\n",
                term.id(),
                term.id(),
                term.name()
            ));
            for child in term.children() {
                code.push_str(&format!("{} --> {}\n", term.id(), child.id()));
            }
        }
        code
    }
}

/// Methods to build the Ontology
impl Ontology {
    /// Inserts a new term into the ontology
    ///
    /// An existing term with the same id is replaced
    pub fn insert_term<I: Into<DoTermId>>(&mut self, name: String, id: I) {
        let term = DoTermInternal::new(name, id.into());
        self.do_terms.insert(term);
    }

    /// Registers `alt_id` as an alternative identifier of the term `primary`
    ///
    /// [`Ontology::resolve`] maps the alternative id to the primary term.
    ///
    /// # Errors
    ///
    /// - [`NcdaError::DoesNotExist`] if `primary` is not present
    /// - [`NcdaError::InvalidInput`] if `alt_id` is the id of a term itself
    pub fn add_alt_id<I: Into<DoTermId>, J: Into<DoTermId>>(
        &mut self,
        alt_id: I,
        primary: J,
    ) -> NcdaResult<()> {
        let alt_id = alt_id.into();
        let primary = primary.into();
        if !self.do_terms.contains(primary) {
            return Err(NcdaError::DoesNotExist);
        }
        if self.do_terms.contains(alt_id) {
            return Err(NcdaError::InvalidInput(format!(
                "{alt_id} is a term, not an alternative id of {primary}"
            )));
        }
        self.alt_ids.insert(alt_id, primary);
        Ok(())
    }

    /// Connects a child term to its parent
    ///
    /// # Errors
    ///
    /// [`NcdaError::DoesNotExist`] if either term is not present
    pub fn add_parent<I: Into<DoTermId> + Copy, J: Into<DoTermId> + Copy>(
        &mut self,
        parent_id: I,
        child_id: J,
    ) -> NcdaResult<()> {
        if !self.do_terms.contains(child_id.into()) {
            return Err(NcdaError::DoesNotExist);
        }
        self.get_mut(parent_id)
            .ok_or(NcdaError::DoesNotExist)?
            .add_child(child_id);
        self.get_unchecked_mut(child_id).add_parent(parent_id);
        Ok(())
    }

    /// Caches all ancestors and the number of descendants of every term
    ///
    /// This method must be called after all terms and parent connections are added.
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if the `is_a` hierarchy contains a cycle
    pub fn create_cache(&mut self) -> NcdaResult<()> {
        for term in self.do_terms.iter_mut() {
            *term.all_parents_mut() = DoGroup::default();
            *term.descendants_mut() = 0;
        }

        let term_ids = self.do_terms.keys();
        let mut visiting = Vec::new();
        for id in &term_ids {
            if !self.get_unchecked(*id).parents_cached() {
                self.create_cache_of_grandparents(*id, &mut visiting)?;
            }
        }

        for id in term_ids {
            let ancestors = self.get_unchecked(id).all_parents().clone();
            for ancestor in &ancestors {
                *self.get_unchecked_mut(ancestor).descendants_mut() += 1;
            }
        }
        Ok(())
    }

    /// Adds a new disease to the ontology
    ///
    /// If a disease with the same name already exists, its id is returned
    ///
    /// # Errors
    ///
    /// [`NcdaError::ParseIntError`] if the number of diseases exceeds `u32::MAX`
    pub fn add_disease(&mut self, name: &str) -> NcdaResult<DiseaseId> {
        if let Some(id) = self.disease_names.get(name) {
            return Ok(*id);
        }
        let id = DiseaseId::from(u32::try_from(self.diseases.len())?);
        self.diseases.push(Disease::new(id, name));
        self.disease_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Maps a disease to a term and links the disease to the term and all of its ancestors
    ///
    /// Obsolete terms are replaced by their replacement term.
    ///
    /// # Errors
    ///
    /// - [`NcdaError::DoesNotExist`] if the term is not part of the ontology
    ///   or obsolete without replacement
    /// - [`NcdaError::UnknownIdentifier`] if the disease was not added before
    pub fn annotate_disease<I: Into<DoTermId>>(
        &mut self,
        disease_id: DiseaseId,
        term_id: I,
    ) -> NcdaResult<()> {
        let term_id = self.resolve(term_id).ok_or(NcdaError::DoesNotExist)?;
        self.diseases
            .get_mut(disease_id.as_usize())
            .ok_or_else(|| NcdaError::UnknownIdentifier(disease_id.to_string()))?
            .add_term(term_id);
        self.link_disease_term(term_id, disease_id)
    }

    /// Links a disease to a term and all its ancestors
    ///
    /// # Errors
    ///
    /// [`NcdaError::DoesNotExist`] if the term is not part of the ontology
    pub fn link_disease_term<I: Into<DoTermId>>(
        &mut self,
        term_id: I,
        disease_id: DiseaseId,
    ) -> NcdaResult<()> {
        let term = self.get_mut(term_id).ok_or(NcdaError::DoesNotExist)?;

        if term.add_disease(disease_id) {
            // If the disease is already linked to the term, all
            // ancestors are linked as well and can be skipped
            let parents = term.all_parents().clone();
            for parent in &parents {
                self.link_disease_term(parent, disease_id)?;
            }
        }
        Ok(())
    }

    /// Calculates the intrinsic and annotation based information content of all terms
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if the caches are inconsistent
    pub fn calculate_information_content(&mut self) -> NcdaResult<()> {
        let n_terms = self.len();
        let n_annotated = self
            .diseases
            .iter()
            .filter(|disease| !disease.do_terms().is_empty())
            .count();

        let mut max_ic = InformationContent::default();
        for term in self.do_terms.iter_mut() {
            let subsumed = term.descendants() + 1;
            let annotated = term.diseases().len();
            let ic = term.information_content_mut();
            ic.set_intrinsic(n_terms, subsumed)?;
            ic.set_annotation(n_annotated, annotated)?;
            max_ic.max_of(ic);
        }
        self.max_ic = max_ic;
        Ok(())
    }
}

/// Crate-only functions
impl Ontology {
    pub(crate) fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }

    pub(crate) fn set_obsolete<I: Into<DoTermId>>(
        &mut self,
        term_id: I,
        replacement: Option<DoTermId>,
    ) -> NcdaResult<()> {
        let term = self.get_mut(term_id).ok_or(NcdaError::DoesNotExist)?;
        *term.obsolete_mut() = true;
        *term.replacement_mut() = replacement;
        Ok(())
    }

    fn create_cache_of_grandparents(
        &mut self,
        term_id: DoTermId,
        visiting: &mut Vec<DoTermId>,
    ) -> NcdaResult<()> {
        if visiting.contains(&term_id) {
            return Err(NcdaError::InvalidInput(format!(
                "the ontology contains a cycle at {term_id}"
            )));
        }
        visiting.push(term_id);

        let mut res = DoGroup::default();
        let parents = self.get_unchecked(term_id).parents().clone();
        for parent in &parents {
            if !self.get_unchecked(parent).parents_cached() {
                self.create_cache_of_grandparents(parent, visiting)?;
            }
            for gp in self.get_unchecked(parent).all_parents() {
                res.insert(gp);
            }
        }
        visiting.pop();

        let term = self.get_unchecked_mut(term_id);
        *term.all_parents_mut() = &res | &parents;
        Ok(())
    }

    pub(crate) fn get<I: Into<DoTermId>>(&self, term_id: I) -> Option<&DoTermInternal> {
        self.do_terms.get(term_id.into())
    }

    pub(crate) fn get_unchecked<I: Into<DoTermId>>(&self, term_id: I) -> &DoTermInternal {
        self.do_terms.get_unchecked(term_id.into())
    }

    fn get_mut<I: Into<DoTermId>>(&mut self, term_id: I) -> Option<&mut DoTermInternal> {
        self.do_terms.get_mut(term_id.into())
    }

    fn get_unchecked_mut<I: Into<DoTermId>>(&mut self, term_id: I) -> &mut DoTermInternal {
        self.do_terms.get_unchecked_mut(term_id.into())
    }
}

/// Iterates all [`DoTerm`]s of the [`Ontology`] in insertion order
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, DoTermInternal>,
    ontology: &'a Ontology,
}

impl<'a> std::iter::Iterator for Iter<'a> {
    type Item = DoTerm<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|term| DoTerm::new(self.ontology, term))
    }
}

impl<'a> IntoIterator for &'a Ontology {
    type Item = DoTerm<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.do_terms.iter(),
            ontology: self,
        }
    }
}
