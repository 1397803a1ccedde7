//! Contains implementation for some Similarity algorithms that are
//! considered to be default implementations.
//!
//! All of the algorithms can also be accessed via [`crate::similarity::Builtins`]

use crate::similarity::Similarity;
use crate::term::InformationContentKind;
use crate::DoTerm;

/// Semantic contribution of an `is_a` relation in [`Wang`] similarity
pub const WANG_IS_A_WEIGHT: f32 = 0.8;

fn ic_sum(ids: &crate::term::DoGroup, term: &DoTerm, kind: &InformationContentKind) -> f32 {
    ids.terms(term.ontology())
        .map(|t| t.information_content().get_kind(kind))
        .sum()
}

// Clippy thinks the `PLoS` is a struct or should have backticks for some reason
#[allow(clippy::doc_markdown)]
/// Graph based Information coefficient similarity
///
/// For a detailed description see [Deng Y, et. al., PLoS One, (2015)](https://pubmed.ncbi.nlm.nih.gov/25664462/)
#[derive(Debug, Clone, Copy)]
pub struct GraphIc {
    kind: InformationContentKind,
}

impl GraphIc {
    /// Constructs a new struct to calculate `GraphIC` based similarity scores
    /// between two terms
    ///
    /// # Examples
    ///
    /// ```
    /// use ncda::similarity::GraphIc;
    /// use ncda::term::InformationContentKind;
    ///
    /// let graphic = GraphIc::new(InformationContentKind::Intrinsic);
    /// ```
    pub fn new(kind: InformationContentKind) -> Self {
        Self { kind }
    }
}

impl Similarity for GraphIc {
    fn calculate(&self, a: &DoTerm, b: &DoTerm) -> f32 {
        if a.id() == b.id() {
            return 1.0;
        }

        let ic_union = ic_sum(&a.all_union_ancestor_ids(b), a, &self.kind);

        if ic_union == 0.0 {
            return 0.0;
        }

        let ic_common = ic_sum(&a.all_common_ancestor_ids(b), a, &self.kind);

        ic_common / ic_union
    }
}

/// Similarity score from Resnik
///
/// The information content of the most informative common ancestor.
/// For a detailed description see [Resnik P, Proceedings of the 14th IJCAI, (1995)](https://www.ijcai.org/Proceedings/95-1/Papers/059.pdf)
#[derive(Debug, Clone, Copy)]
pub struct Resnik {
    kind: InformationContentKind,
}

impl Resnik {
    /// Constructs a new struct to calculate the Resnik based similarity scores
    /// between two terms
    pub fn new(kind: InformationContentKind) -> Self {
        Self { kind }
    }
}

impl Similarity for Resnik {
    fn calculate(&self, a: &DoTerm, b: &DoTerm) -> f32 {
        a.all_common_ancestor_ids(b)
            .terms(a.ontology())
            .map(|term| term.information_content().get_kind(&self.kind))
            .fold(0.0, |max, ic| if ic > max { ic } else { max })
    }
}

/// Similarity score from Lin
///
/// For a detailed description see [Lin D, Proceedings of the 15th ICML, (1998)](https://dl.acm.org/doi/10.5555/645527.657297)
#[derive(Debug, Clone, Copy)]
pub struct Lin {
    kind: InformationContentKind,
}

impl Lin {
    /// Constructs a new struct to calculate the Lin based similarity scores
    /// between two terms
    pub fn new(kind: InformationContentKind) -> Self {
        Self { kind }
    }
}

impl Similarity for Lin {
    fn calculate(&self, a: &DoTerm, b: &DoTerm) -> f32 {
        let ic_combined = a.information_content().get_kind(&self.kind)
            + b.information_content().get_kind(&self.kind);

        if ic_combined == 0.0 {
            return 0.0;
        }

        let resnik = Resnik::new(self.kind).calculate(a, b);

        2.0 * resnik / ic_combined
    }
}

/// Similarity score from Jiang & Conrath
///
/// The distance `ic(a) + ic(b) - 2 * resnik(a, b)` is converted to a
/// similarity in `(0, 1]` as `1 / (distance + 1)`.
///
/// For a detailed description see [Jiang J, Conrath D, Rocling X, (1997)](https://aclanthology.org/O97-1002.pdf)
#[derive(Debug, Clone, Copy)]
pub struct Jc {
    kind: InformationContentKind,
}

impl Jc {
    /// Constructs a new struct to calculate the Jiang & Conrath based similarity scores
    /// between two terms
    pub fn new(kind: InformationContentKind) -> Self {
        Self { kind }
    }
}

impl Similarity for Jc {
    fn calculate(&self, a: &DoTerm, b: &DoTerm) -> f32 {
        if a.id() == b.id() {
            return 1.0;
        }

        let ic1 = a.information_content().get_kind(&self.kind);
        let ic2 = b.information_content().get_kind(&self.kind);

        if ic1 == 0.0 || ic2 == 0.0 {
            return 0.0;
        }

        let resnik = Resnik::new(self.kind).calculate(a, b);

        1.0 / (ic1 + ic2 - 2.0 * resnik + 1.0)
    }
}

/// Relevance Similarity score from Schlicker
///
/// For a detailed description see [Schlicker A, et.al., BMC Bioinformatics, (2006)](https://bmcbioinformatics.biomedcentral.com/articles/10.1186/1471-2105-7-302)
#[derive(Debug, Clone, Copy)]
pub struct Relevance {
    kind: InformationContentKind,
}

impl Relevance {
    /// Constructs a new struct to calculate the Schlicker based similarity scores
    /// between two terms
    pub fn new(kind: InformationContentKind) -> Self {
        Self { kind }
    }
}

impl Similarity for Relevance {
    fn calculate(&self, a: &DoTerm, b: &DoTerm) -> f32 {
        let resnik = Resnik::new(self.kind).calculate(a, b);
        let lin = Lin::new(self.kind).calculate(a, b);

        lin * (1.0 - (resnik * -1.0).exp())
    }
}

/// Topology based similarity score from Wang
///
/// Each term has a semantic value, the sum of the semantic contributions
/// of the term itself and all its ancestors (see
/// [`DoTerm::semantic_contributions`]). The similarity is the share of the
/// semantic values that both terms have in common.
///
/// For a detailed description see [Wang JZ, et. al., Bioinformatics, (2007)](https://pubmed.ncbi.nlm.nih.gov/17344234/)
///
/// # Examples
///
/// ```
/// use ncda::similarity::{Similarity, Wang};
/// use ncda::Ontology;
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("disease".to_string(), 4u32);
/// ontology.insert_term("cancer".to_string(), 162u32);
/// ontology.add_parent(4u32, 162u32).unwrap();
/// ontology.create_cache().unwrap();
///
/// let root = ontology.term(4u32).unwrap();
/// let cancer = ontology.term(162u32).unwrap();
///
/// // SV(cancer) = 1 + 0.8, common: DOID:4 with 1.0 and 0.8
/// let score = Wang::default().calculate(&root, &cancer);
/// assert!((score - 1.8 / 2.8).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Wang {
    weight: f32,
}

impl Default for Wang {
    fn default() -> Self {
        Self::new(WANG_IS_A_WEIGHT)
    }
}

impl Wang {
    /// Constructs a new struct to calculate the Wang similarity with
    /// the given semantic contribution factor of `is_a` relations
    pub fn new(weight: f32) -> Self {
        Self { weight }
    }
}

impl Similarity for Wang {
    fn calculate(&self, a: &DoTerm, b: &DoTerm) -> f32 {
        if a.id() == b.id() {
            return 1.0;
        }
        let sv_a = a.semantic_contributions(self.weight);
        let sv_b = b.semantic_contributions(self.weight);

        let total: f32 = sv_a.iter().chain(sv_b.iter()).map(|(_, v)| v).sum();
        if total == 0.0 {
            return 0.0;
        }

        // both lists are sorted by id
        let mut common = 0.0;
        let mut iter_b = sv_b.iter().peekable();
        for (id_a, value_a) in &sv_a {
            while let Some((id_b, _)) = iter_b.peek() {
                if id_b < id_a {
                    iter_b.next();
                } else {
                    break;
                }
            }
            if let Some((id_b, value_b)) = iter_b.peek() {
                if id_b == id_a {
                    common += value_a + value_b;
                }
            }
        }
        common / total
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Ontology;

    ///```text
    ///          4
    ///        /   \
    ///      162    7
    ///      /  \  /
    ///   1612  3571
    ///```
    fn ontology() -> Ontology {
        let mut ont = Ontology::default();
        for (name, id) in [
            ("disease", 4u32),
            ("cancer", 162),
            ("anatomical", 7),
            ("breast cancer", 1612),
            ("liver cancer", 3571),
        ] {
            ont.insert_term(name.to_string(), id);
        }
        ont.add_parent(4u32, 162u32).unwrap();
        ont.add_parent(4u32, 7u32).unwrap();
        ont.add_parent(162u32, 1612u32).unwrap();
        ont.add_parent(162u32, 3571u32).unwrap();
        ont.add_parent(7u32, 3571u32).unwrap();
        ont.create_cache().unwrap();
        ont.calculate_information_content().unwrap();
        ont
    }

    fn kind() -> InformationContentKind {
        InformationContentKind::Intrinsic
    }

    #[test]
    fn resnik_is_ic_of_mica() {
        let ont = ontology();
        let a = ont.term(1612u32).unwrap();
        let b = ont.term(3571u32).unwrap();
        let cancer = ont.term(162u32).unwrap();
        let res = Resnik::new(kind()).calculate(&a, &b);
        assert!((res - cancer.information_content().intrinsic()).abs() < 1e-6);
    }

    #[test]
    fn self_similarity() {
        let ont = ontology();
        let a = ont.term(1612u32).unwrap();
        assert!((GraphIc::new(kind()).calculate(&a, &a) - 1.0).abs() < f32::EPSILON);
        assert!((Jc::new(kind()).calculate(&a, &a) - 1.0).abs() < f32::EPSILON);
        assert!((Lin::new(kind()).calculate(&a, &a) - 1.0).abs() < 1e-6);
        assert!((Wang::default().calculate(&a, &a) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn scores_are_symmetric_and_bounded() {
        let ont = ontology();
        let sims: Vec<Box<dyn Similarity>> = vec![
            Box::new(GraphIc::new(kind())),
            Box::new(Lin::new(kind())),
            Box::new(Jc::new(kind())),
            Box::new(Relevance::new(kind())),
            Box::new(Wang::default()),
        ];
        for a in &ont {
            for b in &ont {
                for sim in &sims {
                    let ab = sim.calculate(&a, &b);
                    let ba = sim.calculate(&b, &a);
                    assert!((ab - ba).abs() < 1e-6);
                    assert!((0.0..=1.0 + 1e-6).contains(&ab), "{ab} out of range");
                }
            }
        }
    }

    #[test]
    fn wang_shared_ancestors() {
        let ont = ontology();
        let a = ont.term(1612u32).unwrap();
        let b = ont.term(3571u32).unwrap();
        // SV(1612): 1612=1, 162=0.8, 4=0.64 -> 2.44
        // SV(3571): 3571=1, 162=0.8, 7=0.8, 4=0.64 -> 3.24
        // common: 162 (0.8 + 0.8) and 4 (0.64 + 0.64) -> 2.88
        let score = Wang::default().calculate(&a, &b);
        assert!((score - 2.88 / 5.68).abs() < 1e-6);
    }

    #[test]
    fn graphic_unrelated_root() {
        let ont = ontology();
        let root = ont.term(4u32).unwrap();
        let leaf = ont.term(1612u32).unwrap();
        // the root has no information content
        assert!(GraphIc::new(kind()).calculate(&root, &leaf).abs() < f32::EPSILON);
        assert!(Lin::new(kind()).calculate(&root, &root).abs() < f32::EPSILON);
    }
}
