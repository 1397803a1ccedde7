use std::fs;
use std::path::Path;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::{DoTermId, NcdaError, NcdaResult, Ontology};

/// Most terms have one or two parents
type Parents = SmallVec<[DoTermId; 2]>;

/// A single `[Term]` stanza of the OBO file
#[derive(Debug, Default, PartialEq)]
struct RawTerm<'a> {
    id: Option<DoTermId>,
    name: Option<&'a str>,
    parents: Parents,
    alt_ids: Parents,
    obsolete: bool,
    replaced_by: Option<DoTermId>,
}

/// Reads `doid.obo` into the ontology
///
/// Terms are added first, then connected to their parents. Parent links to
/// terms that are not part of the file are skipped with a warning.
pub(crate) fn read_obo_file<P: AsRef<Path>>(filename: P, ontology: &mut Ontology) -> NcdaResult<()> {
    let path = filename.as_ref();
    let file_content = fs::read_to_string(path)
        .map_err(|_| NcdaError::CannotOpenFile(path.display().to_string()))?;
    read_obo(&file_content, ontology)
}

pub(crate) fn read_obo(content: &str, ontology: &mut Ontology) -> NcdaResult<()> {
    let content = content.replace("\r\n", "\n");
    let mut terms: Vec<RawTerm> = Vec::new();

    for (idx, stanza) in content.split("\n\n").enumerate() {
        let stanza = stanza.trim_start_matches('\n');
        if idx == 0 && !stanza.starts_with('[') {
            parse_header(stanza, ontology);
            continue;
        }
        if let Some(body) = stanza.strip_prefix("[Term]\n") {
            match term_from_obo(body) {
                Ok(term) => terms.push(term),
                Err(err) => warn!("Unable to parse term: {err}"),
            }
        } else {
            trace!("Ignoring stanza: {}", stanza.lines().next().unwrap_or_default());
        }
    }

    for term in &terms {
        let (Some(id), Some(name)) = (term.id, term.name) else {
            continue;
        };
        ontology.insert_term(name.to_string(), id);
    }

    for term in &terms {
        let Some(id) = term.id else { continue };
        for parent in &term.parents {
            if ontology.add_parent(*parent, id).is_err() {
                warn!("Skipping unknown parent {parent} of {id}");
            }
        }
        for alt_id in &term.alt_ids {
            if let Err(err) = ontology.add_alt_id(*alt_id, id) {
                warn!("Skipping alternative id {alt_id} of {id}: {err}");
            }
        }
        if term.obsolete {
            ontology.set_obsolete(id, term.replaced_by)?;
        }
    }
    debug!("Parsed {} terms from OBO data", ontology.len());

    ontology.create_cache()
}

fn parse_header(header: &str, ontology: &mut Ontology) {
    for line in header.lines() {
        if let Some(version) = line.strip_prefix("data-version: ") {
            ontology.set_version(version.trim());
        }
    }
}

/// Extracts the DOID of `is_a`, `alt_id` and `replaced_by` values
///
/// ```text
/// is_a: DOID:162 ! cancer
/// ```
fn term_id(value: &str) -> NcdaResult<DoTermId> {
    let id = value.split_once(' ').map_or(value, |(id, _)| id);
    DoTermId::try_from(id)
}

fn term_from_obo(stanza: &str) -> NcdaResult<RawTerm<'_>> {
    let mut term = RawTerm::default();
    for line in stanza.lines() {
        let Some((key, value)) = line.split_once(": ") else {
            continue;
        };
        match key {
            "id" => term.id = Some(DoTermId::try_from(value)?),
            "name" => term.name = Some(value.trim()),
            "is_a" => term.parents.push(term_id(value)?),
            "alt_id" => term.alt_ids.push(term_id(value)?),
            "is_obsolete" => term.obsolete = value.trim() == "true",
            "replaced_by" => term.replaced_by = Some(term_id(value)?),
            _ => (),
        }
    }
    if term.id.is_none() || term.name.is_none() {
        return Err(NcdaError::InvalidInput(format!(
            "term without id or name: {}",
            stanza.lines().next().unwrap_or_default()
        )));
    }
    Ok(term)
}

#[cfg(test)]
mod test {
    use super::*;

    const OBO: &str = "format-version: 1.2
data-version: doid/releases/2024-01-31/doid.obo

[Term]
id: DOID:4
name: disease

[Term]
id: DOID:162
name: cancer
is_a: DOID:4 ! disease

[Term]
id: DOID:1612
name: breast cancer
is_a: DOID:162 ! cancer
is_a: DOID:99999 ! not in file

[Term]
id: DOID:1000
name: obsolete breast carcinoma
is_obsolete: true
replaced_by: DOID:1612

[Typedef]
id: has_material_basis_in
name: has_material_basis_in
";

    #[test]
    fn parse_terms() {
        let mut ont = Ontology::default();
        read_obo(OBO, &mut ont).unwrap();

        assert_eq!(ont.len(), 4);
        assert_eq!(ont.version(), "doid/releases/2024-01-31/doid.obo");
        assert!(ont.term(99999u32).is_none());

        let breast = ont.term(1612u32).unwrap();
        assert_eq!(breast.name(), "breast cancer");
        assert_eq!(breast.parents().count(), 1);
        assert_eq!(breast.all_parents().count(), 2);
        assert_eq!(ont.term(4u32).unwrap().children().count(), 1);

        let old = ont.term(1000u32).unwrap();
        assert!(old.is_obsolete());
        assert_eq!(old.replaced_by(), Some(1612u32.into()));
    }

    #[test]
    fn padded_and_unpadded_ids_are_distinct() {
        let obo = "[Term]
id: DOID:4
name: disease

[Term]
id: DOID:1816
name: term A
is_a: DOID:4 ! disease

[Term]
id: DOID:0001816
name: angiosarcoma
is_a: DOID:4 ! disease
";
        let mut ont = Ontology::default();
        read_obo(obo, &mut ont).unwrap();
        assert_eq!(ont.len(), 3);

        let padded = DoTermId::try_from("DOID:0001816").unwrap();
        assert_eq!(ont.term(1816u32).unwrap().name(), "term A");
        assert_eq!(ont.term(padded).unwrap().name(), "angiosarcoma");
        assert_eq!(ont.term(padded).unwrap().id().to_string(), "DOID:0001816");
        assert_eq!(ont.term(4u32).unwrap().children().count(), 2);
    }

    #[test]
    fn alternative_ids() {
        let obo = "[Term]
id: DOID:4
name: disease

[Term]
id: DOID:0050686
name: organ system cancer
alt_id: DOID:0050687
alt_id: DOID:4
is_a: DOID:4 ! disease
";
        let mut ont = Ontology::default();
        read_obo(obo, &mut ont).unwrap();
        assert_eq!(ont.len(), 2);

        let primary = DoTermId::try_from("DOID:0050686").unwrap();
        let alt = DoTermId::try_from("DOID:0050687").unwrap();
        assert!(ont.term(alt).is_none());
        assert_eq!(ont.resolve(alt), Some(primary));
        // an alt_id that is a term itself is skipped
        assert_eq!(ont.resolve(4u32), Some(DoTermId::from(4u32)));

        let term = term_from_obo("id: DOID:162\nname: cancer\nalt_id: DOID:1\nalt_id: DOID:2\n").unwrap();
        assert_eq!(
            term.alt_ids.as_slice(),
            &[DoTermId::from(1u32), DoTermId::from(2u32)]
        );
    }

    #[test]
    fn raw_term() {
        let term = term_from_obo("id: DOID:162\nname: cancer\nis_a: DOID:4 ! disease\nis_a: DOID:7\n").unwrap();
        assert_eq!(term.id, Some(162u32.into()));
        assert_eq!(term.name, Some("cancer"));
        assert_eq!(
            term.parents.as_slice(),
            &[DoTermId::from(4u32), DoTermId::from(7u32)]
        );
        assert!(!term.obsolete);
    }

    #[test]
    fn invalid_terms() {
        assert!(term_from_obo("name: cancer\n").is_err());
        assert!(term_from_obo("id: HP:0000001\nname: All\n").is_err());
    }

    #[test]
    fn missing_file() {
        let mut ont = Ontology::default();
        assert!(matches!(
            read_obo_file("does/not/exist.obo", &mut ont),
            Err(NcdaError::CannotOpenFile(_))
        ));
    }
}
