//! Parsing the input files of the pipeline
//!
//! - `doid.obo`: the Disease Ontology
//! - `disease_doid.csv`: mapping of disease names to DOIDs
//! - `<kind>_sequences.csv`: ncRNA sequences
//! - `associations.csv`: curated ncRNA - disease associations

use std::fs::File;
use std::path::Path;

use crate::{NcdaError, NcdaResult};

/// Module to parse the `doid.obo` file
pub(crate) mod do_obo;

/// Opens a CSV file with a mandatory header line
fn csv_reader(path: &Path) -> NcdaResult<csv::Reader<File>> {
    let file =
        File::open(path).map_err(|_| NcdaError::CannotOpenFile(path.display().to_string()))?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file))
}

/// Returns the first two columns of a CSV row
fn two_columns<'a>(record: &'a csv::StringRecord, path: &Path) -> NcdaResult<(&'a str, &'a str)> {
    let mut cols = record.iter();
    let Some(first) = cols.next() else {
        return Err(NcdaError::InvalidInput(format!(
            "empty row in {}",
            path.display()
        )));
    };
    let Some(second) = cols.next() else {
        return Err(NcdaError::InvalidInput(format!(
            "row '{}' in {} must have two columns",
            first,
            path.display()
        )));
    };
    Ok((first, second))
}

/// Module to parse disease - DOID mappings
///
/// ```text
/// disease,doid
/// Breast Neoplasms,DOID:1612
/// Lymphoma,DOID:0060058;DOID:0060060
/// Lymphoma,DOID:0060061
/// Unmapped Disease,
/// ```
///
/// A disease can list several DOIDs separated by `;` or appear on several
/// lines. Diseases without a DOID, with unknown DOIDs or with obsolete
/// DOIDs that have no replacement are kept without those terms.
pub(crate) mod disease_records {
    use std::path::Path;

    use tracing::{debug, warn};

    use super::{csv_reader, two_columns};
    use crate::{DoTermId, NcdaResult, Ontology};

    pub fn parse<P: AsRef<Path>>(file: P, ontology: &mut Ontology) -> NcdaResult<()> {
        let path = file.as_ref();
        let mut reader = csv_reader(path)?;
        let mut n_links = 0usize;
        for record in reader.records() {
            let record = record?;
            let (name, doids) = match two_columns(&record, path) {
                Ok(cols) => cols,
                Err(_) if record.len() == 1 => (&record[0], ""),
                Err(err) => return Err(err),
            };
            if name.is_empty() {
                continue;
            }
            let disease_id = ontology.add_disease(name)?;
            for doid in doids.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                let term_id = match DoTermId::try_from(doid) {
                    Ok(id) => id,
                    Err(err) => {
                        warn!("Invalid DOID {doid} for {name}: {err}");
                        continue;
                    }
                };
                if ontology.annotate_disease(disease_id, term_id).is_ok() {
                    n_links += 1;
                } else {
                    warn!("Ignoring unknown or obsolete {term_id} of {name}");
                }
            }
        }
        debug!(
            "Parsed {} diseases with {} DOID links",
            ontology.disease_count(),
            n_links
        );
        Ok(())
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn multiple_doids() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("disease_doid.csv");
            std::fs::write(
                &path,
                "disease,doid\nCancer,DOID:162\nBreast,DOID:1612;DOID:162\nBreast,DOID:4\nOrphan,\nBad,DOID:999\n",
            )
            .unwrap();

            let mut ont = Ontology::default();
            for (name, id) in [("disease", 4u32), ("cancer", 162), ("breast cancer", 1612)] {
                ont.insert_term(name.to_string(), id);
            }
            ont.add_parent(4u32, 162u32).unwrap();
            ont.add_parent(162u32, 1612u32).unwrap();
            ont.create_cache().unwrap();

            parse(&path, &mut ont).unwrap();
            assert_eq!(ont.disease_count(), 4);
            assert_eq!(ont.disease_by_name("Breast").unwrap().do_terms().len(), 3);
            assert!(ont.disease_by_name("Orphan").unwrap().do_terms().is_empty());
            assert!(ont.disease_by_name("Bad").unwrap().do_terms().is_empty());
            assert_eq!(ont.term(4u32).unwrap().disease_count(), 2);
        }
    }
}

/// Module to parse ncRNA sequence files
///
/// ```text
/// id,sequence
/// hsa-mir-21,UAGCUUAUCAGACUGAUGUUGA
/// ```
pub(crate) mod sequences {
    use std::path::Path;

    use tracing::debug;

    use super::{csv_reader, two_columns};
    use crate::{NcdaResult, RnaRecord, SequenceSet};

    pub fn parse<P: AsRef<Path>>(file: P, set: &mut SequenceSet) -> NcdaResult<()> {
        let path = file.as_ref();
        let mut reader = csv_reader(path)?;
        for record in reader.records() {
            let record = record?;
            let (id, sequence) = two_columns(&record, path)?;
            set.push(RnaRecord::new(id, sequence))?;
        }
        debug!("Parsed {} {} sequences from {}", set.len(), set.kind(), path.display());
        Ok(())
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use crate::{NcdaError, RnaKind};

        #[test]
        fn duplicate_ids() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("mirna_sequences.csv");
            std::fs::write(&path, "id,sequence\nmir-1,ACGU\nmir-1,AAAA\n").unwrap();
            let mut set = SequenceSet::new(RnaKind::Mirna);
            assert!(matches!(parse(&path, &mut set), Err(NcdaError::InvalidInput(_))));
        }

        #[test]
        fn missing_column() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("mirna_sequences.csv");
            std::fs::write(&path, "id,sequence\nmir-1\n").unwrap();
            let mut set = SequenceSet::new(RnaKind::Mirna);
            assert!(parse(&path, &mut set).is_err());
        }
    }
}

/// Module to parse curated ncRNA - disease associations
///
/// ```text
/// rna,disease
/// hsa-mir-21,Breast Neoplasms
/// ```
pub(crate) mod associations {
    use std::path::Path;

    use tracing::debug;

    use super::{csv_reader, two_columns};
    use crate::{Association, AssociationSet, NcdaResult};

    pub fn parse<P: AsRef<Path>>(file: P, set: &mut AssociationSet) -> NcdaResult<()> {
        let path = file.as_ref();
        let mut reader = csv_reader(path)?;
        let mut n_rows = 0usize;
        for record in reader.records() {
            let record = record?;
            let (rna, disease) = two_columns(&record, path)?;
            set.insert(Association::new(rna, disease));
            n_rows += 1;
        }
        debug!(
            "Parsed {} unique associations from {} rows",
            set.len(),
            n_rows
        );
        Ok(())
    }
}
