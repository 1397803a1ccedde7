use serde::{Deserialize, Serialize};

use crate::{usize_to_f32, NcdaError, NcdaResult};

/// The information content of a Disease Ontology term
///
/// Two flavours are tracked:
///
/// - `intrinsic`: based on the number of descendants of the term within the
///   ontology (`-ln((descendants + 1) / total_terms)`)
/// - `annotation`: based on the fraction of diseases annotated to the term or
///   one of its descendants (`-ln(annotated / total_diseases)`)
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct InformationContent {
    intrinsic: f32,
    annotation: f32,
}

impl InformationContent {
    /// The intrinsic (topology based) information content
    pub fn intrinsic(&self) -> f32 {
        self.intrinsic
    }

    /// The annotation based information content
    pub fn annotation(&self) -> f32 {
        self.annotation
    }

    /// Returns the information content of the requested kind
    pub fn get_kind(&self, kind: &InformationContentKind) -> f32 {
        match kind {
            InformationContentKind::Intrinsic => self.intrinsic,
            InformationContentKind::Annotation => self.annotation,
        }
    }

    /// Calculates and stores the intrinsic information content
    ///
    /// `subsumed` is the number of terms in the sub-graph of the term,
    /// including the term itself.
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if `subsumed` is 0 or exceeds `total`
    pub fn set_intrinsic(&mut self, total: usize, subsumed: usize) -> NcdaResult<()> {
        self.intrinsic = Self::calculate(total, subsumed)?;
        Ok(())
    }

    /// Calculates and stores the annotation based information content
    ///
    /// # Errors
    ///
    /// [`NcdaError::InvalidInput`] if `annotated` exceeds `total`
    pub fn set_annotation(&mut self, total: usize, annotated: usize) -> NcdaResult<()> {
        self.annotation = Self::calculate(total, annotated)?;
        Ok(())
    }

    /// Keeps the larger value of each kind
    pub(crate) fn max_of(&mut self, other: &InformationContent) {
        self.intrinsic = self.intrinsic.max(other.intrinsic);
        self.annotation = self.annotation.max(other.annotation);
    }

    fn calculate(total: usize, current: usize) -> NcdaResult<f32> {
        if total == 0 || current == 0 {
            return Ok(0.0);
        }
        if current > total {
            return Err(NcdaError::InvalidInput(format!(
                "information content: {current} out of {total}"
            )));
        }
        Ok(-(usize_to_f32(current) / usize_to_f32(total)).ln())
    }
}

/// Different types of information contents
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationContentKind {
    /// Information content from the ontology topology
    #[default]
    Intrinsic,
    /// Information content from disease annotations
    Annotation,
}

impl TryFrom<&str> for InformationContentKind {
    type Error = NcdaError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "intrinsic" | "topology" => Ok(Self::Intrinsic),
            "annotation" | "disease" => Ok(Self::Annotation),
            _ => Err(NcdaError::InvalidInput(format!(
                "unknown information content kind: {value}"
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ic_values() {
        let mut ic = InformationContent::default();
        ic.set_intrinsic(10, 10).unwrap();
        assert!(ic.intrinsic().abs() < f32::EPSILON);

        ic.set_intrinsic(10, 1).unwrap();
        assert!((ic.intrinsic() - 10f32.ln()).abs() < 1e-6);

        ic.set_annotation(0, 0).unwrap();
        assert!(ic.annotation().abs() < f32::EPSILON);
    }

    #[test]
    fn ic_out_of_range() {
        let mut ic = InformationContent::default();
        assert!(ic.set_annotation(3, 4).is_err());
    }

    #[test]
    fn kind_from_str() {
        assert_eq!(
            InformationContentKind::try_from("Annotation").unwrap(),
            InformationContentKind::Annotation
        );
        assert!(InformationContentKind::try_from("omim").is_err());
    }
}
