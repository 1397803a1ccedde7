//! [`DoTerm`]s are the main building block of the Disease Ontology.
//!
//! Each term is a directed node in the ontology graph, connected to its
//! parents via `is_a` relations. Terms are looked up in the
//! [`Ontology`](crate::Ontology) by their [`DoTermId`].

mod doterm;
mod dotermid;
pub(crate) mod group;
mod information_content;
pub(crate) mod internal;

pub use doterm::DoTerm;
pub use dotermid::DoTermId;
pub use group::{DoGroup, DoTermIds, GroupTerms};
pub use information_content::{InformationContent, InformationContentKind};
