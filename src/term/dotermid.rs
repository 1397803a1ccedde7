use core::fmt::Debug;
use std::fmt::Display;

use crate::{NcdaError, NcdaResult, DOID_PREFIX};

/// The identifier of a Disease Ontology term, e.g. `DOID:1324`
///
/// The Disease Ontology uses zero-padded (`DOID:0001816`) and unpadded
/// (`DOID:1816`) identifiers side by side, and they name different terms.
/// Only the numeric part and, for padded identifiers, the number of
/// digits are stored.
#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DoTermId {
    inner: u32,
    width: u8,
}

impl DoTermId {
    /// Constructs an unpadded `DoTermId` from the numeric part of the identifier
    pub const fn from_u32(inner: u32) -> Self {
        Self { inner, width: 0 }
    }

    /// Returns the numeric part of the identifier
    pub fn as_u32(&self) -> u32 {
        self.inner
    }

    /// Returns the number of digits of a zero-padded identifier, `None` if unpadded
    pub fn padding(&self) -> Option<usize> {
        (self.width > 0).then_some(usize::from(self.width))
    }
}

impl TryFrom<&str> for DoTermId {
    type Error = NcdaError;
    /// Parses `DOID:1234` into a `DoTermId`
    ///
    /// # Errors
    ///
    /// - [`NcdaError::InvalidInput`] if the prefix is missing or the numeric
    ///   part contains anything but digits
    /// - [`NcdaError::ParseIntError`] if the numeric part is out of range
    fn try_from(s: &str) -> NcdaResult<Self> {
        let numeric = s
            .trim()
            .strip_prefix(DOID_PREFIX)
            .ok_or_else(|| NcdaError::InvalidInput(format!("not a DOID: {s}")))?;
        if !numeric.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NcdaError::InvalidInput(format!("not a DOID: {s}")));
        }
        let inner = numeric.parse::<u32>()?;
        let width = if numeric.len() > 1 && numeric.starts_with('0') {
            u8::try_from(numeric.len())
                .map_err(|_| NcdaError::InvalidInput(format!("not a DOID: {s}")))?
        } else {
            0
        };
        Ok(DoTermId { inner, width })
    }
}

impl From<u32> for DoTermId {
    fn from(inner: u32) -> Self {
        Self::from_u32(inner)
    }
}

impl Debug for DoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DoTermId({self})")
    }
}

impl Display for DoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = usize::from(self.width);
        write!(f, "{DOID_PREFIX}{:0width$}", self.inner)
    }
}

impl PartialEq<str> for DoTermId {
    fn eq(&self, other: &str) -> bool {
        DoTermId::try_from(other).map_or(false, |id| id == *self)
    }
}

impl PartialEq<&str> for DoTermId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
