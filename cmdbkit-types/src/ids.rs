//! Identifier types used throughout the cmdbkit core.
//!
//! Public ids are collection-scoped integers minted by the store's atomic
//! counter. They are distinct from any internal storage-engine row id and
//! never change once assigned.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a document within one store collection.
///
/// Allocation is monotonic per collection and delegated entirely to the
/// store; this type only carries the value around.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PublicId(u64);

impl PublicId {
    /// Wraps an already-minted id value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Parses a public id from its decimal string form.
    pub fn parse(s: &str) -> Result<Self, Error> {
        s.parse()
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PublicId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| Error::InvalidPublicId(s.to_string()))
    }
}

impl From<u64> for PublicId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
