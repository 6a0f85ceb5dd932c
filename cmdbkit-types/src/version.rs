//! Semantic versions for stored documents.
//!
//! Every type and object carries a `major.minor.patch` version that only
//! ever moves forward. The bump policy is deliberately literal: exactly one
//! component is incremented and the others are left untouched — a minor bump
//! does NOT reset the patch component. Downstream diff logic picks the level.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Which component of a [`Version`] an update increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionLevel {
    Major,
    Minor,
    Patch,
}

/// A `major.minor.patch` document version.
///
/// Serialized as its string form (`"1.0.0"`) so stored documents stay
/// readable. Ordering is component-wise, major first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
}

impl Version {
    /// The version every freshly created document starts at.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            major: 1,
            minor: 0,
            patch: 0,
        }
    }

    /// Creates a version from components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    #[must_use]
    pub const fn patch(&self) -> u32 {
        self.patch
    }

    /// Parses a version from its `"x.y.z"` string form.
    ///
    /// Fails with [`Error::InvalidVersion`] unless the input splits into
    /// exactly three integer components.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(Error::InvalidVersion(s.to_string()));
        }
        let component = |p: &str| {
            p.trim()
                .parse::<u32>()
                .map_err(|_| Error::InvalidVersion(s.to_string()))
        };
        Ok(Self {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
        })
    }

    /// Returns a copy with the given component incremented by one.
    ///
    /// The other components are untouched: `1.2.3` bumped at `Minor` is
    /// `1.3.3`, not `1.3.0`.
    #[must_use]
    pub const fn bump(&self, level: VersionLevel) -> Self {
        match level {
            VersionLevel::Major => Self {
                major: self.major + 1,
                minor: self.minor,
                patch: self.patch,
            },
            VersionLevel::Minor => Self {
                major: self.major,
                minor: self.minor + 1,
                patch: self.patch,
            },
            VersionLevel::Patch => Self {
                major: self.major,
                minor: self.minor,
                patch: self.patch + 1,
            },
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}
