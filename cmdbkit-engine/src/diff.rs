//! Field-set diffing and the version-bump policy.
//!
//! The diff is by `(name, value)` pair, not a semantic comparison: a changed
//! value, an added field and a removed field all count the same way. The
//! classification is deliberately simple and ties break toward a patch bump.

use cmdbkit_model::FieldEntry;
use cmdbkit_types::VersionLevel;
use serde::{Deserialize, Serialize};

/// The two directions of a field-set diff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldChanges {
    /// Pairs present in the old set but absent from the new one.
    pub old: Vec<FieldEntry>,
    /// Pairs present in the new set but absent from the old one.
    pub new: Vec<FieldEntry>,
}

impl FieldChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.old.is_empty() && self.new.is_empty()
    }
}

/// Compares two field sets by `(name, value)` pair.
#[must_use]
pub fn diff_fields(old: &[FieldEntry], new: &[FieldEntry]) -> FieldChanges {
    FieldChanges {
        old: old.iter().filter(|e| !new.contains(e)).cloned().collect(),
        new: new.iter().filter(|e| !old.contains(e)).cloned().collect(),
    }
}

/// Picks the version-bump level for a diff against a document with
/// `field_count` fields in its new form.
#[must_use]
pub fn classify_change(changes: &FieldChanges, field_count: usize) -> VersionLevel {
    classify(changes.new.len(), field_count)
}

/// The raw classification:
/// - exactly one changed entry is a patch
/// - every field changed is a major (a rewrite)
/// - more than half is a minor
/// - anything else — including the exact-half tie — is a patch
#[must_use]
pub fn classify(changed: usize, field_count: usize) -> VersionLevel {
    if changed == 1 {
        VersionLevel::Patch
    } else if changed == field_count {
        VersionLevel::Major
    } else if changed * 2 > field_count {
        VersionLevel::Minor
    } else {
        VersionLevel::Patch
    }
}
