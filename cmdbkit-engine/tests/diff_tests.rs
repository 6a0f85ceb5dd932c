use cmdbkit_engine::{classify, classify_change, diff_fields, FieldChanges};
use cmdbkit_model::FieldEntry;
use cmdbkit_types::VersionLevel;
use proptest::prelude::*;

fn fields(pairs: &[(&str, &str)]) -> Vec<FieldEntry> {
    pairs
        .iter()
        .map(|(name, value)| FieldEntry::new(*name, *value))
        .collect()
}

// ── diff_fields ───────────────────────────────────────────────────

#[test]
fn identical_sets_diff_empty() {
    let a = fields(&[("name", "srv01"), ("os", "linux")]);
    let changes = diff_fields(&a, &a.clone());
    assert!(changes.is_empty());
}

#[test]
fn value_change_appears_in_both_directions() {
    let old = fields(&[("name", "srv01"), ("os", "linux")]);
    let new = fields(&[("name", "srv01"), ("os", "bsd")]);
    let changes = diff_fields(&old, &new);
    assert_eq!(changes.old, fields(&[("os", "linux")]));
    assert_eq!(changes.new, fields(&[("os", "bsd")]));
}

#[test]
fn added_field_appears_only_in_new() {
    let old = fields(&[("name", "srv01")]);
    let new = fields(&[("name", "srv01"), ("os", "linux")]);
    let changes = diff_fields(&old, &new);
    assert!(changes.old.is_empty());
    assert_eq!(changes.new, fields(&[("os", "linux")]));
}

#[test]
fn removed_field_appears_only_in_old() {
    let old = fields(&[("name", "srv01"), ("os", "linux")]);
    let new = fields(&[("name", "srv01")]);
    let changes = diff_fields(&old, &new);
    assert_eq!(changes.old, fields(&[("os", "linux")]));
    assert!(changes.new.is_empty());
}

#[test]
fn field_order_does_not_matter() {
    let old = fields(&[("a", "1"), ("b", "2")]);
    let new = fields(&[("b", "2"), ("a", "1")]);
    assert!(diff_fields(&old, &new).is_empty());
}

// ── Classification boundaries ─────────────────────────────────────

#[test]
fn single_change_is_patch() {
    assert_eq!(classify(1, 5), VersionLevel::Patch);
    assert_eq!(classify(1, 1), VersionLevel::Patch);
}

#[test]
fn full_rewrite_is_major() {
    assert_eq!(classify(5, 5), VersionLevel::Major);
    assert_eq!(classify(2, 2), VersionLevel::Major);
}

#[test]
fn majority_change_is_minor() {
    // floor(N/2)+1 of N
    assert_eq!(classify(3, 4), VersionLevel::Minor);
    assert_eq!(classify(3, 5), VersionLevel::Minor);
    assert_eq!(classify(6, 10), VersionLevel::Minor);
}

#[test]
fn half_or_less_is_patch() {
    // the exact-half tie breaks toward patch
    assert_eq!(classify(2, 4), VersionLevel::Patch);
    assert_eq!(classify(2, 5), VersionLevel::Patch);
    assert_eq!(classify(5, 10), VersionLevel::Patch);
    assert_eq!(classify(0, 3), VersionLevel::Patch);
}

#[test]
fn classify_change_counts_new_direction() {
    let old = fields(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);
    let new = fields(&[("a", "x"), ("b", "y"), ("c", "z"), ("d", "4")]);
    let changes = diff_fields(&old, &new);
    assert_eq!(changes.new.len(), 3);
    assert_eq!(classify_change(&changes, new.len()), VersionLevel::Minor);
}

// ── Serde ─────────────────────────────────────────────────────────

#[test]
fn field_changes_serde_roundtrip() {
    let changes = FieldChanges {
        old: fields(&[("os", "linux")]),
        new: fields(&[("os", "bsd")]),
    };
    let json = serde_json::to_string(&changes).unwrap();
    let parsed: FieldChanges = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, changes);
}

// ── Properties ────────────────────────────────────────────────────

proptest! {
    /// Exactly one changed entry is always a patch, regardless of size.
    #[test]
    fn one_change_always_patch(n in 1usize..50) {
        prop_assert_eq!(classify(1, n), VersionLevel::Patch);
    }

    /// Changing every field is always a major, except the single-field case
    /// where the one-change rule wins first.
    #[test]
    fn full_change_major_above_one(n in 2usize..50) {
        prop_assert_eq!(classify(n, n), VersionLevel::Major);
    }

    /// The boundary pair around half: floor(n/2) is a patch,
    /// floor(n/2)+1 is a minor (for sizes where neither hits the
    /// one-change or full-rewrite rules).
    #[test]
    fn half_boundary(n in 4usize..60) {
        let half = n / 2;
        if half > 1 {
            prop_assert_eq!(classify(half, n), VersionLevel::Patch);
        }
        if half + 1 < n {
            prop_assert_eq!(classify(half + 1, n), VersionLevel::Minor);
        }
    }
}
