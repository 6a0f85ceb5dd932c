use cmdbkit_types::{Version, VersionLevel};
use proptest::prelude::*;

// ── Parsing ───────────────────────────────────────────────────────

#[test]
fn parse_valid_version() {
    let v = Version::parse("1.2.3").unwrap();
    assert_eq!(v.major(), 1);
    assert_eq!(v.minor(), 2);
    assert_eq!(v.patch(), 3);
}

#[test]
fn parse_rejects_wrong_component_count() {
    assert!(Version::parse("1.2").is_err());
    assert!(Version::parse("1.2.3.4").is_err());
    assert!(Version::parse("1").is_err());
    assert!(Version::parse("").is_err());
}

#[test]
fn parse_rejects_non_integer_components() {
    assert!(Version::parse("1.x.3").is_err());
    assert!(Version::parse("a.b.c").is_err());
    assert!(Version::parse("1.2.-3").is_err());
}

#[test]
fn display_roundtrip() {
    let v = Version::new(4, 0, 17);
    assert_eq!(v.to_string(), "4.0.17");
    assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
}

#[test]
fn initial_is_one_zero_zero() {
    assert_eq!(Version::initial().to_string(), "1.0.0");
    assert_eq!(Version::default(), Version::initial());
}

// ── Bumping ───────────────────────────────────────────────────────

#[test]
fn bump_major_leaves_minor_and_patch() {
    let v = Version::new(1, 2, 3).bump(VersionLevel::Major);
    assert_eq!(v, Version::new(2, 2, 3));
}

#[test]
fn bump_minor_does_not_reset_patch() {
    let v = Version::new(1, 2, 3).bump(VersionLevel::Minor);
    assert_eq!(v, Version::new(1, 3, 3));
}

#[test]
fn bump_patch() {
    let v = Version::new(1, 2, 3).bump(VersionLevel::Patch);
    assert_eq!(v, Version::new(1, 2, 4));
}

// ── Ordering ──────────────────────────────────────────────────────

#[test]
fn ordering_is_component_wise() {
    assert!(Version::new(2, 0, 0) > Version::new(1, 9, 9));
    assert!(Version::new(1, 3, 0) > Version::new(1, 2, 9));
    assert!(Version::new(1, 2, 4) > Version::new(1, 2, 3));
    assert_eq!(Version::new(1, 2, 3), Version::new(1, 2, 3));
}

// ── Serde ─────────────────────────────────────────────────────────

#[test]
fn serializes_as_string() {
    let v = Version::new(1, 0, 2);
    let json = serde_json::to_string(&v).unwrap();
    assert_eq!(json, "\"1.0.2\"");
    let back: Version = serde_json::from_str(&json).unwrap();
    assert_eq!(back, v);
}

#[test]
fn deserialize_rejects_malformed_string() {
    assert!(serde_json::from_str::<Version>("\"1.0\"").is_err());
}

// ── Properties ────────────────────────────────────────────────────

fn version_strategy() -> impl Strategy<Value = Version> {
    (0u32..10_000, 0u32..10_000, 0u32..10_000).prop_map(|(ma, mi, pa)| Version::new(ma, mi, pa))
}

fn level_strategy() -> impl Strategy<Value = VersionLevel> {
    prop_oneof![
        Just(VersionLevel::Major),
        Just(VersionLevel::Minor),
        Just(VersionLevel::Patch),
    ]
}

proptest! {
    /// Any bump strictly increases the version in component-wise order.
    #[test]
    fn bump_is_strictly_increasing(v in version_strategy(), level in level_strategy()) {
        prop_assert!(v.bump(level) > v);
    }

    /// A bump changes exactly one component.
    #[test]
    fn bump_touches_one_component(v in version_strategy(), level in level_strategy()) {
        let b = v.bump(level);
        let changed = [
            b.major() != v.major(),
            b.minor() != v.minor(),
            b.patch() != v.patch(),
        ]
        .iter()
        .filter(|c| **c)
        .count();
        prop_assert_eq!(changed, 1);
    }

    /// String round-trip is lossless.
    #[test]
    fn parse_display_roundtrip(v in version_strategy()) {
        prop_assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
    }
}
