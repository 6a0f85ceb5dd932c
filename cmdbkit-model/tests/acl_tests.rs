use cmdbkit_model::{ModelError, Permission, TypeAcl};
use cmdbkit_types::PublicId;

const ADMINS: PublicId = PublicId::new(1);
const VIEWERS: PublicId = PublicId::new(2);

fn acl_with_viewer_read() -> TypeAcl {
    let mut acl = TypeAcl::activated();
    acl.grant_access(VIEWERS, Permission::Read);
    acl
}

// ── Disabled ACL ──────────────────────────────────────────────────

#[test]
fn disabled_acl_allows_everything() {
    let acl = TypeAcl::default();
    assert!(!acl.activated);
    for permission in [
        Permission::Create,
        Permission::Read,
        Permission::Update,
        Permission::Delete,
    ] {
        assert!(acl.verify_access(PublicId::new(999), permission));
    }
}

// ── Enabled ACL ───────────────────────────────────────────────────

#[test]
fn unlisted_group_is_denied() {
    let acl = acl_with_viewer_read();
    assert!(!acl.verify_access(ADMINS, Permission::Read));
}

#[test]
fn listed_group_without_permission_is_denied() {
    let acl = acl_with_viewer_read();
    assert!(!acl.verify_access(VIEWERS, Permission::Delete));
}

#[test]
fn listed_group_with_permission_is_allowed() {
    let acl = acl_with_viewer_read();
    assert!(acl.verify_access(VIEWERS, Permission::Read));
}

#[test]
fn empty_activated_acl_denies_everyone() {
    let acl = TypeAcl::activated();
    assert!(!acl.verify_access(VIEWERS, Permission::Read));
}

// ── Grant / revoke ────────────────────────────────────────────────

#[test]
fn grant_is_idempotent() {
    let mut acl = TypeAcl::activated();
    acl.grant_access(ADMINS, Permission::Update);
    acl.grant_access(ADMINS, Permission::Update);
    assert!(acl.verify_access(ADMINS, Permission::Update));
    assert_eq!(acl.groups.includes.get(&ADMINS).unwrap().len(), 1);
}

#[test]
fn revoke_removes_permission() {
    let mut acl = acl_with_viewer_read();
    acl.revoke_access(VIEWERS, Permission::Read).unwrap();
    assert!(!acl.verify_access(VIEWERS, Permission::Read));
}

#[test]
fn revoke_absent_permission_fails() {
    let mut acl = acl_with_viewer_read();
    let err = acl.revoke_access(VIEWERS, Permission::Delete).unwrap_err();
    assert_eq!(
        err,
        ModelError::PermissionNotGranted {
            group: VIEWERS,
            permission: Permission::Delete
        }
    );
}

#[test]
fn revoke_for_unknown_group_fails() {
    let mut acl = acl_with_viewer_read();
    assert!(acl.revoke_access(PublicId::new(42), Permission::Read).is_err());
}

// ── Queries ───────────────────────────────────────────────────────

#[test]
fn groups_with_lists_holders() {
    let mut acl = TypeAcl::activated();
    acl.grant_access(ADMINS, Permission::Read);
    acl.grant_access(VIEWERS, Permission::Read);
    acl.grant_access(ADMINS, Permission::Delete);

    assert_eq!(acl.groups_with(Permission::Read), vec![ADMINS, VIEWERS]);
    assert_eq!(acl.groups_with(Permission::Delete), vec![ADMINS]);
    assert!(acl.groups_with(Permission::Create).is_empty());
}

// ── Serde ─────────────────────────────────────────────────────────

#[test]
fn acl_serde_roundtrip() {
    let mut acl = TypeAcl::activated();
    acl.grant_access(ADMINS, Permission::Read);
    acl.grant_access(ADMINS, Permission::Update);

    let json = serde_json::to_string(&acl).unwrap();
    let parsed: TypeAcl = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, acl);
}

#[test]
fn permission_serializes_uppercase() {
    assert_eq!(serde_json::to_string(&Permission::Read).unwrap(), "\"READ\"");
    assert_eq!(
        serde_json::to_string(&Permission::Create).unwrap(),
        "\"CREATE\""
    );
}
