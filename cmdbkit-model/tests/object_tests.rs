use chrono::Utc;
use cmdbkit_model::{
    validate_required_keys, AuditLogEntry, FieldDef, FieldEntry, FieldValue, LogAction, LogKind,
    ModelError, Object, TypeSchema,
};
use cmdbkit_types::{PublicId, Version};
use pretty_assertions::assert_eq;
use serde_json::json;

fn server_schema() -> TypeSchema {
    let mut schema = TypeSchema::new(PublicId::new(1), "server", "Server");
    schema.fields = vec![
        FieldDef::text("name", "Name"),
        FieldDef::checkbox("monitored", "Monitored"),
        FieldDef::reference("network", "Network", vec![PublicId::new(2)]),
    ];
    schema
}

fn server_object() -> Object {
    Object::new(
        PublicId::new(10),
        PublicId::new(1),
        PublicId::new(7),
        vec![
            FieldEntry::new("name", "srv01"),
            FieldEntry::new("monitored", true),
            FieldEntry::new("network", PublicId::new(20)),
        ],
    )
}

// ── Field access ──────────────────────────────────────────────────

#[test]
fn new_object_starts_active_at_initial_version() {
    let obj = server_object();
    assert!(obj.active);
    assert_eq!(obj.version, Version::initial());
    assert!(obj.editor_id.is_none());
    assert!(obj.last_edit_time.is_none());
}

#[test]
fn get_value_by_name() {
    let obj = server_object();
    assert_eq!(
        obj.get_value("name"),
        Some(&FieldValue::Text("srv01".into()))
    );
    assert_eq!(obj.get_value("monitored"), Some(&FieldValue::Bool(true)));
    assert_eq!(obj.get_value("missing"), None);
}

#[test]
fn reference_value_resolves_to_public_id() {
    let obj = server_object();
    let value = obj.get_value("network").unwrap();
    assert_eq!(value.as_reference(), Some(PublicId::new(20)));
}

#[test]
fn text_reference_value_resolves_too() {
    let value = FieldValue::Text("33".into());
    assert_eq!(value.as_reference(), Some(PublicId::new(33)));
    assert_eq!(FieldValue::Text("x".into()).as_reference(), None);
    assert_eq!(FieldValue::Bool(true).as_reference(), None);
}

#[test]
fn empty_values() {
    assert!(FieldValue::Null.is_empty());
    assert!(FieldValue::Text(String::new()).is_empty());
    assert!(!FieldValue::Text("x".into()).is_empty());
    assert!(!FieldValue::Bool(false).is_empty());
}

// ── Schema validation ─────────────────────────────────────────────

#[test]
fn valid_object_passes() {
    server_object().validate_against(&server_schema()).unwrap();
}

#[test]
fn undeclared_field_rejected() {
    let mut obj = server_object();
    obj.fields.push(FieldEntry::new("ghost", "boo"));
    let err = obj.validate_against(&server_schema()).unwrap_err();
    assert!(matches!(err, ModelError::Validation(msg) if msg.contains("ghost")));
}

#[test]
fn checkbox_must_hold_bool() {
    let mut obj = server_object();
    obj.fields[1] = FieldEntry::new("monitored", "yes");
    assert!(obj.validate_against(&server_schema()).is_err());
}

#[test]
fn ref_field_must_hold_resolvable_id() {
    let mut obj = server_object();
    obj.fields[2] = FieldEntry::new("network", "not-an-id");
    assert!(obj.validate_against(&server_schema()).is_err());
}

#[test]
fn empty_values_are_always_compatible() {
    let mut obj = server_object();
    obj.fields[2] = FieldEntry::new("network", FieldValue::Null);
    obj.validate_against(&server_schema()).unwrap();
}

// ── Required-key helper ───────────────────────────────────────────

#[test]
fn required_keys_present() {
    let doc = json!({"public_id": 1, "type_id": 2, "fields": []});
    validate_required_keys(&doc, &["public_id", "type_id", "fields"]).unwrap();
}

#[test]
fn missing_required_key_fails() {
    let doc = json!({"public_id": 1});
    let err = validate_required_keys(&doc, &["public_id", "type_id"]).unwrap_err();
    assert!(matches!(err, ModelError::Validation(msg) if msg.contains("type_id")));
}

#[test]
fn non_object_document_fails() {
    assert!(validate_required_keys(&json!([1, 2]), &["public_id"]).is_err());
}

// ── Serde round-trips ─────────────────────────────────────────────

#[test]
fn object_serde_roundtrip_is_structural() {
    let original = server_object();
    let json = serde_json::to_value(&original).unwrap();
    let parsed: Object = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(parsed, original);
    assert_eq!(serde_json::to_value(&parsed).unwrap(), json);
}

#[test]
fn field_values_serialize_as_bare_scalars() {
    let entry = FieldEntry::new("name", "srv01");
    assert_eq!(
        serde_json::to_value(&entry).unwrap(),
        json!({"name": "name", "value": "srv01"})
    );
    let entry = FieldEntry::new("monitored", true);
    assert_eq!(
        serde_json::to_value(&entry).unwrap(),
        json!({"name": "monitored", "value": true})
    );
}

#[test]
fn audit_entry_serde_roundtrip_is_structural() {
    let entry = AuditLogEntry {
        public_id: PublicId::new(1),
        log_kind: LogKind::ObjectLog,
        action: LogAction::ActiveChange,
        user_id: PublicId::new(7),
        user_name: "jdoe".into(),
        log_time: Utc::now(),
        object_id: PublicId::new(10),
        version: Version::new(1, 0, 2),
        render_state: Some(json!({"fields": []})),
        changes: Some(json!({"old": [], "new": []})),
        comment: Some("deactivated".into()),
    };
    let json = serde_json::to_value(&entry).unwrap();
    let parsed: AuditLogEntry = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(parsed, entry);
    assert_eq!(serde_json::to_value(&parsed).unwrap(), json);
}

#[test]
fn log_discriminators_use_wire_forms() {
    assert_eq!(
        serde_json::to_string(&LogKind::ObjectLog).unwrap(),
        "\"object-log\""
    );
    assert_eq!(
        serde_json::to_string(&LogAction::ActiveChange).unwrap(),
        "\"ACTIVE_CHANGE\""
    );
}
