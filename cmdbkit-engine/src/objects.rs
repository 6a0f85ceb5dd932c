//! The object write path.
//!
//! `ObjectManager` owns create/update/delete/activate for objects: it gates
//! every operation on the type's ACL, validates fields against the schema,
//! resolves the version bump from the field diff, and records one audit
//! entry per mutation — best-effort, reported through the returned outcome.

use crate::audit::{AuditEvent, AuditStatus, AuditTrail};
use crate::collections;
use crate::diff::{classify_change, diff_fields, FieldChanges};
use crate::directory::UserDirectory;
use crate::render::{RenderConfig, Renderer, ViewMode};
use crate::{EngineError, EngineResult};
use chrono::Utc;
use cmdbkit_model::{FieldEntry, LogAction, Object, Permission, TypeSchema};
use cmdbkit_store::{DocumentStore, Filter, Sort};
use cmdbkit_types::{PublicId, Version};
use std::sync::Arc;
use tracing::debug;

/// Result of a successful create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOutcome {
    pub public_id: PublicId,
    pub audit: AuditStatus,
}

/// Result of a successful update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub public_id: PublicId,
    /// The version after the bump.
    pub version: Version,
    pub audit: AuditStatus,
}

/// Result of a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub public_id: PublicId,
    pub audit: AuditStatus,
}

/// Result of a successful activation toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveChangeOutcome {
    pub public_id: PublicId,
    pub active: bool,
    pub audit: AuditStatus,
}

/// Write-path manager for objects.
pub struct ObjectManager {
    store: Arc<DocumentStore>,
    directory: Arc<dyn UserDirectory>,
    renderer: Renderer,
    audit: AuditTrail,
}

impl ObjectManager {
    pub fn new(store: Arc<DocumentStore>, directory: Arc<dyn UserDirectory>) -> Self {
        let renderer = Renderer::new(Arc::clone(&store), Arc::clone(&directory));
        let audit = AuditTrail::new(Arc::clone(&store));
        Self {
            store,
            directory,
            renderer,
            audit,
        }
    }

    /// The renderer sharing this manager's handles.
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The audit trail sharing this manager's store.
    #[must_use]
    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    /// Fetches a raw object, ACL-gated on READ.
    pub fn get_object(&self, public_id: PublicId, user_id: PublicId) -> EngineResult<Object> {
        let object = self.fetch_object(public_id)?;
        let schema = self.fetch_type(object.type_id)?;
        self.renderer
            .check_access(&schema, user_id, Permission::Read)?;
        Ok(object)
    }

    /// Creates an object of the given type.
    ///
    /// The type must exist and be active (an inactive type denies creation
    /// the same way a failed ACL check does), the author's group needs
    /// CREATE, and the fields must validate against the schema including
    /// reference integrity. The new object starts at version `1.0.0`.
    pub fn create_object(
        &self,
        type_id: PublicId,
        fields: Vec<FieldEntry>,
        author_id: PublicId,
    ) -> EngineResult<CreateOutcome> {
        let schema = self.fetch_type(type_id)?;
        if !schema.active {
            return Err(EngineError::AccessDenied {
                type_id,
                permission: Permission::Create,
            });
        }
        self.renderer
            .check_access(&schema, author_id, Permission::Create)?;

        // Validate before minting so rejected writes don't burn an id.
        let mut object = Object::new(PublicId::new(0), type_id, author_id, fields);
        self.validate_fields(&object, &schema)?;
        let public_id = self.store.get_new_public_id(collections::OBJECTS)?;
        object.public_id = public_id;

        let doc = to_doc(&object)?;
        self.store.insert(collections::OBJECTS, public_id, &doc)?;
        debug!(%public_id, %type_id, "object created");

        let changes = FieldChanges {
            old: Vec::new(),
            new: object.fields.clone(),
        };
        let audit = self.record_action(
            LogAction::Create,
            &object,
            author_id,
            Some(changes),
            None,
        );
        Ok(CreateOutcome { public_id, audit })
    }

    /// Replaces an object's fields, bumping the version per the field diff.
    pub fn update_object(
        &self,
        public_id: PublicId,
        new_fields: Vec<FieldEntry>,
        editor_id: PublicId,
    ) -> EngineResult<UpdateOutcome> {
        let mut object = self.fetch_object(public_id)?;
        let schema = self.fetch_type(object.type_id)?;
        self.renderer
            .check_access(&schema, editor_id, Permission::Update)?;

        let changes = diff_fields(&object.fields, &new_fields);
        let level = classify_change(&changes, new_fields.len());
        object.version = object.version.bump(level);
        object.fields = new_fields;
        object.editor_id = Some(editor_id);
        object.last_edit_time = Some(Utc::now());
        self.validate_fields(&object, &schema)?;

        let doc = to_doc(&object)?;
        self.store.update(collections::OBJECTS, public_id, &doc)?;
        debug!(%public_id, version = %object.version, "object updated");

        let audit =
            self.record_action(LogAction::Edit, &object, editor_id, Some(changes), None);
        Ok(UpdateOutcome {
            public_id,
            version: object.version,
            audit,
        })
    }

    /// Deletes an object.
    ///
    /// A missing public id fails with [`EngineError::NotFound`] before any
    /// audit entry is written. Deletion under an inactive type is denied.
    /// The audit entry (with a final render snapshot) is recorded before the
    /// physical removal.
    pub fn delete_object(
        &self,
        public_id: PublicId,
        user_id: PublicId,
    ) -> EngineResult<DeleteOutcome> {
        let object = self.fetch_object(public_id)?;
        let schema = self.fetch_type(object.type_id)?;
        if !schema.active {
            return Err(EngineError::AccessDenied {
                type_id: schema.public_id,
                permission: Permission::Delete,
            });
        }
        self.renderer
            .check_access(&schema, user_id, Permission::Delete)?;

        let audit = self.record_action(LogAction::Delete, &object, user_id, None, None);
        self.store.delete(collections::OBJECTS, public_id)?;
        debug!(%public_id, "object deleted");
        Ok(DeleteOutcome { public_id, audit })
    }

    /// Toggles an object's active flag without touching its fields or
    /// version.
    pub fn set_object_active(
        &self,
        public_id: PublicId,
        active: bool,
        user_id: PublicId,
    ) -> EngineResult<ActiveChangeOutcome> {
        let mut object = self.fetch_object(public_id)?;
        let schema = self.fetch_type(object.type_id)?;
        self.renderer
            .check_access(&schema, user_id, Permission::Update)?;

        object.active = active;
        object.editor_id = Some(user_id);
        object.last_edit_time = Some(Utc::now());
        let doc = to_doc(&object)?;
        self.store.update(collections::OBJECTS, public_id, &doc)?;

        let comment = if active { "activated" } else { "deactivated" };
        let audit = self.record_action(
            LogAction::ActiveChange,
            &object,
            user_id,
            None,
            Some(comment.to_string()),
        );
        Ok(ActiveChangeOutcome {
            public_id,
            active,
            audit,
        })
    }

    /// Number of stored objects of the given type.
    pub fn count_objects_of_type(&self, type_id: PublicId) -> EngineResult<usize> {
        let filter = Filter::new().eq("type_id", type_id.value());
        Ok(self.store.count(collections::OBJECTS, &filter)?)
    }

    /// Raw objects matching a filter, ACL-filtered for the user.
    pub fn get_objects_by(
        &self,
        filter: &Filter,
        user_id: PublicId,
    ) -> EngineResult<Vec<Object>> {
        let (docs, _) =
            self.store
                .get_many(collections::OBJECTS, filter, &Sort::default(), 0, None)?;
        let mut objects = Vec::new();
        for doc in docs {
            let object: Object = serde_json::from_value(doc)
                .map_err(|e| EngineError::Render(format!("corrupt object: {e}")))?;
            let schema = self.fetch_type(object.type_id)?;
            if self
                .renderer
                .check_access(&schema, user_id, Permission::Read)
                .is_ok()
            {
                objects.push(object);
            }
        }
        Ok(objects)
    }

    /// Validates fields against the schema, including reference integrity:
    /// a non-empty reference must point at an existing object whose type is
    /// allowed by the field's `ref_types`.
    fn validate_fields(&self, object: &Object, schema: &TypeSchema) -> EngineResult<()> {
        object
            .validate_against(schema)
            .map_err(|e| EngineError::Validation(e.to_string()))?;

        for entry in &object.fields {
            let Ok(def) = schema.get_field(&entry.name) else {
                continue;
            };
            if !def.kind.is_reference() || entry.value.is_empty() {
                continue;
            }
            let Some(target_id) = entry.value.as_reference() else {
                continue;
            };
            let target_doc = self
                .store
                .get(collections::OBJECTS, target_id)
                .map_err(|_| {
                    EngineError::Validation(format!(
                        "field '{}' references missing object {target_id}",
                        entry.name
                    ))
                })?;
            if def.ref_types.is_empty() {
                continue;
            }
            let target_type = target_doc
                .get("type_id")
                .and_then(|v| v.as_u64())
                .map(PublicId::new);
            match target_type {
                Some(tid) if def.ref_types.contains(&tid) => {}
                _ => {
                    return Err(EngineError::Validation(format!(
                        "field '{}' may not reference objects of that type",
                        entry.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Records one audit entry for a mutation, best-effort, with a render
    /// snapshot of the object as it stands.
    fn record_action(
        &self,
        action: LogAction,
        object: &Object,
        user_id: PublicId,
        changes: Option<FieldChanges>,
        comment: Option<String>,
    ) -> AuditStatus {
        let render_state = self
            .renderer
            .render_object(
                object.public_id,
                user_id,
                ViewMode::Native,
                &RenderConfig::default(),
            )
            .ok()
            .and_then(|r| serde_json::to_value(&r).ok());
        let user_name = self
            .directory
            .lookup(user_id)
            .map(|p| p.name)
            .unwrap_or_else(|| user_id.to_string());
        let changes = changes.and_then(|c| serde_json::to_value(&c).ok());
        self.audit.record_best_effort(AuditEvent {
            action,
            object_id: object.public_id,
            version: object.version,
            user_id,
            user_name,
            render_state,
            changes,
            comment,
        })
    }

    fn fetch_object(&self, public_id: PublicId) -> EngineResult<Object> {
        let doc = self.store.get(collections::OBJECTS, public_id)?;
        serde_json::from_value(doc)
            .map_err(|e| EngineError::Render(format!("corrupt object {public_id}: {e}")))
    }

    fn fetch_type(&self, type_id: PublicId) -> EngineResult<TypeSchema> {
        let doc = self.store.get(collections::TYPES, type_id)?;
        serde_json::from_value(doc)
            .map_err(|e| EngineError::Render(format!("corrupt type {type_id}: {e}")))
    }
}

fn to_doc(object: &Object) -> EngineResult<serde_json::Value> {
    serde_json::to_value(object)
        .map_err(|e| EngineError::Validation(format!("object serialization: {e}")))
}
