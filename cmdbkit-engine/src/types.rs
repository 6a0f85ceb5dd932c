//! The type write path.
//!
//! `TypeManager` owns the administrative lifecycle of type documents:
//! insert with validation and name uniqueness, full-document updates with a
//! version bump classified from the field-definition diff, activation
//! toggling, and a guarded delete that refuses while objects of the type
//! still exist.

use crate::collections;
use crate::diff::classify;
use crate::{EngineError, EngineResult};
use cmdbkit_model::TypeSchema;
use cmdbkit_store::{DocumentStore, Filter, Sort};
use cmdbkit_types::{PublicId, Version};
use std::sync::Arc;
use tracing::debug;

/// Write-path manager for type documents.
pub struct TypeManager {
    store: Arc<DocumentStore>,
}

impl TypeManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetches one type document.
    pub fn get_type(&self, public_id: PublicId) -> EngineResult<TypeSchema> {
        let doc = self.store.get(collections::TYPES, public_id)?;
        parse_type(doc)
    }

    /// All type documents matching a filter, in public-id order.
    pub fn get_types_by(&self, filter: &Filter) -> EngineResult<Vec<TypeSchema>> {
        let (docs, _) =
            self.store
                .get_many(collections::TYPES, filter, &Sort::default(), 0, None)?;
        docs.into_iter().map(parse_type).collect()
    }

    /// Inserts a new type, assigning its public id and resetting its
    /// version to the initial one. The name must be unique.
    pub fn insert_type(&self, mut schema: TypeSchema) -> EngineResult<PublicId> {
        schema
            .validate()
            .map_err(|e| EngineError::Validation(e.to_string()))?;
        self.check_name_unique(&schema.name, None)?;

        schema.public_id = self.store.get_new_public_id(collections::TYPES)?;
        schema.version = Version::initial();
        let doc = to_doc(&schema)?;
        self.store.insert(collections::TYPES, schema.public_id, &doc)?;
        debug!(public_id = %schema.public_id, name = %schema.name, "type created");
        Ok(schema.public_id)
    }

    /// Replaces a type document wholesale — types are never patched.
    ///
    /// The version bump is classified from the `(name, kind)` diff of the
    /// field definitions: a fully rewritten field list is a major bump, the
    /// same thresholds as object updates apply below that. Returns the new
    /// version.
    pub fn update_type(&self, mut schema: TypeSchema) -> EngineResult<Version> {
        let existing = self.get_type(schema.public_id)?;
        schema
            .validate()
            .map_err(|e| EngineError::Validation(e.to_string()))?;
        self.check_name_unique(&schema.name, Some(schema.public_id))?;

        let changed = schema
            .fields
            .iter()
            .filter(|f| {
                !existing
                    .fields
                    .iter()
                    .any(|e| e.name == f.name && e.kind == f.kind)
            })
            .count();
        let level = classify(changed, schema.fields.len());
        schema.version = existing.version.bump(level);

        let doc = to_doc(&schema)?;
        self.store.update(collections::TYPES, schema.public_id, &doc)?;
        debug!(public_id = %schema.public_id, version = %schema.version, "type updated");
        Ok(schema.version)
    }

    /// Toggles whether objects of this type may be created or deleted.
    /// Existing objects are untouched either way.
    pub fn set_type_active(&self, public_id: PublicId, active: bool) -> EngineResult<()> {
        let mut schema = self.get_type(public_id)?;
        schema.active = active;
        let doc = to_doc(&schema)?;
        self.store.update(collections::TYPES, public_id, &doc)?;
        debug!(%public_id, active, "type activation changed");
        Ok(())
    }

    /// Deletes a type document. Refused while objects of the type exist —
    /// removing the schema under stored objects would orphan them.
    pub fn delete_type(&self, public_id: PublicId) -> EngineResult<()> {
        let filter = Filter::new().eq("type_id", public_id.value());
        let remaining = self.store.count(collections::OBJECTS, &filter)?;
        if remaining > 0 {
            return Err(EngineError::Validation(format!(
                "type {public_id} still has {remaining} objects"
            )));
        }
        self.store.delete(collections::TYPES, public_id)?;
        debug!(%public_id, "type deleted");
        Ok(())
    }

    /// Object counts per type id across the whole object collection.
    pub fn count_objects_by_type(
        &self,
    ) -> EngineResult<std::collections::BTreeMap<String, usize>> {
        Ok(self.store.group_by(collections::OBJECTS, "type_id")?)
    }

    fn check_name_unique(&self, name: &str, except: Option<PublicId>) -> EngineResult<()> {
        let filter = Filter::new().eq("name", name);
        let (docs, _) =
            self.store
                .get_many(collections::TYPES, &filter, &Sort::default(), 0, None)?;
        for doc in docs {
            let other = parse_type(doc)?;
            if Some(other.public_id) != except {
                return Err(EngineError::Validation(format!(
                    "type name '{name}' already exists"
                )));
            }
        }
        Ok(())
    }
}

fn parse_type(doc: serde_json::Value) -> EngineResult<TypeSchema> {
    serde_json::from_value(doc)
        .map_err(|e| EngineError::Render(format!("corrupt type document: {e}")))
}

fn to_doc(schema: &TypeSchema) -> EngineResult<serde_json::Value> {
    serde_json::to_value(schema)
        .map_err(|e| EngineError::Validation(format!("type serialization: {e}")))
}
