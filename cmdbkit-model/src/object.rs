//! The stored object document.
//!
//! An [`Object`] is an instance of a [`TypeSchema`](crate::TypeSchema): a
//! flat list of named values plus bookkeeping attributes. Objects are owned
//! exclusively by the store; the engine reads copies and derives transient
//! render views from them.

use crate::field::{FieldEntry, FieldKind, FieldValue};
use crate::{ModelError, ModelResult, TypeSchema};
use chrono::{DateTime, Utc};
use cmdbkit_types::{PublicId, Version};
use serde::{Deserialize, Serialize};

/// A stored instance of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub public_id: PublicId,
    pub type_id: PublicId,
    #[serde(default)]
    pub version: Version,
    pub author_id: PublicId,
    pub creation_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<PublicId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edit_time: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

fn default_active() -> bool {
    true
}

impl Object {
    /// A fresh active object at the initial version.
    pub fn new(
        public_id: PublicId,
        type_id: PublicId,
        author_id: PublicId,
        fields: Vec<FieldEntry>,
    ) -> Self {
        Self {
            public_id,
            type_id,
            version: Version::initial(),
            author_id,
            creation_time: Utc::now(),
            editor_id: None,
            last_edit_time: None,
            active: true,
            fields,
        }
    }

    /// The stored value of the named field, if present.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Checks this object's fields against its type schema.
    ///
    /// Every stored field must be declared on the type and carry a value
    /// compatible with the declared kind. Reference kinds additionally
    /// require an interpretable public id (or an empty value).
    pub fn validate_against(&self, schema: &TypeSchema) -> ModelResult<()> {
        for entry in &self.fields {
            let def = schema.get_field(&entry.name).map_err(|_| {
                ModelError::Validation(format!(
                    "field '{}' is not declared on type '{}'",
                    entry.name, schema.name
                ))
            })?;
            if entry.value.is_empty() {
                continue;
            }
            let compatible = match def.kind {
                FieldKind::Checkbox => matches!(entry.value, FieldValue::Bool(_)),
                FieldKind::Text
                | FieldKind::Password
                | FieldKind::Textarea
                | FieldKind::Date => matches!(entry.value, FieldValue::Text(_)),
                FieldKind::Select | FieldKind::Radio => !matches!(entry.value, FieldValue::Bool(_)),
                FieldKind::Ref | FieldKind::Location | FieldKind::RefSectionField => {
                    entry.value.as_reference().is_some()
                }
            };
            if !compatible {
                return Err(ModelError::Validation(format!(
                    "field '{}' holds a value incompatible with kind {}",
                    entry.name, def.kind
                )));
            }
        }
        Ok(())
    }
}

/// Checks that a raw document carries every required top-level key.
///
/// This is the shared validation helper used at the store boundary in place
/// of inheritance-driven document validation: each entity kind states its
/// required keys explicitly at the call site.
pub fn validate_required_keys(doc: &serde_json::Value, required: &[&str]) -> ModelResult<()> {
    let Some(map) = doc.as_object() else {
        return Err(ModelError::Validation("document is not an object".into()));
    };
    for key in required {
        if !map.contains_key(*key) {
            return Err(ModelError::Validation(format!("missing required key '{key}'")));
        }
    }
    Ok(())
}
